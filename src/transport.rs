/// Frame acquisition: transport abstraction and the retry/validate poller
///
/// The station exchange is modelled as a trait with a single raw operation
/// so the decoder core never touches transport lifecycle. The USB driver is
/// an external collaborator implementing `FrameTransport`; the replay
/// transport below runs the service from recorded frames and backs the
/// poller tests.
use log::{debug, warn};
use std::path::Path;
use thiserror::Error;
use tokio::time::{sleep, Duration};

use crate::decoder::frame::{RawFrame, FRAME_LEN};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device exchange failed: {0}")]
    Exchange(String),
    #[error("no checksum-valid frame after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
    #[error("capture file error: {0}")]
    Capture(#[from] std::io::Error),
}

/// One request/receive exchange with the station, returning the raw
/// 35-byte buffer without checksum validation.
pub trait FrameTransport {
    fn exchange(&mut self) -> Result<[u8; FRAME_LEN], TransportError>;
}

/// Retries the exchange/validate cycle up to a bounded attempt count,
/// sleeping briefly between attempts. Reports failure to the caller
/// instead of looping forever.
pub struct FramePoller<T> {
    transport: T,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<T: FrameTransport> FramePoller<T> {
    pub fn new(transport: T, max_attempts: u32, retry_delay: Duration) -> Self {
        FramePoller {
            transport,
            max_attempts,
            retry_delay,
        }
    }

    /// Fetch one checksum-valid frame, or fail once the attempt budget is
    /// spent.
    pub async fn fetch_validated(&mut self) -> Result<RawFrame, TransportError> {
        for attempt in 1..=self.max_attempts {
            match self.transport.exchange() {
                Ok(bytes) => match RawFrame::validated(&bytes) {
                    Ok(frame) => return Ok(frame),
                    Err(e) => debug!("Attempt {}: discarding frame: {}", attempt, e),
                },
                Err(e) => warn!("Attempt {}: {}", attempt, e),
            }
            if attempt < self.max_attempts {
                sleep(self.retry_delay).await;
            }
        }
        Err(TransportError::RetriesExhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Replays frames recorded from the station, one hex-encoded frame per
/// line (35 two-digit bytes, whitespace separated, `#` comments allowed).
/// Wraps around at the end of the capture.
pub struct CaptureTransport {
    frames: Vec<[u8; FRAME_LEN]>,
    cursor: usize,
}

impl CaptureTransport {
    pub fn from_file(path: &Path) -> Result<Self, TransportError> {
        let text = std::fs::read_to_string(path)?;
        let mut frames = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let frame = parse_hex_frame(line)
                .map_err(|e| TransportError::Exchange(format!("line {}: {}", lineno + 1, e)))?;
            frames.push(frame);
        }
        if frames.is_empty() {
            return Err(TransportError::Exchange(
                "capture file holds no frames".into(),
            ));
        }
        Ok(CaptureTransport { frames, cursor: 0 })
    }
}

impl FrameTransport for CaptureTransport {
    fn exchange(&mut self) -> Result<[u8; FRAME_LEN], TransportError> {
        let frame = self.frames[self.cursor];
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }
}

fn parse_hex_frame(line: &str) -> Result<[u8; FRAME_LEN], String> {
    let mut bytes = Vec::with_capacity(FRAME_LEN);
    for token in line.split_whitespace() {
        let byte = u8::from_str_radix(token, 16)
            .map_err(|e| format!("bad byte {:?}: {}", token, e))?;
        bytes.push(byte);
    }
    bytes
        .try_into()
        .map_err(|rest: Vec<u8>| format!("expected {} bytes, got {}", FRAME_LEN, rest.len()))
}
