/// Raw frame layout and checksum validation for the Hideki station protocol
use thiserror::Error;

/// Number of bytes in one complete station report.
pub const FRAME_LEN: usize = 35;

// Byte offsets within a frame. The first nine bytes are three 3-byte
// temperature/humidity triples, one per sensor channel.
pub const SENSOR_TRIPLE_BASE: usize = 0;
pub const PRESSURE_LOW: usize = 20;
pub const PRESSURE_HIGH: usize = 21;
pub const WIND_CHILL: usize = 23;
pub const WIND_GUST: usize = 25;
pub const WIND_SPEED: usize = 27;
pub const WIND_DIR: usize = 29;
pub const CHECKSUM: usize = 33;

/// Frames whose computed XOR checksum equals this value are accepted even
/// when the stored checksum byte disagrees. Firmware quirk, preserved as-is.
pub const CHECKSUM_SENTINEL: u8 = 0x5A;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("expected {FRAME_LEN} bytes, got {0}")]
    WrongLength(usize),
    #[error("checksum mismatch: computed {computed:#04x}, stored {stored:#04x}")]
    ChecksumMismatch { computed: u8, stored: u8 },
}

/// One complete 35-byte report as received from the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame([u8; FRAME_LEN]);

impl RawFrame {
    /// Wrap a buffer without checksum validation. Decoder fixtures use this;
    /// transports should go through `validated`.
    pub fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        RawFrame(bytes)
    }

    /// Wrap and checksum-validate a buffer received from a transport.
    ///
    /// A frame is accepted when the XOR of bytes 0..=32 matches the stored
    /// checksum byte, or when it equals `CHECKSUM_SENTINEL`.
    pub fn validated(bytes: &[u8]) -> Result<Self, FrameError> {
        let buf: [u8; FRAME_LEN] = bytes
            .try_into()
            .map_err(|_| FrameError::WrongLength(bytes.len()))?;
        let frame = RawFrame(buf);
        let computed = frame.checksum();
        let stored = frame.byte(CHECKSUM);
        if computed == stored || computed == CHECKSUM_SENTINEL {
            Ok(frame)
        } else {
            Err(FrameError::ChecksumMismatch { computed, stored })
        }
    }

    /// XOR of bytes 0..=32.
    pub fn checksum(&self) -> u8 {
        self.0[..=32].iter().fold(0u8, |acc, &b| acc ^ b)
    }

    pub fn byte(&self, offset: usize) -> u8 {
        self.0[offset]
    }
}
