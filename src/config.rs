use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::network::{UvConfig, DEFAULT_API_URL};

/// Runtime configuration, loaded from the environment (and .env).
#[derive(Debug, Clone)]
pub struct StationConfig {
    pub database_url: String,
    /// Capture file replayed by the frame transport. A real USB driver
    /// plugs in through `transport::FrameTransport` instead.
    pub frame_capture: PathBuf,
    /// UV service credentials; `None` disables UV lookups (index 0).
    pub uv: Option<UvConfig>,
    pub poll_interval_secs: u64,
    pub uv_refresh_cycles: u64,
    pub fetch_attempts: u32,
}

impl StationConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL environment variable not set")?;
        let frame_capture: PathBuf = env::var("FRAME_CAPTURE")
            .map_err(|_| "FRAME_CAPTURE environment variable not set")?
            .into();

        let uv = match (
            env::var("OPENUV_TOKEN"),
            env::var("STATION_LAT"),
            env::var("STATION_LNG"),
        ) {
            (Ok(token), Ok(lat), Ok(lng)) => Some(UvConfig {
                api_url: env::var("OPENUV_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                token,
                latitude: lat.parse().map_err(|_| "STATION_LAT is not a number")?,
                longitude: lng.parse().map_err(|_| "STATION_LNG is not a number")?,
            }),
            _ => {
                println!("OPENUV_TOKEN/STATION_LAT/STATION_LNG not all set, UV index disabled");
                None
            }
        };

        Ok(StationConfig {
            database_url,
            frame_capture,
            uv,
            poll_interval_secs: parse_or("POLL_INTERVAL_SECS", 30)?,
            uv_refresh_cycles: parse_or("UV_REFRESH_CYCLES", 120)?,
            fetch_attempts: parse_or("FETCH_ATTEMPTS", 10)?,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| format!("{} is not a valid number", key).into()),
        Err(_) => Ok(default),
    }
}
