/// UV index retrieval from the OpenUV HTTP API
use log::debug;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.openuv.io/api/v1/uv";

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("UV API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where and how to query the UV index service.
#[derive(Debug, Clone)]
pub struct UvConfig {
    pub api_url: String,
    pub token: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct UvResponse {
    result: UvResult,
}

#[derive(Debug, Deserialize)]
struct UvResult {
    uv: f64,
}

/// Fetch the current UV index for the configured position.
///
/// The reading is supplementary; callers fall back to 0 when this fails.
pub async fn fetch_uv_index(
    client: &reqwest::Client,
    config: &UvConfig,
) -> Result<i32, NetworkError> {
    let response = client
        .get(&config.api_url)
        .query(&[("lat", config.latitude), ("lng", config.longitude)])
        .header("x-access-token", &config.token)
        .send()
        .await?
        .error_for_status()?;
    let payload: UvResponse = response.json().await?;
    debug!("UV API reported uv={}", payload.result.uv);
    Ok(payload.result.uv as i32)
}
