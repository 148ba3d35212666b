mod config;
mod database;
mod decoder;
mod derived;
mod models;
mod network;
mod transport;
mod utils;

use log::{error, info, warn};
use time::OffsetDateTime;
use tokio::time::{sleep, Duration};

use config::StationConfig;
use database::store_observation;
use models::{Observation, Reading, CHANNELS};
use transport::{CaptureTransport, FramePoller};
use utils::format_datetime;

const RETRY_DELAY_MILLIS: u64 = 500;

async fn main_loop(config: StationConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Hideki weather station collection service");

    let transport = CaptureTransport::from_file(&config.frame_capture)?;
    let mut poller = FramePoller::new(
        transport,
        config.fetch_attempts,
        Duration::from_millis(RETRY_DELAY_MILLIS),
    );
    let http_client = reqwest::Client::new();

    let mut uv_index = 0;
    let mut cycle: u64 = 0;

    loop {
        // Refresh the UV index on the first cycle and every N cycles after.
        if cycle % config.uv_refresh_cycles == 0 {
            uv_index = match &config.uv {
                Some(uv_config) => match network::fetch_uv_index(&http_client, uv_config).await {
                    Ok(uv) => {
                        info!("Current UV index is {}", uv);
                        uv
                    }
                    Err(e) => {
                        warn!("UV index fetch failed, assuming 0: {}", e);
                        0
                    }
                },
                None => 0,
            };
        }
        cycle += 1;

        let frame = match poller.fetch_validated().await {
            Ok(frame) => frame,
            Err(e) => {
                error!("Frame acquisition failed, skipping cycle: {}", e);
                sleep(Duration::from_secs(config.poll_interval_secs)).await;
                continue;
            }
        };

        let mut observation = Observation::from_frame(&frame, OffsetDateTime::now_utc());

        if let Err(e) = observation.calculate_dew_point() {
            warn!("Dew point not computed: {}", e);
        }
        if let Err(e) = observation.calculate_real_feel(uv_index) {
            warn!("Real feel not computed: {}", e);
        }

        log_observation(&observation);

        if let Err(e) = store_observation(&observation, uv_index, &config.database_url).await {
            error!("Failed to store observation: {}", e);
        } else {
            info!(
                "Observation stored for {}",
                format_datetime(&observation.timestamp)
            );
        }

        sleep(Duration::from_secs(config.poll_interval_secs)).await;
    }
}

fn log_field<F: std::fmt::Display>(label: &str, reading: &Reading<F>, unit: &str) {
    match reading {
        Reading::Value(v) => info!("  {}: {:.2} {}", label, v, unit),
        Reading::Invalid(fault) => info!("  {}: unavailable ({})", label, fault),
    }
}

fn log_observation(obs: &Observation) {
    info!("Observation at {}:", format_datetime(&obs.timestamp));
    for channel in 0..CHANNELS {
        log_field(
            &format!("Temperature {}", channel),
            &obs.temperature[channel],
            "°C",
        );
        log_field(
            &format!("Humidity {}", channel),
            &obs.humidity[channel],
            "%",
        );
    }
    log_field("Pressure", &obs.pressure, "mb");
    log_field("Wind chill", &obs.wind_chill, "°C");
    log_field("Wind gust", &obs.wind_gust, "km/h");
    log_field("Wind speed", &obs.wind_speed, "km/h");
    log_field("Wind direction", &obs.wind_dir, "°");
    log_field("Rainfall", &obs.rainfall, "mm");
    match obs.dew_point {
        Some(dew) => info!("  Dew point: {:.2} °C", dew),
        None => info!("  Dew point: not computed"),
    }
    match obs.real_feel {
        Some(feel) => info!("  Real feel: {:.2} °C", feel),
        None => info!("  Real feel: not computed"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match StationConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        let _ = tx.send(());
    });

    // Run main loop or wait for shutdown signal
    tokio::select! {
        result = main_loop(config) => {
            match result {
                Ok(_) => info!("Program completed successfully"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
