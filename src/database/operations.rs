/// Database operations for storing decoded observations
use crate::database::connection::{execute_with_retry, StoreError};
use crate::models::Observation;

/// Store one fully decoded observation in the observations table.
///
/// Faulted readings and uncomputed derived metrics go in as NULL, so a
/// sensor fault is never confused with a real zero downstream. Uses the
/// retry mechanism to ride out transient connection issues.
pub async fn store_observation(
    observation: &Observation,
    uv_index: i32,
    database_url: &str,
) -> Result<(), StoreError> {
    // Clone data for move into async closure
    let observation = observation.clone();

    execute_with_retry(database_url, move |client| {
        let obs = observation.clone();
        async move {
            client
                .execute(
                    "INSERT INTO observations(time, temp_ch0, temp_ch1, temp_ch2,
                         humidity_ch0, humidity_ch1, humidity_ch2, pressure,
                         wind_chill, wind_gust, wind_speed, wind_dir, rainfall,
                         dew_point, real_feel, uv_index)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
                    &[
                        &obs.timestamp,
                        &obs.temperature[0].value(),
                        &obs.temperature[1].value(),
                        &obs.temperature[2].value(),
                        &obs.humidity[0].value(),
                        &obs.humidity[1].value(),
                        &obs.humidity[2].value(),
                        &obs.pressure.value(),
                        &obs.wind_chill.value(),
                        &obs.wind_gust.value(),
                        &obs.wind_speed.value(),
                        &obs.wind_dir.value(),
                        &obs.rainfall.value(),
                        &obs.dew_point,
                        &obs.real_feel,
                        &uv_index,
                    ],
                )
                .await
        }
    })
    .await
}
