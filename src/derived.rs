/// Dew point and apparent-temperature ("real feel") calculators
///
/// Closed-form empirical formulas over already-decoded observation fields;
/// nothing here re-reads the raw frame.
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DerivedError {
    /// Outdoor temperature and humidity are both still at the 0.0
    /// placeholder, so there is no real reading to derive from.
    #[error("insufficient data to derive a value")]
    InsufficientData,
}

/// km/h per mph; the real-feel formula works in imperial units.
const KMH_PER_MPH: f32 = 1.609_344;

fn fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Dew point in °C from outdoor temperature (°C) and relative humidity (%).
///
/// Refuses the all-zero placeholder pair; a computed 0.0 must never be
/// confused with "no reading yet".
pub fn dew_point(temp_c: f32, humidity_pct: f32) -> Result<f32, DerivedError> {
    if temp_c == 0.0 && humidity_pct == 0.0 {
        return Err(DerivedError::InsufficientData);
    }
    Ok((humidity_pct / 100.0).powf(0.125) * (112.0 + 0.9 * temp_c) - 112.0)
}

/// Apparent temperature in °C from outdoor temperature (°C), wind speed
/// (km/h), dew point (°C) and the current UV index (0 when the UV service
/// was unavailable).
pub fn real_feel(temp_c: f32, wind_kmh: f32, dew_point_c: f32, uv_index: i32) -> f32 {
    let heat_index = heat_index_f(
        fahrenheit(temp_c),
        wind_kmh / KMH_PER_MPH,
        fahrenheit(dew_point_c),
        uv_index,
    );
    (heat_index - 32.0) * 5.0 / 9.0
}

/// Imperial-unit core of the real-feel index. Branches at 65 °F; 65.0
/// exactly takes the cool branch.
fn heat_index_f(temp_f: f32, wind_mph: f32, dew_f: f32, uv_index: i32) -> f32 {
    let humidity_term = dew_f.max(55.0 + wind_mph.sqrt());
    let uv_term = uv_index as f32;
    let rain_term = 0.0; // no rain gauge in this protocol revision

    if temp_f > 65.0 {
        // Wind stress saturates: calm air still convects a little, and
        // anything past 56 mph strips heat no faster.
        let wind_term = if wind_mph < 4.0 {
            0.5 * wind_mph + 2.0
        } else if wind_mph > 56.0 {
            56.0
        } else {
            wind_mph
        };
        80.0 - wind_term + uv_term + humidity_term - rain_term
    } else {
        temp_f - wind_mph + uv_term + humidity_term - rain_term
    }
}
