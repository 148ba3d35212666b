use time::OffsetDateTime;

use crate::decoder::fields::{self, PressureFault, RainFault, SensorFault, WindFault};
use crate::decoder::frame::RawFrame;
use crate::derived::{self, DerivedError};

pub use crate::decoder::fields::CHANNELS;

/// Channel the derived metrics read. The outdoor sensor reports on the
/// second slot of the triple array.
pub const OUTDOOR_CHANNEL: usize = 1;

/// One decoded field: a physical value, or the device-reported reason it
/// could not be read. A faulted field stays observably different from a
/// real zero reading everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<F> {
    Value(f32),
    Invalid(F),
}

impl<F> Reading<F> {
    pub fn value(&self) -> Option<f32> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::Invalid(_) => None,
        }
    }

    /// Fallback used when feeding derived formulas; storage keeps faults
    /// as NULL instead.
    pub fn value_or_zero(&self) -> f32 {
        self.value().unwrap_or(0.0)
    }
}

/// Everything measured and derived for one polling cycle.
///
/// Built fresh per received frame by `from_frame`, which decodes every
/// field independently; a fault in one field never aborts the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: OffsetDateTime,
    pub temperature: [Reading<SensorFault>; CHANNELS],
    pub humidity: [Reading<SensorFault>; CHANNELS],
    pub pressure: Reading<PressureFault>,
    pub wind_chill: Reading<WindFault>,
    pub wind_gust: Reading<WindFault>,
    pub wind_speed: Reading<WindFault>,
    pub wind_dir: Reading<WindFault>,
    pub rainfall: Reading<RainFault>,
    pub dew_point: Option<f32>,
    pub real_feel: Option<f32>,
}

impl Observation {
    /// Decode every field of a validated frame into a fresh record.
    pub fn from_frame(frame: &RawFrame, timestamp: OffsetDateTime) -> Self {
        Observation {
            timestamp,
            temperature: std::array::from_fn(|ch| fields::decode_temperature(frame, ch)),
            humidity: std::array::from_fn(|ch| fields::decode_humidity(frame, ch)),
            pressure: fields::decode_pressure(frame),
            wind_chill: fields::decode_wind_chill(frame),
            wind_gust: fields::decode_wind_gust(frame),
            wind_speed: fields::decode_wind_speed(frame),
            wind_dir: fields::decode_wind_dir(frame),
            rainfall: fields::decode_rainfall(frame),
            dew_point: None,
            real_feel: None,
        }
    }

    /// Dew point from the outdoor channel, cached on the record.
    pub fn calculate_dew_point(&mut self) -> Result<f32, DerivedError> {
        let dew = derived::dew_point(
            self.temperature[OUTDOOR_CHANNEL].value_or_zero(),
            self.humidity[OUTDOOR_CHANNEL].value_or_zero(),
        )?;
        self.dew_point = Some(dew);
        Ok(dew)
    }

    /// Apparent temperature, recomputing the dew point first when it is
    /// stale.
    pub fn calculate_real_feel(&mut self, uv_index: i32) -> Result<f32, DerivedError> {
        let dew = match self.dew_point {
            Some(dew) => dew,
            None => self.calculate_dew_point()?,
        };
        let feel = derived::real_feel(
            self.temperature[OUTDOOR_CHANNEL].value_or_zero(),
            self.wind_speed.value_or_zero(),
            dew,
            uv_index,
        );
        self.real_feel = Some(feel);
        Ok(feel)
    }
}
