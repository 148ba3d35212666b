/// Pure per-field decoders for the Hideki frame layout
///
/// Every decoder takes the whole frame and reads its own fixed byte range.
/// Fields are independent: a fault in one never aborts the others. Values
/// are BCD-encoded with flag bits for sign, half-degree fraction and range
/// extension; non-numeric nibbles are device sentinels, not digits.
use thiserror::Error;

use crate::decoder::frame::{
    RawFrame, PRESSURE_HIGH, PRESSURE_LOW, SENSOR_TRIPLE_BASE, WIND_CHILL, WIND_DIR, WIND_GUST,
    WIND_SPEED,
};
use crate::models::Reading;

/// Temperature/humidity sensor channels carried per frame.
pub const CHANNELS: usize = 3;

// The anemometer reports mph-equivalent values; observations carry km/h.
const MPS_PER_MPH: f32 = 2.23694;
const KMH_PER_MPS: f32 = 3.6;

/// Device-reported faults for the temperature/humidity triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorFault {
    /// Low nibble `0xC`/`0xB`, or a secondary channel without its
    /// presence bit.
    #[error("sensor not present")]
    Absent,
    /// Any other non-numeric nibble in the reading.
    #[error("unreadable BCD value")]
    Malformed,
}

/// Device-reported faults for the wind chill and anemometer fields,
/// distinguished by exact sentinel byte pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindFault {
    /// `(0xAA, 0x8A)`: the station has no reading yet.
    #[error("no reading yet")]
    NoReading,
    /// `(0xBB, 0x8B)`, or a missing presence bit.
    #[error("sensor link lost")]
    LinkLost,
    /// `(0xEE, 0x8E)`: uncorrectable sensor fault.
    #[error("uncorrectable sensor fault")]
    Severe,
    /// Any other non-numeric pattern.
    #[error("value outside protocol range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PressureFault {
    #[error("no pressure data available")]
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RainFault {
    #[error("rainfall decoding not supported by this protocol revision")]
    Unsupported,
}

/// Unchecked BCD interpretation of one byte: `10*high_nibble + low_nibble`.
/// Nibbles above 9 yield values above 90/9, which the callers use to spot
/// sentinel patterns.
fn bcd_raw(byte: u8) -> u32 {
    (byte >> 4) as u32 * 10 + (byte & 0x0F) as u32
}

/// Checked BCD decode of one byte. Nibbles above 9 are sentinels, never
/// digits, so `0x0A` faults rather than decoding to 10.
pub fn bcd(byte: u8) -> Result<u8, SensorFault> {
    if byte >> 4 > 9 || byte & 0x0F > 9 {
        Err(SensorFault::Malformed)
    } else {
        Ok(bcd_raw(byte) as u8)
    }
}

/// Barometric pressure in mb, quarter-millibar resolution. A high byte with
/// its top nibble at `0xF` means the station has no pressure data; that is
/// reported as a fault, never as a real 0.0 reading.
pub fn decode_pressure(frame: &RawFrame) -> Reading<PressureFault> {
    let low = frame.byte(PRESSURE_LOW);
    let high = frame.byte(PRESSURE_HIGH);
    if high & 0xF0 == 0xF0 {
        return Reading::Invalid(PressureFault::NoData);
    }
    Reading::Value((high as u32 * 0x100 + low as u32) as f32 * 0.0625)
}

/// Shared validity check for a temperature/humidity triple. The low nibble
/// of byte 0 must be numeric (`0xC`/`0xB` mean the sensor is absent), and
/// secondary channels must carry the presence bit in byte 1.
fn sensor_fault(frame: &RawFrame, channel: usize) -> Option<SensorFault> {
    let offset = SENSOR_TRIPLE_BASE + channel * 3;
    let b0 = frame.byte(offset);
    let b1 = frame.byte(offset + 1);

    let mut fault = None;
    if b0 & 0x0F > 9 {
        fault = Some(match b0 & 0x0F {
            0x0C | 0x0B => SensorFault::Absent,
            _ => SensorFault::Malformed,
        });
    }
    if channel > 0 && b1 & 0x40 != 0x40 {
        fault = Some(SensorFault::Absent);
    }
    fault
}

/// Temperature in °C for one sensor channel (0..=2).
///
/// Magnitude is `bcd(byte0)/10 + bcd(byte1 & 0x0F)*10`; bit `0x20` of byte 1
/// adds the half-degree fraction and bit `0x80` set means positive.
pub fn decode_temperature(frame: &RawFrame, channel: usize) -> Reading<SensorFault> {
    if let Some(fault) = sensor_fault(frame, channel) {
        return Reading::Invalid(fault);
    }
    let offset = SENSOR_TRIPLE_BASE + channel * 3;
    let b0 = frame.byte(offset);
    let b1 = frame.byte(offset + 1);

    let mut value = bcd_raw(b0) as f32 / 10.0 + (b1 & 0x0F) as f32 * 10.0;
    if b1 & 0x20 == 0x20 {
        value += 0.05;
    }
    if b1 & 0x80 != 0x80 {
        value = -value;
    }
    Reading::Value(value)
}

/// Relative humidity in percent for one sensor channel (0..=2).
///
/// An absent sensor faults the humidity as well; a merely malformed
/// temperature does not block it.
pub fn decode_humidity(frame: &RawFrame, channel: usize) -> Reading<SensorFault> {
    if sensor_fault(frame, channel) == Some(SensorFault::Absent) {
        return Reading::Invalid(SensorFault::Absent);
    }
    let b2 = frame.byte(SENSOR_TRIPLE_BASE + channel * 3 + 2);
    if b2 & 0x0F > 9 {
        return Reading::Invalid(SensorFault::Malformed);
    }
    Reading::Value(bcd_raw(b2) as f32)
}

/// Wind chill in °C, computed by the station itself. Same magnitude, sign
/// and fraction scheme as temperature, with four sentinel fault tiers.
pub fn decode_wind_chill(frame: &RawFrame) -> Reading<WindFault> {
    let b0 = frame.byte(WIND_CHILL);
    let b1 = frame.byte(WIND_CHILL + 1);

    if bcd_raw(b0 & 0xF0) > 90 || b0 & 0x0F > 9 {
        return Reading::Invalid(match (b0, b1) {
            (0xAA, 0x8A) => WindFault::NoReading,
            (0xBB, 0x8B) => WindFault::LinkLost,
            (0xEE, 0x8E) => WindFault::Severe,
            _ => WindFault::OutOfRange,
        });
    }
    if b1 & 0x40 != 0x40 {
        return Reading::Invalid(WindFault::LinkLost);
    }

    let mut value = bcd_raw(b0) as f32 / 10.0 + (b1 & 0x0F) as f32 * 10.0;
    if b1 & 0x20 == 0x20 {
        value += 0.05;
    }
    if b1 & 0x80 != 0x80 {
        value = -value;
    }
    Reading::Value(value)
}

/// Shared decoder for the two anemometer fields. Bit `0x10` of byte 1
/// extends the range past 99.9; the result is converted to km/h.
fn decode_anemometer(frame: &RawFrame, offset: usize) -> Reading<WindFault> {
    let b0 = frame.byte(offset);
    let b1 = frame.byte(offset + 1);

    if bcd_raw(b0 & 0xF0) > 90 || b0 & 0x0F > 9 {
        return Reading::Invalid(match (b0, b1) {
            (0xBB, 0x8B) => WindFault::LinkLost,
            (0xEE, 0x8E) => WindFault::Severe,
            _ => WindFault::OutOfRange,
        });
    }

    let extension = if b1 & 0x10 == 0x10 { 100.0 } else { 0.0 };
    let mph = bcd_raw(b0) as f32 / 10.0 + (b1 & 0x0F) as f32 * 10.0 + extension;
    Reading::Value(mph / MPS_PER_MPH * KMH_PER_MPS)
}

/// Wind gust in km/h.
pub fn decode_wind_gust(frame: &RawFrame) -> Reading<WindFault> {
    decode_anemometer(frame, WIND_GUST)
}

/// Wind speed in km/h.
pub fn decode_wind_speed(frame: &RawFrame) -> Reading<WindFault> {
    decode_anemometer(frame, WIND_SPEED)
}

/// Wind direction in degrees, 16-point compass (22.5° steps).
///
/// Unusable when either anemometer field faults at the severe or
/// out-of-range tier.
pub fn decode_wind_dir(frame: &RawFrame) -> Reading<WindFault> {
    for field in [decode_wind_gust(frame), decode_wind_speed(frame)] {
        if let Reading::Invalid(WindFault::Severe | WindFault::OutOfRange) = field {
            return Reading::Invalid(WindFault::Severe);
        }
    }
    Reading::Value((frame.byte(WIND_DIR) & 0x0F) as f32 * 22.5)
}

/// This protocol revision carries no rainfall field; callers get an explicit
/// fault instead of a fabricated accumulation.
pub fn decode_rainfall(_frame: &RawFrame) -> Reading<RainFault> {
    Reading::Invalid(RainFault::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::frame::FRAME_LEN;

    fn frame_with(values: &[(usize, u8)]) -> RawFrame {
        let mut buf = [0u8; FRAME_LEN];
        for &(offset, byte) in values {
            buf[offset] = byte;
        }
        RawFrame::from_bytes(buf)
    }

    #[test]
    fn bcd_decodes_numeric_bytes() {
        assert_eq!(bcd(0x23), Ok(23));
        assert_eq!(bcd(0x00), Ok(0));
        assert_eq!(bcd(0x99), Ok(99));
    }

    #[test]
    fn bcd_faults_on_non_numeric_nibbles() {
        // 0x0A must fault, not decode to 10.
        assert_eq!(bcd(0x0A), Err(SensorFault::Malformed));
        assert_eq!(bcd(0xA0), Err(SensorFault::Malformed));
    }

    #[test]
    fn pressure_follows_quarter_millibar_formula() {
        let frame = frame_with(&[(PRESSURE_LOW, 0x10), (PRESSURE_HIGH, 0x40)]);
        let expected = (0x40 as u32 * 0x100 + 0x10) as f32 * 0.0625;
        assert_eq!(decode_pressure(&frame), Reading::Value(expected));
        assert!(expected >= 0.0);
    }

    #[test]
    fn pressure_high_nibble_f_means_no_data() {
        // Any low byte; the 0xF top nibble of the high byte decides.
        let frame = frame_with(&[(PRESSURE_LOW, 0x42), (PRESSURE_HIGH, 0xF3)]);
        assert_eq!(
            decode_pressure(&frame),
            Reading::Invalid(PressureFault::NoData)
        );
    }

    #[test]
    fn temperature_positive_with_sign_bit_set() {
        // byte0=0x25, byte1=0x81: magnitude 2.5 + 1*10, positive, no fraction.
        let frame = frame_with(&[(0, 0x25), (1, 0x81)]);
        assert_eq!(decode_temperature(&frame, 0), Reading::Value(12.5));
    }

    #[test]
    fn temperature_negated_when_sign_bit_unset() {
        let frame = frame_with(&[(0, 0x25), (1, 0x01)]);
        assert_eq!(decode_temperature(&frame, 0), Reading::Value(-12.5));
    }

    #[test]
    fn temperature_fraction_bit_adds_half_degree_step() {
        let frame = frame_with(&[(0, 0x25), (1, 0xA1)]);
        assert_eq!(decode_temperature(&frame, 0), Reading::Value(12.55));
    }

    #[test]
    fn temperature_absent_sensor_codes() {
        for code in [0x0C, 0x0B] {
            let frame = frame_with(&[(0, code), (1, 0x81)]);
            assert_eq!(
                decode_temperature(&frame, 0),
                Reading::Invalid(SensorFault::Absent)
            );
        }
    }

    #[test]
    fn temperature_other_invalid_nibble_is_malformed() {
        let frame = frame_with(&[(0, 0x2A), (1, 0x81)]);
        assert_eq!(
            decode_temperature(&frame, 0),
            Reading::Invalid(SensorFault::Malformed)
        );
    }

    #[test]
    fn secondary_channel_requires_presence_bit() {
        // Channel 1 triple lives at bytes 3..=5; byte 4 lacks bit 0x40.
        let frame = frame_with(&[(3, 0x25), (4, 0x81)]);
        assert_eq!(
            decode_temperature(&frame, 1),
            Reading::Invalid(SensorFault::Absent)
        );
        // With the presence bit the same magnitude decodes.
        let frame = frame_with(&[(3, 0x25), (4, 0xC1)]);
        assert_eq!(decode_temperature(&frame, 1), Reading::Value(12.5));
    }

    #[test]
    fn humidity_decodes_directly_from_third_byte() {
        let frame = frame_with(&[(0, 0x25), (1, 0x81), (2, 0x65)]);
        assert_eq!(decode_humidity(&frame, 0), Reading::Value(65.0));
    }

    #[test]
    fn humidity_faults_with_absent_sensor() {
        let frame = frame_with(&[(0, 0x0C), (1, 0x81), (2, 0x65)]);
        assert_eq!(
            decode_humidity(&frame, 0),
            Reading::Invalid(SensorFault::Absent)
        );
    }

    #[test]
    fn humidity_survives_malformed_temperature() {
        // A generic temperature decode fault does not block humidity.
        let frame = frame_with(&[(0, 0x2A), (1, 0x81), (2, 0x65)]);
        assert_eq!(decode_humidity(&frame, 0), Reading::Value(65.0));
    }

    #[test]
    fn humidity_faults_on_its_own_bad_nibble() {
        let frame = frame_with(&[(0, 0x25), (1, 0x81), (2, 0x6A)]);
        assert_eq!(
            decode_humidity(&frame, 0),
            Reading::Invalid(SensorFault::Malformed)
        );
    }

    #[test]
    fn wind_chill_sentinel_pairs_map_to_distinct_faults() {
        let cases = [
            (0xAA, 0x8A, WindFault::NoReading),
            (0xBB, 0x8B, WindFault::LinkLost),
            (0xEE, 0x8E, WindFault::Severe),
            (0xDD, 0x8D, WindFault::OutOfRange),
        ];
        for (b0, b1, fault) in cases {
            let frame = frame_with(&[(WIND_CHILL, b0), (WIND_CHILL + 1, b1)]);
            assert_eq!(decode_wind_chill(&frame), Reading::Invalid(fault));
        }
    }

    #[test]
    fn wind_chill_requires_presence_bit() {
        let frame = frame_with(&[(WIND_CHILL, 0x25), (WIND_CHILL + 1, 0x81)]);
        assert_eq!(
            decode_wind_chill(&frame),
            Reading::Invalid(WindFault::LinkLost)
        );
    }

    #[test]
    fn wind_chill_decodes_like_temperature() {
        let frame = frame_with(&[(WIND_CHILL, 0x80), (WIND_CHILL + 1, 0xC1)]);
        assert_eq!(decode_wind_chill(&frame), Reading::Value(18.0));
        // Sign bit unset negates.
        let frame = frame_with(&[(WIND_CHILL, 0x80), (WIND_CHILL + 1, 0x41)]);
        assert_eq!(decode_wind_chill(&frame), Reading::Value(-18.0));
    }

    #[test]
    fn anemometer_sentinel_pairs_map_to_distinct_faults() {
        let cases = [
            (0xBB, 0x8B, WindFault::LinkLost),
            (0xEE, 0x8E, WindFault::Severe),
            (0xAA, 0x8A, WindFault::OutOfRange),
        ];
        for (b0, b1, fault) in cases {
            let frame = frame_with(&[(WIND_GUST, b0), (WIND_GUST + 1, b1)]);
            assert_eq!(decode_wind_gust(&frame), Reading::Invalid(fault));
            let frame = frame_with(&[(WIND_SPEED, b0), (WIND_SPEED + 1, b1)]);
            assert_eq!(decode_wind_speed(&frame), Reading::Invalid(fault));
        }
    }

    #[test]
    fn wind_speed_converts_to_kmh() {
        let frame = frame_with(&[(WIND_SPEED, 0x25), (WIND_SPEED + 1, 0x01)]);
        let expected = 12.5 / MPS_PER_MPH * KMH_PER_MPS;
        assert_eq!(decode_wind_speed(&frame), Reading::Value(expected));
    }

    #[test]
    fn wind_speed_range_extension_bit_adds_100() {
        let frame = frame_with(&[(WIND_SPEED, 0x25), (WIND_SPEED + 1, 0x11)]);
        let expected = 112.5 / MPS_PER_MPH * KMH_PER_MPS;
        assert_eq!(decode_wind_speed(&frame), Reading::Value(expected));
    }

    #[test]
    fn wind_dir_decodes_low_nibble_compass_step() {
        let frame = frame_with(&[(WIND_DIR, 0xF7)]);
        assert_eq!(decode_wind_dir(&frame), Reading::Value(7.0 * 22.5));
    }

    #[test]
    fn wind_dir_faults_when_anemometer_severely_faulted() {
        let frame = frame_with(&[(WIND_GUST, 0xEE), (WIND_GUST + 1, 0x8E), (WIND_DIR, 0x07)]);
        assert_eq!(decode_wind_dir(&frame), Reading::Invalid(WindFault::Severe));
        let frame = frame_with(&[(WIND_SPEED, 0xAA), (WIND_SPEED + 1, 0x8A), (WIND_DIR, 0x07)]);
        assert_eq!(decode_wind_dir(&frame), Reading::Invalid(WindFault::Severe));
    }

    #[test]
    fn wind_dir_tolerates_link_lost_anemometer() {
        let frame = frame_with(&[(WIND_GUST, 0xBB), (WIND_GUST + 1, 0x8B), (WIND_DIR, 0x04)]);
        assert_eq!(decode_wind_dir(&frame), Reading::Value(90.0));
    }

    #[test]
    fn rainfall_is_never_fabricated() {
        let frame = frame_with(&[]);
        assert_eq!(
            decode_rainfall(&frame),
            Reading::Invalid(RainFault::Unsupported)
        );
    }
}
