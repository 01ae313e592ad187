//! # Location Record Codec
//!
//! Encodes one GPS fix into a fixed 10-byte slot and back.
//!
//! ## Layout
//!
//! ```text
//! Byte 0..4 : longitude, IEEE-754 f32, little-endian
//! Byte 4..8 : latitude,  IEEE-754 f32, little-endian
//! Byte 8..10: packed time, u16, little-endian
//! ```
//!
//! ## Packed Time
//!
//! ```text
//! bits 0-3  : hour, 12-hour form (no AM/PM flag)
//! bits 4-9  : minute
//! bits 10-15: second
//! ```
//!
//! Hours above 12 are folded by subtracting 12, so 14:00 reads back as 2:00.

use bytes::{Buf, BufMut};

use super::layout::RECORD_SIZE;

const HOUR_MASK: u16 = 0x000F;
const MINUTE_SHIFT: u16 = 4;
const MINUTE_MASK: u16 = 0x003F;
const SECOND_SHIFT: u16 = 10;
const SECOND_MASK: u16 = 0x003F;

/// Time of fix as stored in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl FixTime {
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self { hour, minute, second }
    }
}

/// One sampled GPS fix
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationRecord {
    /// Latitude in degrees
    pub latitude: f32,

    /// Longitude in degrees
    pub longitude: f32,

    /// Time of fix
    pub time: FixTime,
}

impl LocationRecord {
    pub fn new(latitude: f32, longitude: f32, time: FixTime) -> Self {
        Self {
            latitude,
            longitude,
            time,
        }
    }
}

/// Pack a time of fix into its 16-bit stored form
///
/// Hours above 12 are folded to their 12-hour counterpart. Minute and second
/// are masked to 6 bits each; out-of-range inputs are not rejected.
///
/// # Examples
///
/// ```
/// use gps_tracklog::storage::record::{pack_time, unpack_time, FixTime};
///
/// let packed = pack_time(FixTime::new(14, 45, 5));
/// assert_eq!(unpack_time(packed), FixTime::new(2, 45, 5));
/// ```
pub fn pack_time(time: FixTime) -> u16 {
    let hour = if time.hour > 12 { time.hour - 12 } else { time.hour };

    (hour as u16 & HOUR_MASK)
        | ((time.minute as u16 & MINUTE_MASK) << MINUTE_SHIFT)
        | ((time.second as u16 & SECOND_MASK) << SECOND_SHIFT)
}

/// Unpack a stored 16-bit time word
pub fn unpack_time(packed: u16) -> FixTime {
    FixTime {
        hour: (packed & HOUR_MASK) as u8,
        minute: ((packed >> MINUTE_SHIFT) & MINUTE_MASK) as u8,
        second: ((packed >> SECOND_SHIFT) & SECOND_MASK) as u8,
    }
}

/// Encode a record into its 10-byte slot form
///
/// # Examples
///
/// ```
/// use gps_tracklog::storage::record::{encode_record, FixTime, LocationRecord};
///
/// let record = LocationRecord::new(32.1, 34.8, FixTime::new(10, 15, 30));
/// let bytes = encode_record(&record);
/// assert_eq!(&bytes[0..4], &34.8f32.to_le_bytes());
/// ```
pub fn encode_record(record: &LocationRecord) -> [u8; RECORD_SIZE] {
    let mut slot = [0u8; RECORD_SIZE];
    let mut buf = &mut slot[..];

    buf.put_f32_le(record.longitude);
    buf.put_f32_le(record.latitude);
    buf.put_u16_le(pack_time(record.time));

    slot
}

/// Decode a 10-byte slot
///
/// Any byte pattern decodes to some record; callers only decode slots below
/// the item counter.
pub fn decode_record(slot: &[u8; RECORD_SIZE]) -> LocationRecord {
    let mut buf = &slot[..];

    let longitude = buf.get_f32_le();
    let latitude = buf.get_f32_le();
    let time = unpack_time(buf.get_u16_le());

    LocationRecord {
        latitude,
        longitude,
        time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_field_order() {
        let record = LocationRecord::new(1.5, -2.25, FixTime::new(3, 4, 5));
        let slot = encode_record(&record);

        assert_eq!(&slot[0..4], &(-2.25f32).to_le_bytes(), "longitude first");
        assert_eq!(&slot[4..8], &1.5f32.to_le_bytes(), "latitude second");
        assert_eq!(u16::from_le_bytes([slot[8], slot[9]]), pack_time(record.time));
    }

    #[test]
    fn test_pack_time_bit_positions() {
        // 10:15:30 -> 10 | 15 << 4 | 30 << 10
        assert_eq!(pack_time(FixTime::new(10, 15, 30)), 10 | (15 << 4) | (30 << 10));
        assert_eq!(pack_time(FixTime::new(0, 0, 0)), 0);
        assert_eq!(pack_time(FixTime::new(12, 59, 59)), 12 | (59 << 4) | (59 << 10));
    }

    #[test]
    fn test_second_uses_top_bit() {
        // 59 << 10 sets bit 15; decode must still mask, not sign-extend
        let packed = pack_time(FixTime::new(0, 0, 59));
        assert!(packed & 0x8000 != 0);
        assert_eq!(unpack_time(packed).second, 59);
    }

    #[test]
    fn test_afternoon_hours_fold() {
        assert_eq!(unpack_time(pack_time(FixTime::new(13, 0, 0))).hour, 1);
        assert_eq!(unpack_time(pack_time(FixTime::new(23, 0, 0))).hour, 11);
        assert_eq!(unpack_time(pack_time(FixTime::new(12, 0, 0))).hour, 12);
        assert_eq!(unpack_time(pack_time(FixTime::new(0, 0, 0))).hour, 0);
    }

    #[test]
    fn test_round_trip_over_full_day() {
        let coords = [
            (32.1f32, 34.8f32),
            (-33.865143, 151.2099),
            (0.0, -0.0),
            (89.99999, -179.99999),
        ];

        for hour in 0u8..24 {
            for minute in (0u8..60).step_by(7) {
                for second in (0u8..60).step_by(11) {
                    for &(lat, lng) in &coords {
                        let time = FixTime::new(hour, minute, second);
                        let record = LocationRecord::new(lat, lng, time);
                        let decoded = decode_record(&encode_record(&record));

                        assert_eq!(decoded.latitude.to_bits(), lat.to_bits());
                        assert_eq!(decoded.longitude.to_bits(), lng.to_bits());
                        assert_eq!(decoded.time.minute, minute);
                        assert_eq!(decoded.time.second, second);

                        let expected_hour = if hour > 12 { hour - 12 } else { hour };
                        assert_eq!(decoded.time.hour, expected_hour, "hour {}", hour);
                    }
                }
            }
        }
    }

    #[test]
    fn test_decode_garbage_is_deterministic() {
        let slot = [0xFFu8; RECORD_SIZE];
        let first = decode_record(&slot);
        let second = decode_record(&slot);

        assert!(first.latitude.is_nan());
        assert_eq!(first.latitude.to_bits(), second.latitude.to_bits());
        assert_eq!(first.time, FixTime::new(15, 63, 63));
    }

    #[test]
    fn test_out_of_range_minute_is_masked() {
        // 64 does not fit in 6 bits and must not spill into the second field
        let packed = pack_time(FixTime::new(1, 64, 2));
        assert_eq!(unpack_time(packed), FixTime::new(1, 0, 2));
    }
}
