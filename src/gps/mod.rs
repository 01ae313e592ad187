//! # GPS Module
//!
//! NMEA 0183 positioning input.
//!
//! This module handles:
//! - Reading the GPS receiver's serial stream
//! - Assembling and parsing NMEA sentences
//! - Tracking the latest valid fix
//! - Draining the stream while other components wait

pub mod feed;
pub mod sensor;

use chrono::{NaiveTime, Timelike};

use crate::storage::record::{FixTime, LocationRecord};
use crate::wait::Idle;

/// Most recent valid position reported by the receiver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// Latitude in degrees, south negative
    pub latitude: f64,

    /// Longitude in degrees, west negative
    pub longitude: f64,

    /// UTC time of fix
    pub time: NaiveTime,
}

impl Fix {
    /// Narrow to the stored record form
    pub fn to_record(&self) -> LocationRecord {
        LocationRecord::new(
            self.latitude as f32,
            self.longitude as f32,
            FixTime::new(
                self.time.hour() as u8,
                self.time.minute() as u8,
                self.time.second() as u8,
            ),
        )
    }
}

/// Source of GPS fixes
///
/// Waiting through [`Idle`] keeps consuming receiver output, so a source is
/// also the natural idle hook for every delay in the tracking loop.
pub trait PositionSource: Idle {
    /// Latest valid fix, if the receiver has one
    fn fix(&self) -> Option<Fix>;

    /// Characters consumed from the receiver so far
    fn chars_processed(&self) -> u64;
}
