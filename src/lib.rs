//! # GPS Tracklog Library
//!
//! Record GPS fixes into an I2C EEPROM and export them over a serial console.
//!
//! This library provides the persistent append-only location log, the NMEA
//! input side, the operator command protocol, and the acquisition loop that
//! ties them together.

pub mod config;
pub mod error;
pub mod wait;
pub mod storage;
pub mod gps;
pub mod control;
pub mod tracker;
