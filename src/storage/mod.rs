//! # Storage Module
//!
//! Persistent append-only log of GPS fixes on an I2C EEPROM.
//!
//! This module handles:
//! - Fixed 10-byte record encoding (longitude, latitude, packed time)
//! - Wear-aware single-byte access with write-cycle settle delays
//! - Counter-based append/read over fixed record slots
//! - Capacity enforcement

pub mod layout;
pub mod record;
pub mod device;
pub mod store;
pub mod log;
