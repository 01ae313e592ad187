//! # Control Module
//!
//! Operator console on a serial port.
//!
//! This module handles:
//! - Polling for control bytes without blocking the tracking loop
//! - Decoding single-digit commands (help, export, reset)
//! - Writing export and confirmation lines

pub mod transport;
pub mod command;
