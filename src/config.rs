//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TrackerError};
use crate::storage::device::sysfs_eeprom_path;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Baud rates accepted for both serial ports
const SUPPORTED_BAUD_RATES: &[u32] = &[4800, 9600, 19200, 38400, 57600, 115200];

/// Log levels accepted by `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_gps")]
    pub gps: SerialConfig,

    #[serde(default = "default_control")]
    pub control: SerialConfig,

    #[serde(default)]
    pub eeprom: EepromConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// EEPROM configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EepromConfig {
    /// I2C bus number
    #[serde(default = "default_i2c_bus")]
    pub bus: u8,

    /// 7-bit device address
    #[serde(default = "default_i2c_address")]
    pub address: u8,

    /// Explicit device file, overriding the sysfs path derived from bus/address
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Device write-cycle time
    #[serde(default = "default_write_cycle_ms")]
    pub write_cycle_ms: u64,
}

/// Tracking loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TrackingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rolling log files; console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

// Default value functions
fn default_gps() -> SerialConfig {
    SerialConfig { port: "/dev/ttyS0".to_string(), baud_rate: default_baud_rate() }
}
fn default_control() -> SerialConfig {
    SerialConfig { port: "/dev/ttyUSB0".to_string(), baud_rate: default_baud_rate() }
}
fn default_baud_rate() -> u32 { 9600 }

fn default_i2c_bus() -> u8 { 1 }
fn default_i2c_address() -> u8 { 0x50 }
fn default_write_cycle_ms() -> u64 { 5 }

fn default_interval_ms() -> u64 { 5000 }

fn default_log_level() -> String { "info".to_string() }

impl Default for EepromConfig {
    fn default() -> Self {
        Self {
            bus: default_i2c_bus(),
            address: default_i2c_address(),
            path: None,
            write_cycle_ms: default_write_cycle_ms(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { interval_ms: default_interval_ms() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), dir: None }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gps: default_gps(),
            control: default_control(),
            eeprom: EepromConfig::default(),
            tracking: TrackingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EepromConfig {
    /// Device file to open
    pub fn device_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| sysfs_eeprom_path(self.bus, self.address))
    }

    /// Settle delay after each performed write
    pub fn write_cycle(&self) -> Duration {
        Duration::from_millis(self.write_cycle_ms)
    }
}

impl TrackingConfig {
    /// Pause between samples
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gps_tracklog::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        for (name, serial) in [("gps", &self.gps), ("control", &self.control)] {
            if serial.port.is_empty() {
                return Err(invalid(format!("{} port cannot be empty", name)));
            }

            if !SUPPORTED_BAUD_RATES.contains(&serial.baud_rate) {
                return Err(invalid(format!(
                    "{} baud_rate must be one of: {:?}",
                    name, SUPPORTED_BAUD_RATES
                )));
            }
        }

        if self.gps.port == self.control.port {
            return Err(invalid("gps and control must use different ports"));
        }

        if self.eeprom.address > 0x7F {
            return Err(invalid("eeprom address must be a 7-bit I2C address (0x00-0x7F)"));
        }

        if self.eeprom.write_cycle_ms == 0 || self.eeprom.write_cycle_ms > 100 {
            return Err(invalid("write_cycle_ms must be between 1 and 100"));
        }

        if matches!(&self.eeprom.path, Some(path) if path.as_os_str().is_empty()) {
            return Err(invalid("eeprom path cannot be empty when set"));
        }

        if self.tracking.interval_ms < 100 || self.tracking.interval_ms > 600_000 {
            return Err(invalid("interval_ms must be between 100 and 600000"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!("logging level must be one of: {:?}", LOG_LEVELS)));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> TrackerError {
    TrackerError::Config(toml::de::Error::custom(msg))
}
