//! # GPS Tracklog
//!
//! Record GPS fixes into an I2C EEPROM and export them over a serial console.
//!
//! The tracker samples the receiver every tracking interval and appends each
//! valid fix to the log. The first byte that arrives on the console stops
//! tracking for good; from then on the console accepts single-digit commands.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use gps_tracklog::config::{Config, LoggingConfig, DEFAULT_CONFIG_PATH};
use gps_tracklog::control::transport::SerialTransport;
use gps_tracklog::gps::sensor::GpsSensor;
use gps_tracklog::storage::device::SysfsEeprom;
use gps_tracklog::storage::log::AppendLog;
use gps_tracklog::storage::store::WearAwareStore;
use gps_tracklog::tracker::AcquisitionController;

/// File name prefix of rolling log files
const LOG_FILE_NAME: &str = "gps-tracklog.log";

/// Main entry point for GPS Tracklog
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Open the EEPROM and check it can hold the log
///    - Open the GPS receiver and the operator console
///
/// 2. **Main Loop**
///    - Track: store a fix every interval while the console is quiet
///    - Command: once a console byte arrives, serve help/export/reset
///    - Handle Ctrl+C for shutdown
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded
/// - EEPROM, GPS or console device cannot be opened
/// - The console fails while serving commands
///
/// # Examples
///
/// Run the application:
/// ```bash
/// gps-tracklog /etc/gps-tracklog.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO gps_tracklog: GPS Tracklog v0.1.0 starting...
/// INFO gps_tracklog::storage::device: Opened EEPROM at /sys/bus/i2c/devices/1-0050/eeprom (32768 bytes)
/// INFO gps_tracklog: Log holds 12 of 3200 records
/// INFO gps_tracklog::tracker: Tracking every 5s
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);

    info!("GPS Tracklog v{} starting...", env!("CARGO_PKG_VERSION"));

    let device = SysfsEeprom::open(config.eeprom.device_path())?;
    let eeprom_path = device.path().to_path_buf();
    let store = WearAwareStore::new(device, config.eeprom.write_cycle());
    let mut log = AppendLog::open(store)?;

    let count = log.count()?;
    if log.counter_out_of_range()? {
        warn!(
            "Item counter at {} reads {} (capacity {}), nothing is recorded until command 2 resets the log",
            eeprom_path.display(),
            count,
            log.capacity()
        );
    } else {
        info!("Log holds {} of {} records", count, log.capacity());
    }

    let sensor = GpsSensor::open(&config.gps)?;
    let transport = SerialTransport::open(&config.control)?;
    info!(
        "Send any byte on {} to stop tracking and enter command mode",
        transport.device_path()
    );

    let mut controller =
        AcquisitionController::new(sensor, log, transport, config.tracking.interval());

    tokio::select! {
        result = controller.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. When a log directory is set,
/// output is also written to a daily-rolling file; the returned guard must
/// stay alive to flush it.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}
