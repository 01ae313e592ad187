//! # Acquisition Controller
//!
//! Main loop that records GPS fixes until the operator speaks up.
//!
//! ## Modes
//!
//! ```text
//!            any control byte
//! TRACKING ───────────────────▶ COMMAND
//! ```
//!
//! - **Tracking**: append the current fix (if any), then wait one tracking
//!   interval while draining the GPS stream.
//! - **Command**: read one control byte per iteration and run it. There is
//!   no way back to tracking for the rest of the process run.

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::control::command;
use crate::control::transport::Transport;
use crate::error::Result;
use crate::gps::PositionSource;
use crate::storage::device::ByteDevice;
use crate::storage::log::{AppendLog, AppendOutcome};
use crate::wait::Idle;

/// Below this many received characters the receiver is assumed unplugged
const NO_DATA_THRESHOLD: u64 = 10;

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tracking,
    Command,
}

/// Outcome of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep looping
    Continue,
    /// Control channel closed
    Finished,
}

/// Records fixes while tracking and serves commands afterwards
pub struct AcquisitionController<S, D, T> {
    mode: Mode,
    sensor: S,
    log: AppendLog<D>,
    transport: T,
    interval: Duration,
    stored: u64,
    dropped: u64,
}

impl<S, D, T> std::fmt::Debug for AcquisitionController<S, D, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionController")
            .field("mode", &self.mode)
            .field("interval", &self.interval)
            .field("stored", &self.stored)
            .field("dropped", &self.dropped)
            .finish_non_exhaustive()
    }
}

impl<S, D, T> AcquisitionController<S, D, T>
where
    S: PositionSource,
    D: ByteDevice,
    T: Transport,
{
    /// Create a controller in tracking mode
    pub fn new(sensor: S, log: AppendLog<D>, transport: T, interval: Duration) -> Self {
        Self {
            mode: Mode::Tracking,
            sensor,
            log,
            transport,
            interval,
            stored: 0,
            dropped: 0,
        }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Loop until the control channel closes
    ///
    /// # Errors
    ///
    /// Only control channel failures end the loop. Storage errors are
    /// logged and the loop carries on.
    pub async fn run(&mut self) -> Result<()> {
        info!("Tracking every {:?}", self.interval);

        while self.step().await? == Step::Continue {}

        info!(
            "Control channel closed ({} fixes stored, {} dropped)",
            self.stored, self.dropped
        );
        Ok(())
    }

    /// Run one loop iteration
    pub async fn step(&mut self) -> Result<Step> {
        if self.mode == Mode::Tracking && self.transport.available()? {
            info!("Control input received, switching to command mode");
            self.mode = Mode::Command;
        }

        match self.mode {
            Mode::Tracking => {
                self.track().await;
                self.sensor.idle(self.interval).await;
                Ok(Step::Continue)
            }
            Mode::Command => self.serve_command().await,
        }
    }

    async fn track(&mut self) {
        let Some(fix) = self.sensor.fix() else {
            if self.sensor.chars_processed() < NO_DATA_THRESHOLD {
                warn!("No GPS data received: check wiring");
            } else {
                debug!("Waiting for GPS fix ({} chars processed)", self.sensor.chars_processed());
            }
            return;
        };

        let record = fix.to_record();
        match self.log.append(&record, &mut self.sensor).await {
            Ok(AppendOutcome::Stored { index }) => {
                self.stored += 1;
                debug!("Fix {:.6},{:.6} stored in slot {}", fix.latitude, fix.longitude, index);
            }
            Ok(AppendOutcome::Full) => {
                self.dropped += 1;
                warn!("Log full, fix dropped ({} so far)", self.dropped);
            }
            Err(e) => error!("Failed to store fix: {}", e),
        }
    }

    async fn serve_command(&mut self) -> Result<Step> {
        let Some(byte) = self.transport.read_byte().await? else {
            return Ok(Step::Finished);
        };

        let result =
            command::dispatch(byte, &mut self.log, &mut self.transport, &mut self.sensor).await;
        if let Err(e) = result {
            error!("Command 0x{:02X} failed: {}", byte, e);
        }

        Ok(Step::Continue)
    }

    #[cfg(test)]
    fn log_mut(&mut self) -> &mut AppendLog<D> {
        &mut self.log
    }
}
