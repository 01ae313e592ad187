//! # GPS Receiver
//!
//! Serial-attached NMEA receiver (u-blox NEO-6M and similar, 9600 baud).

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

use super::feed::NmeaFeed;
use super::{Fix, PositionSource};
use crate::config::SerialConfig;
use crate::error::{Result, TrackerError};
use crate::wait::Idle;

/// Read buffer size; one NMEA burst at 9600 baud fits easily
const READ_CHUNK: usize = 256;

/// GPS receiver reading from an async byte stream
pub struct GpsSensor<R> {
    reader: R,
    feed: NmeaFeed,
    closed: bool,
}

impl<R> std::fmt::Debug for GpsSensor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpsSensor")
            .field("feed", &self.feed)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl GpsSensor<tokio_serial::SerialStream> {
    /// Open the receiver's serial port (8N1)
    ///
    /// # Errors
    ///
    /// Returns `Serial` if the port cannot be opened.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        use tokio_serial::SerialPortBuilderExt;

        let port = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| TrackerError::Serial(format!("Failed to open {}: {}", config.port, e)))?;

        info!("GPS receiver opened at {} ({} baud)", config.port, config.baud_rate);
        Ok(Self::new(port))
    }
}

impl<R: AsyncRead + Unpin + Send> GpsSensor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            feed: NmeaFeed::new(),
            closed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn feed(&self) -> &NmeaFeed {
        &self.feed
    }

    /// Read and parse receiver output until `deadline`
    async fn drain_until(&mut self, deadline: Instant) {
        let mut buf = [0u8; READ_CHUNK];

        while !self.closed {
            let read = tokio::select! {
                _ = sleep_until(deadline) => return,
                read = self.reader.read(&mut buf) => read,
            };

            match read {
                Ok(0) => {
                    warn!("GPS stream closed");
                    self.close();
                }
                Ok(n) => self.feed.feed(&buf[..n]),
                Err(e) => {
                    warn!("GPS read failed: {}", e);
                    self.close();
                }
            }
        }

        sleep_until(deadline).await;
    }

    /// Stop reading; without a stream there is no current fix
    fn close(&mut self) {
        self.closed = true;
        self.feed.clear_fix();
        info!(
            "GPS receiver gone after {} sentences ({} rejected)",
            self.feed.sentences_parsed(),
            self.feed.sentences_failed()
        );
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> Idle for GpsSensor<R> {
    async fn idle(&mut self, duration: Duration) {
        self.drain_until(Instant::now() + duration).await;
    }
}

impl<R: AsyncRead + Unpin + Send> PositionSource for GpsSensor<R> {
    fn fix(&self) -> Option<Fix> {
        self.feed.fix()
    }

    fn chars_processed(&self) -> u64 {
        self.feed.chars_processed()
    }
}
