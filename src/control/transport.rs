//! Operator console transport: control bytes in, text lines out.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::config::SerialConfig;
use crate::error::{Result, TrackerError};

/// Line terminator on the operator console
pub const LINE_ENDING: &str = "\r\n";

/// Duplex text channel to the operator
#[async_trait]
pub trait Transport: Send {
    /// Whether a control byte can be read without waiting
    fn available(&mut self) -> Result<bool>;

    /// Wait for the next control byte; `None` once the channel is closed
    async fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Send one line of text
    async fn write_line(&mut self, line: &str) -> Result<()>;
}

/// Write `line` followed by [`LINE_ENDING`] and flush
pub async fn write_line_to<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(LINE_ENDING.as_bytes()).await?;
    writer.flush().await
}

/// Read one byte; `None` at end of stream
pub async fn read_byte_from<R>(reader: &mut R) -> std::io::Result<Option<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut byte = [0u8; 1];
    match reader.read(&mut byte).await? {
        0 => Ok(None),
        _ => Ok(Some(byte[0])),
    }
}

/// Operator console on a serial port
pub struct SerialTransport {
    port: tokio_serial::SerialStream,
    device_path: String,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SerialTransport {
    /// Open the console serial port (8N1)
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

        info!("Control console opened at {} ({} baud)", config.port, config.baud_rate);

        Ok(Self {
            port,
            device_path: config.port.clone(),
        })
    }

    /// Path of the opened serial device
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn available(&mut self) -> Result<bool> {
        use tokio_serial::SerialPort;

        let pending = self.port.bytes_to_read().map_err(|e| {
            TrackerError::Serial(format!("Failed to poll {}: {}", self.device_path, e))
        })?;
        Ok(pending > 0)
    }

    async fn read_byte(&mut self) -> Result<Option<u8>> {
        read_byte_from(&mut self.port)
            .await
            .map_err(|e| TrackerError::Serial(format!("Failed to read control byte: {}", e)))
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        write_line_to(&mut self.port, line)
            .await
            .map_err(|e| TrackerError::Serial(format!("Failed to write console line: {}", e)))
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted console: queued input bytes, captured output lines
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        pub input: VecDeque<u8>,
        pub lines: Vec<String>,
        /// Availability polls answered `false` before input shows up
        pub quiet_polls: usize,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_input(input: &[u8]) -> Self {
            Self {
                input: input.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        fn available(&mut self) -> Result<bool> {
            if self.quiet_polls > 0 {
                self.quiet_polls -= 1;
                return Ok(false);
            }
            Ok(!self.input.is_empty())
        }

        async fn read_byte(&mut self) -> Result<Option<u8>> {
            Ok(self.input.pop_front())
        }

        async fn write_line(&mut self, line: &str) -> Result<()> {
            self.lines.push(line.to_string());
            Ok(())
        }
    }
}
