//! # Operator Commands
//!
//! Single-digit commands read from the console:
//!
//! | Byte  | Command | Effect                                      |
//! |-------|---------|---------------------------------------------|
//! | `'0'` | help    | Print the command list                      |
//! | `'1'` | export  | Print every stored fix, oldest first        |
//! | `'2'` | reset   | Export, then empty the log                  |
//!
//! Any other byte is ignored.

use tracing::{debug, info, warn};

use super::transport::Transport;
use crate::error::Result;
use crate::storage::device::ByteDevice;
use crate::storage::layout::MAX_ITEMS;
use crate::storage::log::AppendLog;
use crate::storage::record::LocationRecord;
use crate::wait::Idle;

/// Title line of the help banner
pub const HELP_TITLE: &str = "GPS tracklog commands:";

/// Operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Export,
    Reset,
}

impl Command {
    /// Every command, in menu order
    pub const ALL: [Command; 3] = [Command::Help, Command::Export, Command::Reset];

    /// Map a console byte to a command
    ///
    /// # Examples
    ///
    /// ```
    /// use gps_tracklog::control::command::Command;
    ///
    /// assert_eq!(Command::from_byte(b'1'), Some(Command::Export));
    /// assert_eq!(Command::from_byte(b'7'), None);
    /// assert_eq!(Command::from_byte(b'x'), None);
    /// ```
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(Command::Help),
            b'1' => Some(Command::Export),
            b'2' => Some(Command::Reset),
            _ => None,
        }
    }

    /// Menu number
    pub fn digit(self) -> u8 {
        match self {
            Command::Help => 0,
            Command::Export => 1,
            Command::Reset => 2,
        }
    }

    /// Menu description
    pub fn description(self) -> &'static str {
        match self {
            Command::Help => "help - show this list",
            Command::Export => "export - print stored fixes",
            Command::Reset => "reset - export, then erase the log",
        }
    }
}

/// Format one record as an export line
///
/// Longitude first, six decimals, time fields unpadded:
/// `34.800000,32.100000,10:15:30`.
pub fn format_record(record: &LocationRecord) -> String {
    format!(
        "{},{},{}:{}:{}",
        six_decimals(record.longitude),
        six_decimals(record.latitude),
        record.time.hour,
        record.time.minute,
        record.time.second
    )
}

/// Round from the shortest decimal that maps back to `value`.
///
/// Formatting the exact binary value would print 34.9f32 as `34.900002`.
fn six_decimals(value: f32) -> String {
    let shortest: f64 = value.to_string().parse().unwrap_or(value as f64);
    format!("{:.6}", shortest)
}

/// Format the line printed after a reset
pub fn format_reset_confirmation(count: u16) -> String {
    format!("Log reset, {} records stored", count)
}

/// Run the command selected by `byte`
///
/// Bytes that are not a known command digit are consumed silently.
///
/// # Errors
///
/// Propagates storage and transport failures. A reset whose export fails
/// does not reset the log.
pub async fn dispatch<D, T, I>(
    byte: u8,
    log: &mut AppendLog<D>,
    transport: &mut T,
    idle: &mut I,
) -> Result<()>
where
    D: ByteDevice,
    T: Transport + ?Sized,
    I: Idle + ?Sized,
{
    let Some(command) = Command::from_byte(byte) else {
        debug!("Ignoring console byte 0x{:02X}", byte);
        return Ok(());
    };

    info!("Running {:?} command", command);
    match command {
        Command::Help => help(transport).await,
        Command::Export => export(log, transport).await.map(|_| ()),
        Command::Reset => reset(log, transport, idle).await,
    }
}

/// Print the command list
pub async fn help<T>(transport: &mut T) -> Result<()>
where
    T: Transport + ?Sized,
{
    transport.write_line(HELP_TITLE).await?;
    for command in Command::ALL {
        let line = format!("{} - {}", command.digit(), command.description());
        transport.write_line(&line).await?;
    }
    Ok(())
}

/// Print every valid record; returns the number printed
pub async fn export<D, T>(log: &mut AppendLog<D>, transport: &mut T) -> Result<u16>
where
    D: ByteDevice,
    T: Transport + ?Sized,
{
    let count = log.count()?;
    let readable = if count > MAX_ITEMS {
        warn!(
            "Item counter {} exceeds capacity {}, exporting {} slots",
            count, MAX_ITEMS, MAX_ITEMS
        );
        MAX_ITEMS
    } else {
        count
    };

    for index in 0..readable {
        let record = log.read_at(index)?;
        transport.write_line(&format_record(&record)).await?;
    }

    debug!("Exported {} records", readable);
    Ok(readable)
}

/// Export, empty the log, and confirm with the counter read back
pub async fn reset<D, T, I>(log: &mut AppendLog<D>, transport: &mut T, idle: &mut I) -> Result<()>
where
    D: ByteDevice,
    T: Transport + ?Sized,
    I: Idle + ?Sized,
{
    export(log, transport).await?;
    log.reset(idle).await?;

    let count = log.count()?;
    transport.write_line(&format_reset_confirmation(count)).await
}
