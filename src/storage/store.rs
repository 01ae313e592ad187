//! # Wear-Aware Byte Store
//!
//! EEPROM cells survive a limited number of write cycles, so every write is
//! preceded by a read and skipped when the cell already holds the value.
//! Performed writes wait out the device write cycle before returning.

use std::time::Duration;
use tracing::trace;

use super::device::ByteDevice;
use crate::error::Result;
use crate::wait::Idle;

/// Default write-cycle time of a 24LCxx EEPROM
pub const DEFAULT_WRITE_CYCLE: Duration = Duration::from_millis(5);

/// Result of a single-byte write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The byte was written and the settle delay elapsed
    Written,
    /// The cell already held the value; nothing was written
    Unchanged,
}

/// Byte store that skips redundant writes
#[derive(Debug)]
pub struct WearAwareStore<D> {
    device: D,
    settle: Duration,
}

impl<D: ByteDevice> WearAwareStore<D> {
    /// Wrap a device, waiting `settle` after every performed write
    pub fn new(device: D, settle: Duration) -> Self {
        Self { device, settle }
    }

    /// Read one byte
    pub fn read_byte(&mut self, address: u16) -> Result<u8> {
        self.device.read_byte(address)
    }

    /// Write one byte unless the cell already holds it
    ///
    /// # Arguments
    ///
    /// * `address` - Device offset
    /// * `value` - Byte to store
    /// * `idle` - Hook that spends the settle delay
    ///
    /// # Errors
    ///
    /// Returns `Bus` if either the read-back or the write fails. No retry is
    /// attempted and the written value is not verified.
    pub async fn write_byte<I>(
        &mut self,
        address: u16,
        value: u8,
        idle: &mut I,
    ) -> Result<WriteOutcome>
    where
        I: Idle + ?Sized,
    {
        if self.device.read_byte(address)? == value {
            trace!("Skipping write at 0x{:04X}, value unchanged", address);
            return Ok(WriteOutcome::Unchanged);
        }

        self.device.write_byte(address, value)?;
        idle.idle(self.settle).await;

        Ok(WriteOutcome::Written)
    }

    /// Addressable size of the underlying device
    pub fn capacity(&self) -> usize {
        self.device.capacity()
    }

    #[cfg(test)]
    pub(crate) fn device(&self) -> &D {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::storage::device::mocks::MemoryDevice;
    use crate::storage::device::MockByteDevice;
    use crate::wait::mocks::RecordingIdle;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_write_then_same_value_is_skipped() {
        let mut store = WearAwareStore::new(MemoryDevice::zeroed(16), DEFAULT_WRITE_CYCLE);
        let mut idle = RecordingIdle::new();

        assert_eq!(store.write_byte(5, 0x3C, &mut idle).await.unwrap(), WriteOutcome::Written);
        assert_eq!(store.write_byte(5, 0x3C, &mut idle).await.unwrap(), WriteOutcome::Unchanged);

        assert_eq!(store.device().writes, 1, "only one physical write");
        assert_eq!(store.read_byte(5).unwrap(), 0x3C);
    }

    #[tokio::test]
    async fn test_settle_delay_only_after_performed_write() {
        let settle = Duration::from_millis(7);
        let mut store = WearAwareStore::new(MemoryDevice::zeroed(4), settle);
        let mut idle = RecordingIdle::new();

        store.write_byte(0, 0, &mut idle).await.unwrap();
        assert!(idle.waits.is_empty(), "skipped write must not wait");

        store.write_byte(0, 1, &mut idle).await.unwrap();
        assert_eq!(idle.waits, vec![settle]);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mut device = MockByteDevice::new();
        device.expect_read_byte().with(eq(9)).returning(|_| Ok(0));
        device.expect_write_byte().returning(|address, _| {
            Err(TrackerError::Bus {
                address,
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "no ack"),
            })
        });

        let mut store = WearAwareStore::new(device, DEFAULT_WRITE_CYCLE);
        let mut idle = RecordingIdle::new();

        let result = store.write_byte(9, 1, &mut idle).await;
        assert!(matches!(result, Err(TrackerError::Bus { address: 9, .. })));
        assert!(idle.waits.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_skips_write() {
        let mut device = MockByteDevice::new();
        device.expect_read_byte().returning(|address| {
            Err(TrackerError::Bus {
                address,
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "no ack"),
            })
        });
        device.expect_write_byte().never();

        let mut store = WearAwareStore::new(device, DEFAULT_WRITE_CYCLE);
        let mut idle = RecordingIdle::new();

        assert!(store.write_byte(3, 1, &mut idle).await.is_err());
    }
}
