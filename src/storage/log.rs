//! # Append-Only Location Log
//!
//! Fixed-capacity array of record slots behind a persisted item counter.
//!
//! The counter is the write cursor: record `i` is valid iff `i < counter`.
//! An append writes the slot first and advances the counter last, so losing
//! power mid-append drops at most the record being written. The two counter
//! bytes are written separately; an interruption between them leaves a mixed
//! value that is neither detected nor repaired.

use tracing::{debug, info};

use super::device::ByteDevice;
use super::layout::{COUNTER_ADDRESS, MAX_ITEMS, RECORD_SIZE, REGION_SIZE, SLOTS_START};
use super::record::{decode_record, encode_record, LocationRecord};
use super::store::WearAwareStore;
use crate::error::{Result, TrackerError};
use crate::wait::Idle;

/// Result of an append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Record stored at slot `index`
    Stored { index: u16 },
    /// Log full; nothing was written
    Full,
}

/// Persistent append-only log of location records
#[derive(Debug)]
pub struct AppendLog<D> {
    store: WearAwareStore<D>,
}

impl<D: ByteDevice> AppendLog<D> {
    /// Open the log on top of a byte store
    ///
    /// # Errors
    ///
    /// Returns `DeviceTooSmall` if the device cannot hold the counter and
    /// every slot.
    pub fn open(store: WearAwareStore<D>) -> Result<Self> {
        let actual = store.capacity();
        if actual < REGION_SIZE {
            return Err(TrackerError::DeviceTooSmall {
                required: REGION_SIZE,
                actual,
            });
        }

        Ok(Self { store })
    }

    /// Maximum number of records
    pub fn capacity(&self) -> u16 {
        MAX_ITEMS
    }

    /// Number of valid records, as persisted
    pub fn count(&mut self) -> Result<u16> {
        let low = self.store.read_byte(COUNTER_ADDRESS)?;
        let high = self.store.read_byte(COUNTER_ADDRESS + 1)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Whether the persisted counter exceeds the capacity
    ///
    /// True on a factory-fresh device that reads `0xFFFF`. Such a log accepts
    /// no appends until it is reset.
    pub fn counter_out_of_range(&mut self) -> Result<bool> {
        Ok(self.count()? > MAX_ITEMS)
    }

    /// Append one record
    ///
    /// # Returns
    ///
    /// * `AppendOutcome::Stored` - Record written, counter advanced
    /// * `AppendOutcome::Full` - Capacity reached, device untouched
    ///
    /// # Errors
    ///
    /// Returns `Bus` on a failed device transaction. If the failure happens
    /// while the slot is being written the counter is left as it was.
    pub async fn append<I>(
        &mut self,
        record: &LocationRecord,
        idle: &mut I,
    ) -> Result<AppendOutcome>
    where
        I: Idle + ?Sized,
    {
        let counter = self.count()?;
        if counter >= MAX_ITEMS {
            debug!("Log full ({} records), dropping record", counter);
            return Ok(AppendOutcome::Full);
        }

        let base = slot_address(counter);
        for (offset, byte) in encode_record(record).into_iter().enumerate() {
            self.store.write_byte(base + offset as u16, byte, idle).await?;
        }

        self.write_counter(counter + 1, idle).await?;
        debug!("Stored record {} at 0x{:04X}", counter, base);

        Ok(AppendOutcome::Stored { index: counter })
    }

    /// Read the record in slot `index`
    ///
    /// The caller bounds `index` by [`count`](Self::count); slots at or past
    /// the counter hold stale bytes and decode to whatever was left there.
    ///
    /// # Errors
    ///
    /// Returns `SlotOutOfRange` for indices at or past the capacity, and
    /// `Bus` on a failed device transaction.
    pub fn read_at(&mut self, index: u16) -> Result<LocationRecord> {
        if index >= MAX_ITEMS {
            return Err(TrackerError::SlotOutOfRange {
                index,
                capacity: MAX_ITEMS,
            });
        }

        let base = slot_address(index);
        let mut slot = [0u8; RECORD_SIZE];
        for (offset, byte) in slot.iter_mut().enumerate() {
            *byte = self.store.read_byte(base + offset as u16)?;
        }

        Ok(decode_record(&slot))
    }

    /// Forget every record by zeroing the counter
    ///
    /// Slot bytes are left in place and get overwritten as the log grows
    /// again.
    pub async fn reset<I>(&mut self, idle: &mut I) -> Result<()>
    where
        I: Idle + ?Sized,
    {
        self.write_counter(0, idle).await?;
        info!("Log reset");
        Ok(())
    }

    async fn write_counter<I>(&mut self, value: u16, idle: &mut I) -> Result<()>
    where
        I: Idle + ?Sized,
    {
        let [low, high] = value.to_le_bytes();
        self.store.write_byte(COUNTER_ADDRESS, low, idle).await?;
        self.store.write_byte(COUNTER_ADDRESS + 1, high, idle).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &WearAwareStore<D> {
        &self.store
    }
}

fn slot_address(index: u16) -> u16 {
    SLOTS_START + index * RECORD_SIZE as u16
}
