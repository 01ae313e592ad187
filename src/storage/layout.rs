//! # Storage Layout Constants
//!
//! Byte layout of the log region on the EEPROM.
//!
//! ```text
//! Offset 0      : item counter (u16, little-endian)
//! Offset 2      : slot 0 (10 bytes)
//! Offset 12     : slot 1 (10 bytes)
//! ...
//! Offset 2+10*i : slot i
//! ```

/// Size of the smallest supported device (24LC256, 32 KiB)
pub const DEVICE_MIN_SIZE: usize = 32 * 1024;

/// Offset of the persisted item counter
pub const COUNTER_ADDRESS: u16 = 0;

/// Item counter width in bytes
pub const COUNTER_SIZE: usize = 2;

/// Offset of the first record slot
pub const SLOTS_START: u16 = COUNTER_ADDRESS + COUNTER_SIZE as u16;

/// Encoded record size: longitude(4) + latitude(4) + packed time(2)
pub const RECORD_SIZE: usize = 10;

/// Maximum number of records held by the log
///
/// The exact budget on a 32 KiB device is 3276 slots; kept below it.
pub const MAX_ITEMS: u16 = 3200;

/// Bytes covered by the counter and every slot
pub const REGION_SIZE: usize = SLOTS_START as usize + RECORD_SIZE * MAX_ITEMS as usize;
