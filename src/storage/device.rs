//! # EEPROM Device Access
//!
//! Single-byte random access to the non-volatile device.
//!
//! On Linux an I2C EEPROM bound to the `at24` driver shows up as a plain file
//! at `/sys/bus/i2c/devices/<bus>-<address>/eeprom`. Positioned reads and
//! writes on that file translate to bus transactions, so the production
//! device is a thin wrapper around [`std::fs::File`].

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, TrackerError};

/// Raw byte access to a non-volatile device
#[cfg_attr(test, mockall::automock)]
pub trait ByteDevice: Send {
    /// Read the byte stored at `address`
    fn read_byte(&mut self, address: u16) -> Result<u8>;

    /// Store `value` at `address`
    fn write_byte(&mut self, address: u16, value: u8) -> Result<()>;

    /// Addressable size in bytes
    fn capacity(&self) -> usize;
}

/// Build the sysfs path of an `at24` EEPROM
///
/// # Examples
///
/// ```
/// use gps_tracklog::storage::device::sysfs_eeprom_path;
///
/// let path = sysfs_eeprom_path(1, 0x50);
/// assert_eq!(path.to_str(), Some("/sys/bus/i2c/devices/1-0050/eeprom"));
/// ```
pub fn sysfs_eeprom_path(bus: u8, address: u8) -> PathBuf {
    PathBuf::from(format!("/sys/bus/i2c/devices/{}-{:04x}/eeprom", bus, address))
}

/// EEPROM exposed as a file by the kernel
pub struct SysfsEeprom {
    file: File,
    path: PathBuf,
    size: usize,
}

impl std::fmt::Debug for SysfsEeprom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysfsEeprom")
            .field("path", &self.path)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl SysfsEeprom {
    /// Open the EEPROM file for read/write access
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened or its size cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let size = file.metadata()?.len() as usize;

        info!("Opened EEPROM at {} ({} bytes)", path.display(), size);

        Ok(Self { file, path, size })
    }

    /// Path of the opened device file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bus_error(address: u16, source: std::io::Error) -> TrackerError {
        TrackerError::Bus { address, source }
    }
}

impl ByteDevice for SysfsEeprom {
    fn read_byte(&mut self, address: u16) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.file
            .read_exact_at(&mut byte, address as u64)
            .map_err(|e| Self::bus_error(address, e))?;
        Ok(byte[0])
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        self.file
            .write_all_at(&[value], address as u64)
            .map_err(|e| Self::bus_error(address, e))?;
        debug!("EEPROM write 0x{:04X} <- 0x{:02X}", address, value);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;

    /// In-memory device with transaction counters
    #[derive(Debug, Clone)]
    pub struct MemoryDevice {
        pub bytes: Vec<u8>,
        pub reads: usize,
        pub writes: usize,
    }

    impl MemoryDevice {
        /// Device filled with `0xFF`, like a factory-fresh EEPROM
        pub fn new(size: usize) -> Self {
            Self {
                bytes: vec![0xFF; size],
                reads: 0,
                writes: 0,
            }
        }

        /// Device filled with zeroes
        pub fn zeroed(size: usize) -> Self {
            Self {
                bytes: vec![0; size],
                reads: 0,
                writes: 0,
            }
        }

        fn out_of_range(address: u16) -> TrackerError {
            TrackerError::Bus {
                address,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "address past end of device",
                ),
            }
        }
    }

    impl ByteDevice for MemoryDevice {
        fn read_byte(&mut self, address: u16) -> Result<u8> {
            self.reads += 1;
            self.bytes
                .get(address as usize)
                .copied()
                .ok_or_else(|| Self::out_of_range(address))
        }

        fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
            self.writes += 1;
            let slot = self
                .bytes
                .get_mut(address as usize)
                .ok_or_else(|| Self::out_of_range(address))?;
            *slot = value;
            Ok(())
        }

        fn capacity(&self) -> usize {
            self.bytes.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MemoryDevice;
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn image_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_sysfs_path_format() {
        assert_eq!(
            sysfs_eeprom_path(0, 0x57),
            PathBuf::from("/sys/bus/i2c/devices/0-0057/eeprom")
        );
        assert_eq!(
            sysfs_eeprom_path(10, 0x50),
            PathBuf::from("/sys/bus/i2c/devices/10-0050/eeprom")
        );
    }

    #[test]
    fn test_sysfs_eeprom_reports_file_size() {
        let image = image_file(&[0u8; 64]);
        let device = SysfsEeprom::open(image.path()).unwrap();

        assert_eq!(device.capacity(), 64);
        assert_eq!(device.path(), image.path());
    }

    #[test]
    fn test_sysfs_eeprom_read_write() {
        let image = image_file(&[0xAAu8; 16]);
        let mut device = SysfsEeprom::open(image.path()).unwrap();

        assert_eq!(device.read_byte(3).unwrap(), 0xAA);
        device.write_byte(3, 0x42).unwrap();
        assert_eq!(device.read_byte(3).unwrap(), 0x42);
        assert_eq!(device.read_byte(4).unwrap(), 0xAA);

        let on_disk = std::fs::read(image.path()).unwrap();
        assert_eq!(on_disk[3], 0x42);
    }

    #[test]
    fn test_sysfs_eeprom_read_past_end_is_bus_error() {
        let image = image_file(&[0u8; 4]);
        let mut device = SysfsEeprom::open(image.path()).unwrap();

        match device.read_byte(10) {
            Err(TrackerError::Bus { address, .. }) => assert_eq!(address, 10),
            other => panic!("Expected Bus error, got: {:?}", other),
        }
    }

    #[test]
    fn test_sysfs_eeprom_missing_file() {
        let result = SysfsEeprom::open("/nonexistent/eeprom");
        assert!(matches!(result, Err(TrackerError::Io(_))));
    }

    #[test]
    fn test_memory_device_counts_transactions() {
        let mut device = MemoryDevice::zeroed(8);
        device.write_byte(1, 7).unwrap();
        assert_eq!(device.read_byte(1).unwrap(), 7);
        assert_eq!(device.reads, 1);
        assert_eq!(device.writes, 1);
        assert!(device.read_byte(8).is_err());
    }
}
