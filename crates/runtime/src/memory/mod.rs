//! Process memory access.
//!
//! [`ProcessMemory`] is the narrow interface the loop reads the game through.
//! [`layout`] pins the structure offsets relative to the calibrated base
//! addresses and [`sample`] reads one consistent set of fields per tick.
pub mod layout;
pub mod sample;

pub use layout::AddressLayout;
pub use sample::RawSample;

use std::io;

use crate::error::MemoryError;

/// Read/write primitives over another process's address space.
pub trait ProcessMemory {
    /// Reads exactly `len` bytes starting at `address`.
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>, MemoryError>;

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<(), MemoryError>;

    /// Reads a little-endian `i32`.
    fn read_i32(&self, address: u64) -> Result<i32, MemoryError> {
        let bytes = self.read_bytes(address, 4)?;
        let word: [u8; 4] = bytes
            .get(..4)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| short_read(address, 4))?;
        Ok(i32::from_le_bytes(word))
    }

    fn read_u8(&self, address: u64) -> Result<u8, MemoryError> {
        let bytes = self.read_bytes(address, 1)?;
        bytes.first().copied().ok_or_else(|| short_read(address, 1))
    }

    fn write_i32(&self, address: u64, value: i32) -> Result<(), MemoryError> {
        self.write_bytes(address, &value.to_le_bytes())
    }
}

fn short_read(address: u64, len: usize) -> MemoryError {
    MemoryError::Read {
        address,
        len,
        source: io::Error::from(io::ErrorKind::UnexpectedEof),
    }
}
