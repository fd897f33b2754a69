//! Unified error types surfaced by the runtime.
//!
//! Startup failures (attach, calibration, configuration) are fatal. Read
//! failures inside the perception loop are recovered locally and only surface
//! here once the configured retry budget is exhausted.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Core(#[from] bot_core::CoreError),

    #[error("no running process named '{0}'")]
    ProcessNotFound(String),

    #[error("invalid value '{value}' for {name}")]
    InvalidSetting { name: String, value: String },

    #[error("memory reads failed {attempts} times in a row")]
    ReadRetriesExhausted { attempts: u32 },
}

/// Failures of the process memory primitives.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("failed to open process {pid}")]
    Attach {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {len} bytes at 0x{address:X}")]
    Read {
        address: u64,
        len: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {len} bytes at 0x{address:X}")]
    Write {
        address: u64,
        len: usize,
        #[source]
        source: io::Error,
    },

    #[error("process access is not supported on this platform")]
    Unsupported,
}

impl MemoryError {
    /// True for failures the perception loop retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, MemoryError::Read { .. })
    }
}

/// Missing or unusable calibration addresses.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration file {} is missing or unreadable", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("calibration file {} does not hold a hex address: '{content}'", path.display())]
    Invalid { path: PathBuf, content: String },

    #[error("{name} base address 0x{address:X} is out of range")]
    OutOfRange { name: &'static str, address: u64 },

    #[error("failed to write calibration file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
