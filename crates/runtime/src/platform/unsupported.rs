use tracing::trace;

use super::ProcessInfo;
use crate::error::MemoryError;
use crate::input::{InputInjector, VirtualKey};
use crate::memory::ProcessMemory;

/// Placeholder handle; attaching always fails off Windows.
#[derive(Debug)]
pub struct GameProcess {
    pid: u32,
}

impl GameProcess {
    pub fn attach(_pid: u32) -> Result<Self, MemoryError> {
        Err(MemoryError::Unsupported)
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl ProcessMemory for GameProcess {
    fn read_bytes(&self, _address: u64, _len: usize) -> Result<Vec<u8>, MemoryError> {
        Err(MemoryError::Unsupported)
    }

    fn write_bytes(&self, _address: u64, _bytes: &[u8]) -> Result<(), MemoryError> {
        Err(MemoryError::Unsupported)
    }
}

#[derive(Debug, Default)]
pub struct KeyboardInjector;

impl KeyboardInjector {
    pub fn new() -> Self {
        Self
    }
}

impl InputInjector for KeyboardInjector {
    fn key_down(&mut self, key: VirtualKey) {
        trace!("Dropping key down {}", key);
    }

    fn key_up(&mut self, key: VirtualKey) {
        trace!("Dropping key up {}", key);
    }
}

pub fn find_processes(_name: &str) -> Result<Vec<ProcessInfo>, MemoryError> {
    Err(MemoryError::Unsupported)
}

pub fn focus_window(_pid: u32) -> bool {
    false
}
