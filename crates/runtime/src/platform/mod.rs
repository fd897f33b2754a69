//! Operating-system backends for process access and keyboard input.
//!
//! Only Windows is supported. On other targets the same API exists but
//! every process operation fails with [`MemoryError::Unsupported`], which
//! keeps the rest of the crate (and its tests) portable.
//!
//! [`MemoryError::Unsupported`]: crate::error::MemoryError::Unsupported

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::{GameProcess, KeyboardInjector, find_processes, focus_window};

#[cfg(not(windows))]
mod unsupported;
#[cfg(not(windows))]
pub use unsupported::{GameProcess, KeyboardInjector, find_processes, focus_window};

/// A running process matched by executable name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
}

/// Case-insensitive executable name comparison.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn matches_name(candidate: &str, wanted: &str) -> bool {
    candidate.eq_ignore_ascii_case(wanted.trim())
}
