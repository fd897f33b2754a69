//! Calibrated base addresses.
//!
//! The scanning step leaves two plain-text files next to the bot, each with
//! one hexadecimal address (`0x` prefix optional). Both must be present and
//! parseable before the loop can start.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::CalibrationError;

pub const MOB_ADDRESS_FILE: &str = "mobxy.txt";
pub const PLAYER_ADDRESS_FILE: &str = "playerxy.txt";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calibration {
    pub mob_base: u64,
    pub player_base: u64,
}

impl Calibration {
    /// Loads both files from `dir` using the default file names.
    pub fn load(dir: &Path) -> Result<Self, CalibrationError> {
        Self::load_files(&dir.join(MOB_ADDRESS_FILE), &dir.join(PLAYER_ADDRESS_FILE))
    }

    pub fn load_files(mob_path: &Path, player_path: &Path) -> Result<Self, CalibrationError> {
        let calibration = Self {
            mob_base: read_address(mob_path)?,
            player_base: read_address(player_path)?,
        };
        info!(
            "Calibration loaded: mob=0x{:X} player=0x{:X}",
            calibration.mob_base, calibration.player_base
        );
        Ok(calibration)
    }

    /// Writes both files into `dir` in `0x`-prefixed upper-case hex.
    pub fn save(&self, dir: &Path) -> Result<(), CalibrationError> {
        write_address(&dir.join(MOB_ADDRESS_FILE), self.mob_base)?;
        write_address(&dir.join(PLAYER_ADDRESS_FILE), self.player_base)
    }
}

/// Parses `0x1A2B`, `1a2b` or ` 0X1A2B\n`.
pub fn parse_address(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

fn read_address(path: &Path) -> Result<u64, CalibrationError> {
    let content = fs::read_to_string(path).map_err(|source| CalibrationError::Missing {
        path: path.to_path_buf(),
        source,
    })?;
    parse_address(&content).ok_or_else(|| CalibrationError::Invalid {
        path: path.to_path_buf(),
        content: content.trim().to_string(),
    })
}

fn write_address(path: &Path, address: u64) -> Result<(), CalibrationError> {
    fs::write(path, format!("0x{address:X}")).map_err(|source| CalibrationError::Write {
        path: PathBuf::from(path),
        source,
    })
}
