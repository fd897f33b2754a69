//! Memory layout of the client structures the bot reads.
//!
//! # Mob structure
//!
//! Offsets are relative to the calibrated mob base address. The spawn slot
//! sits immediately before the movement slot.
//!
//! ```text
//! Offset   Field              Size    Description
//! ──────────────────────────────────────────────────────
//! -0x14    SpawnFace          4       Facing of the last spawned mob
//! -0x10    SpawnY             4       Y of the last spawned mob
//! -0x0C    SpawnX             4       X of the last spawned mob
//!  0x00    Face               4       Facing of the last moved mob
//!  0x04    Y                  4       Y of the last moved mob (new tile)
//!  0x08    X                  4       X of the last moved mob (new tile)
//!  0x98    Hit1               1       Non-zero after a registered hit
//!  0x9C    Kill1              1       Changes to non-zero on a kill
//!  0xA0    Hit2               1       Non-zero after a registered hit
//!  0xA4    Kill2              1       Changes to non-zero on a kill
//! ```
//!
//! # Player structure
//!
//! X at the player base, Y one word later.

use crate::calibration::Calibration;
use crate::error::CalibrationError;

pub mod mob {
    pub const FACE: u64 = 0x0;
    pub const Y: u64 = 0x4;
    pub const X: u64 = 0x8;

    /// Distances *below* the mob base.
    pub const SPAWN_FACE_BELOW: u64 = 0x14;
    pub const SPAWN_Y_BELOW: u64 = 0x10;
    pub const SPAWN_X_BELOW: u64 = 0xC;

    pub const HIT_1: u64 = 0x98;
    pub const HIT_2: u64 = 0xA0;
    pub const KILL_1: u64 = 0x9C;
    pub const KILL_2: u64 = 0xA4;
}

pub mod player {
    pub const X: u64 = 0x0;
    pub const Y: u64 = 0x4;
}

/// Absolute addresses of every field the loop touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    pub mob_face: u64,
    pub mob_y: u64,
    pub mob_x: u64,
    pub spawn_face: u64,
    pub spawn_y: u64,
    pub spawn_x: u64,
    pub hit_indicators: [u64; 2],
    pub kill_indicators: [u64; 2],
    pub char_x: u64,
    pub char_y: u64,
}

impl AddressLayout {
    pub fn from_calibration(calibration: &Calibration) -> Result<Self, CalibrationError> {
        let mob_base = calibration.mob_base;
        let player_base = calibration.player_base;

        let below = |distance: u64| {
            mob_base
                .checked_sub(distance)
                .ok_or(CalibrationError::OutOfRange {
                    name: "mob",
                    address: mob_base,
                })
        };
        let above = |base: u64, offset: u64, name: &'static str| {
            base.checked_add(offset)
                .ok_or(CalibrationError::OutOfRange {
                    name,
                    address: base,
                })
        };

        Ok(Self {
            mob_face: above(mob_base, mob::FACE, "mob")?,
            mob_y: above(mob_base, mob::Y, "mob")?,
            mob_x: above(mob_base, mob::X, "mob")?,
            spawn_face: below(mob::SPAWN_FACE_BELOW)?,
            spawn_y: below(mob::SPAWN_Y_BELOW)?,
            spawn_x: below(mob::SPAWN_X_BELOW)?,
            hit_indicators: [
                above(mob_base, mob::HIT_1, "mob")?,
                above(mob_base, mob::HIT_2, "mob")?,
            ],
            kill_indicators: [
                above(mob_base, mob::KILL_1, "mob")?,
                above(mob_base, mob::KILL_2, "mob")?,
            ],
            char_x: above(player_base, player::X, "player")?,
            char_y: above(player_base, player::Y, "player")?,
        })
    }
}
