//! One read of every field the perception loop consumes.

use bot_core::Position;

use super::{AddressLayout, ProcessMemory};
use crate::error::MemoryError;

/// Raw values read at the start of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSample {
    pub mob_face: i32,
    pub mob: Position,
    pub spawn_face: i32,
    pub spawn: Position,
    pub character: Position,
}

impl RawSample {
    /// Reads all fields; any failure aborts the whole sample.
    pub fn read<M: ProcessMemory + ?Sized>(
        memory: &M,
        layout: &AddressLayout,
    ) -> Result<Self, MemoryError> {
        let mob_face = memory.read_i32(layout.mob_face)?;
        let mob_y = memory.read_i32(layout.mob_y)?;
        let mob_x = memory.read_i32(layout.mob_x)?;

        let spawn_face = memory.read_i32(layout.spawn_face)?;
        let spawn_y = memory.read_i32(layout.spawn_y)?;
        let spawn_x = memory.read_i32(layout.spawn_x)?;

        let character = read_character(memory, layout)?;

        Ok(Self {
            mob_face,
            mob: Position::new(mob_x, mob_y),
            spawn_face,
            spawn: Position::new(spawn_x, spawn_y),
            character,
        })
    }
}

pub fn read_character<M: ProcessMemory + ?Sized>(
    memory: &M,
    layout: &AddressLayout,
) -> Result<Position, MemoryError> {
    let x = memory.read_i32(layout.char_x)?;
    let y = memory.read_i32(layout.char_y)?;
    Ok(Position::new(x, y))
}
