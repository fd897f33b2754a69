use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Stable handle for a tracked mob.
///
/// Ids are handed out in increasing order by the
/// [`EntityStore`](super::EntityStore) and never reused within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tile coordinates as the game client stores them.
///
/// X grows to the right and Y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// The all-zero sample the client reports for an empty slot.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn is_origin(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Saturates at `u32::MAX` for coordinates at opposite ends of the `i32` range.
    pub fn manhattan(self, other: Position) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }

    /// True when `other` lies within the 3x3 block centred on `self`.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }

    /// `None` when the shifted tile falls outside the `i32` range.
    pub fn checked_offset(self, (dx, dy): (i32, i32)) -> Option<Position> {
        Some(Position::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
        ))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Facing / movement direction.
///
/// Discriminants match the facing codes stored in the client's mob structure.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    Down = 0,
    Left = 1,
    Up = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Decodes a raw facing code; anything outside `0..=3` is unknown.
    pub const fn from_face(code: i32) -> Option<Direction> {
        match code {
            0 => Some(Direction::Down),
            1 => Some(Direction::Left),
            2 => Some(Direction::Up),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Whether moving from `from` to `to` is a strict step in this direction.
    ///
    /// Only the coordinate along this direction's axis is compared.
    pub fn is_progress(self, from: Position, to: Position) -> bool {
        match self {
            Direction::Right => to.x > from.x,
            Direction::Left => to.x < from.x,
            Direction::Down => to.y > from.y,
            Direction::Up => to.y < from.y,
        }
    }

    pub const fn key(self) -> Key {
        match self {
            Direction::Up => Key::Up,
            Direction::Down => Key::Down,
            Direction::Left => Key::Left,
            Direction::Right => Key::Right,
        }
    }
}

/// Every key the bot presses.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    #[strum(to_string = "attack", serialize = "ctrl")]
    Attack,
}

impl Key {
    pub const ALL: [Key; 5] = [Key::Up, Key::Down, Key::Left, Key::Right, Key::Attack];

    /// Parses a key name (`up`, `down`, `left`, `right`, `attack`/`ctrl`).
    pub fn from_name(name: &str) -> Result<Key, CoreError> {
        Key::from_str(name.trim()).map_err(|_| CoreError::UnknownKey(name.trim().to_string()))
    }

    pub const fn direction(self) -> Option<Direction> {
        match self {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            Key::Attack => None,
        }
    }

    pub const fn is_movement(self) -> bool {
        !matches!(self, Key::Attack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_codes_follow_client_layout() {
        assert_eq!(Direction::from_face(0), Some(Direction::Down));
        assert_eq!(Direction::from_face(1), Some(Direction::Left));
        assert_eq!(Direction::from_face(2), Some(Direction::Up));
        assert_eq!(Direction::from_face(3), Some(Direction::Right));
        assert_eq!(Direction::from_face(4), None);
        assert_eq!(Direction::from_face(-1), None);
    }

    #[test]
    fn progress_ignores_orthogonal_axis() {
        let from = Position::new(5, 5);
        assert!(Direction::Right.is_progress(from, Position::new(6, 9)));
        assert!(!Direction::Right.is_progress(from, Position::new(5, 6)));
        assert!(Direction::Up.is_progress(from, Position::new(5, 4)));
        assert!(!Direction::Down.is_progress(from, Position::new(5, 4)));
    }

    #[test]
    fn key_names_parse_case_insensitively() {
        assert_eq!(Key::from_name("UP").unwrap(), Key::Up);
        assert_eq!(Key::from_name(" right ").unwrap(), Key::Right);
        assert_eq!(Key::from_name("ctrl").unwrap(), Key::Attack);
        assert_eq!(Key::from_name("attack").unwrap(), Key::Attack);
    }

    #[test]
    fn unknown_key_name_is_rejected() {
        assert_eq!(
            Key::from_name("jump"),
            Err(CoreError::UnknownKey("jump".to_string()))
        );
    }

    #[test]
    fn adjacency_includes_diagonals_and_self() {
        let me = Position::new(5, 5);
        assert!(me.is_adjacent(me));
        assert!(me.is_adjacent(Position::new(6, 6)));
        assert!(!me.is_adjacent(Position::new(7, 5)));
        assert_eq!(me.manhattan(Position::new(2, 9)), 7);
    }

    #[test]
    fn distance_between_range_extremes_saturates() {
        let low = Position::new(i32::MIN, i32::MIN);
        let high = Position::new(i32::MAX, i32::MAX);
        assert_eq!(low.manhattan(high), u32::MAX);
        assert_eq!(high.checked_offset((1, 0)), None);
        assert_eq!(low.checked_offset((0, -1)), None);
        assert_eq!(
            Position::new(4, 4).checked_offset((-1, 0)),
            Some(Position::new(3, 4))
        );
    }

    #[test]
    fn direction_names_are_static() {
        let name: &'static str = Direction::Up.into();
        assert_eq!(name, "up");
    }
}
