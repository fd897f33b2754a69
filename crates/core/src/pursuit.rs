//! One pursuit step toward the current target.
//!
//! The planner keeps no state between ticks. Each call either engages an
//! adjacent target (face, attack, check for a kill) or tries to close the
//! distance with up to three feedback-checked moves:
//!
//! 1. the primary axis (larger coordinate gap; ties go vertical)
//! 2. the secondary axis, when the target is off that axis too
//! 3. one more attempt on the axis opposite the primary
//!
//! All side effects go through [`Actuator`], which the runtime backs with
//! real key presses and memory reads.

use arrayvec::ArrayVec;
use tracing::{debug, info};

use crate::state::{Direction, EntityId, EntityStore, Position};

/// Signals read back after an attack press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackOutcome {
    pub hit: bool,
    pub kill: bool,
}

/// Result of a single planner step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PursuitOutcome {
    /// Whether an action was carried out successfully (engagement always counts).
    pub acted: bool,
    /// Lock state to carry into the next tick.
    pub locked: bool,
}

/// Side effects the planner needs from the outside world.
pub trait Actuator {
    type Error;

    /// Turns toward `direction` with a long, unchecked press.
    fn face(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Presses the attack key and reports hit/kill signals.
    fn attack(&mut self) -> Result<AttackOutcome, Self::Error>;

    /// Presses `direction` and reports whether the character actually moved
    /// that way from `from`.
    fn try_move(&mut self, direction: Direction, from: Position) -> Result<bool, Self::Error>;
}

fn horizontal_toward(from: Position, to: Position) -> Option<Direction> {
    match to.x.cmp(&from.x) {
        std::cmp::Ordering::Greater => Some(Direction::Right),
        std::cmp::Ordering::Less => Some(Direction::Left),
        std::cmp::Ordering::Equal => None,
    }
}

fn vertical_toward(from: Position, to: Position) -> Option<Direction> {
    match to.y.cmp(&from.y) {
        std::cmp::Ordering::Greater => Some(Direction::Down),
        std::cmp::Ordering::Less => Some(Direction::Up),
        std::cmp::Ordering::Equal => None,
    }
}

/// Direction to face an adjacent target; the horizontal axis wins.
pub fn facing_toward(character: Position, target: Position) -> Option<Direction> {
    horizontal_toward(character, target).or_else(|| vertical_toward(character, target))
}

/// Ordered movement attempts toward `target`: primary axis, then secondary.
pub fn approach_for(character: Position, target: Position) -> ArrayVec<Direction, 2> {
    let horizontal = horizontal_toward(character, target);
    let vertical = vertical_toward(character, target);

    let ordered = if character.x.abs_diff(target.x) > character.y.abs_diff(target.y) {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };

    ordered.into_iter().flatten().collect()
}

/// Fallback direction on the axis opposite `primary`.
fn alternative_for(primary: Direction, character: Position, target: Position) -> Option<Direction> {
    if primary.is_horizontal() {
        vertical_toward(character, target)
    } else {
        horizontal_toward(character, target)
    }
}

/// Runs one pursuit step against `target`.
///
/// A confirmed kill removes the target from `store` and unlocks. A missing
/// target is reported as a failed, unlocked step.
pub fn step<A: Actuator>(
    store: &mut EntityStore,
    target: EntityId,
    character: Position,
    locked: bool,
    actuator: &mut A,
) -> Result<PursuitOutcome, A::Error> {
    let Some(target_position) = store.get(target).map(|entity| entity.position) else {
        return Ok(PursuitOutcome {
            acted: false,
            locked: false,
        });
    };

    if character.is_adjacent(target_position) {
        return engage(store, target, character, target_position, actuator);
    }

    let attempts = approach_for(character, target_position);
    for &direction in &attempts {
        if actuator.try_move(direction, character)? {
            debug!("Moved {} toward mob {}", direction, target);
            return Ok(PursuitOutcome {
                acted: true,
                locked,
            });
        }
    }

    let alternative = attempts
        .first()
        .and_then(|&primary| alternative_for(primary, character, target_position));
    if let Some(direction) = alternative {
        if actuator.try_move(direction, character)? {
            debug!("Alternative move {} toward mob {}", direction, target);
            return Ok(PursuitOutcome {
                acted: true,
                locked,
            });
        }
    }

    Ok(PursuitOutcome {
        acted: false,
        locked,
    })
}

fn engage<A: Actuator>(
    store: &mut EntityStore,
    target: EntityId,
    character: Position,
    target_position: Position,
    actuator: &mut A,
) -> Result<PursuitOutcome, A::Error> {
    if let Some(direction) = facing_toward(character, target_position) {
        actuator.face(direction)?;
    }

    let outcome = actuator.attack()?;
    if outcome.kill {
        info!("Removing killed mob {}", target);
        store.remove(target);
        return Ok(PursuitOutcome {
            acted: true,
            locked: false,
        });
    }

    Ok(PursuitOutcome {
        acted: true,
        locked: true,
    })
}
