//! Target selection with hysteresis.
//!
//! Two rules keep the bot from flickering between mobs:
//! - while locked (engaging an adjacent mob) the current target is kept
//!   regardless of distances
//! - otherwise the current target survives as long as it is no more than
//!   [`STABILITY_BAND`] tiles further than the closest candidate

use tracing::debug;

use crate::state::{EntityId, EntityStore, Position};

/// Extra Manhattan distance the current target may have over the closest mob.
pub const STABILITY_BAND: u32 = 2;

/// Which mob is being pursued and whether it is being engaged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetingState {
    pub current: Option<EntityId>,
    pub locked: bool,
}

impl TargetingState {
    pub fn reset(&mut self) {
        self.current = None;
        self.locked = false;
    }

    /// Drops the target if it no longer exists in `store`.
    ///
    /// Returns true when a reset happened.
    pub fn release_if_missing(&mut self, store: &EntityStore) -> bool {
        match self.current {
            Some(id) if !store.contains(id) => {
                debug!("Target {} left the store, unlocking", id);
                self.reset();
                true
            }
            _ => false,
        }
    }
}

/// Picks the mob to pursue from `character`'s point of view.
///
/// Closest by Manhattan distance wins; ties go to the smallest `(x, y)`
/// and then to the smallest id. Inactive mobs are never candidates.
pub fn select_target(
    store: &EntityStore,
    character: Position,
    current: Option<EntityId>,
    locked: bool,
) -> Option<EntityId> {
    let current = current.and_then(|id| store.get(id));

    if locked {
        if let Some(entity) = current {
            return Some(entity.id);
        }
    }

    let closest = store
        .iter()
        .filter(|entity| !entity.inactive)
        .min_by_key(|entity| {
            (
                character.manhattan(entity.position),
                entity.position.x,
                entity.position.y,
                entity.id,
            )
        })?;
    let closest_distance = character.manhattan(closest.position);

    if let Some(entity) = current {
        let current_distance = character.manhattan(entity.position);
        if current_distance <= closest_distance.saturating_add(STABILITY_BAND) {
            return Some(entity.id);
        }
        debug!(
            "Retargeting {} (dist {}) -> {} (dist {})",
            entity.id, current_distance, closest.id, closest_distance
        );
    }

    Some(closest.id)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn store_with(positions: &[(i32, i32)]) -> EntityStore {
        let mut store = EntityStore::new();
        let now = Instant::now();
        for &(x, y) in positions {
            store.on_spawn_detected(Position::new(x, y), 0, now);
        }
        store
    }

    #[test]
    fn empty_store_has_no_target() {
        let store = EntityStore::new();
        assert_eq!(select_target(&store, Position::new(5, 5), None, false), None);
    }

    #[test]
    fn picks_unique_closest() {
        let store = store_with(&[(20, 20), (6, 5), (1, 1)]);
        assert_eq!(
            select_target(&store, Position::new(5, 5), None, false),
            Some(EntityId(2))
        );
    }

    #[test]
    fn ties_break_on_smallest_coordinates() {
        // (7,5), (5,7), (3,5) and (5,3) are all two tiles away.
        let store = store_with(&[(7, 5), (5, 7), (3, 5), (5, 3)]);
        assert_eq!(
            select_target(&store, Position::new(5, 5), None, false),
            Some(EntityId(3))
        );
    }

    #[test]
    fn lock_keeps_target_regardless_of_distance() {
        let store = store_with(&[(40, 40), (5, 6)]);
        assert_eq!(
            select_target(&store, Position::new(5, 5), Some(EntityId(1)), true),
            Some(EntityId(1))
        );
    }

    #[test]
    fn lock_on_missing_target_falls_back_to_closest() {
        let store = store_with(&[(40, 40), (5, 6)]);
        assert_eq!(
            select_target(&store, Position::new(5, 5), Some(EntityId(9)), true),
            Some(EntityId(2))
        );
    }

    #[test]
    fn stability_band_retains_previous_target() {
        // Closest is 1 away, previous target is 3 away: within the band.
        let store = store_with(&[(8, 5), (6, 5)]);
        assert_eq!(
            select_target(&store, Position::new(5, 5), Some(EntityId(1)), false),
            Some(EntityId(1))
        );
    }

    #[test]
    fn target_outside_band_is_replaced() {
        // Closest is 1 away, previous target is 4 away.
        let store = store_with(&[(9, 5), (6, 5)]);
        assert_eq!(
            select_target(&store, Position::new(5, 5), Some(EntityId(1)), false),
            Some(EntityId(2))
        );
    }

    #[test]
    fn far_corner_distances_do_not_overflow() {
        let store = store_with(&[(i32::MAX, i32::MAX), (i32::MAX, i32::MAX - 1)]);
        let character = Position::new(i32::MIN, i32::MIN);

        assert_eq!(
            select_target(&store, character, None, false),
            Some(EntityId(2))
        );
        assert_eq!(
            select_target(&store, character, Some(EntityId(1)), false),
            Some(EntityId(1))
        );
    }

    #[test]
    fn release_resets_when_target_removed() {
        let mut store = store_with(&[(9, 5)]);
        let mut state = TargetingState {
            current: Some(EntityId(1)),
            locked: true,
        };
        assert!(!state.release_if_missing(&store));

        store.remove(EntityId(1));
        assert!(state.release_if_missing(&store));
        assert_eq!(state, TargetingState::default());
    }
}
