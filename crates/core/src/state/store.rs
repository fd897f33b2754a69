//! Tracked mob set and spawn history.
//!
//! The client exposes a single "last moved mob" slot plus a "last spawn"
//! slot. The store reconstructs individual mobs from that stream: a movement
//! sample whose inferred previous tile matches a tracked mob continues that
//! mob, anything else starts a new one.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::types::{Direction, EntityId, Position};

/// One mob instance reconstructed from memory samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedEntity {
    pub id: EntityId,
    pub position: Position,
    /// Position seen by the previous staleness sweep.
    pub last_position: Position,
    pub last_activity: Instant,
    pub from_spawn: bool,
    /// Reserved; nothing marks entities inactive yet, targeting skips them if set.
    pub inactive: bool,
}

impl TrackedEntity {
    fn new(id: EntityId, position: Position, now: Instant, from_spawn: bool) -> Self {
        Self {
            id,
            position,
            last_position: position,
            last_activity: now,
            from_spawn,
            inactive: false,
        }
    }
}

/// First observation of a spawn on a tile. Never expires during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRecord {
    pub face: i32,
    pub position: Position,
    pub time: Instant,
}

/// What a movement sample did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    /// `(0, 0)` sample; nothing recorded.
    Ignored,
    /// An existing mob stepped onto the sampled tile.
    Moved(EntityId),
    /// No mob stood on the inferred previous tile, so a new one was created.
    Created(EntityId),
}

#[derive(Debug)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, TrackedEntity>,
    spawns: HashMap<Position, SpawnRecord>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            spawns: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&TrackedEntity> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Tracked entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedEntity> {
        self.entities.values()
    }

    pub fn spawn_at(&self, position: Position) -> Option<&SpawnRecord> {
        self.spawns.get(&position)
    }

    pub fn spawn_count(&self) -> usize {
        self.spawns.len()
    }

    /// Records a spawn and always creates a new mob on its tile.
    ///
    /// A `(0, 0)` spawn is the client's "no spawn" sentinel and is ignored.
    pub fn on_spawn_detected(
        &mut self,
        position: Position,
        face: i32,
        now: Instant,
    ) -> Option<EntityId> {
        if position.is_origin() {
            return None;
        }

        info!("New spawn at {} facing {}", position, face_label(face));
        self.spawns.insert(
            position,
            SpawnRecord {
                face,
                position,
                time: now,
            },
        );

        let id = self.insert(position, now, true);
        info!("Added spawn as mob {}", id);
        Some(id)
    }

    /// Ingests one sample of the "last moved mob" slot.
    ///
    /// The slot holds the mob's new tile and its facing, so the tile it came
    /// from is the new tile minus the facing delta. Unknown facing codes infer
    /// no movement at all, and a previous tile outside the coordinate range
    /// cannot match any mob.
    pub fn on_position_sample(
        &mut self,
        position: Position,
        face: i32,
        now: Instant,
    ) -> SampleOutcome {
        if position.is_origin() {
            return SampleOutcome::Ignored;
        }

        let (dx, dy) = Direction::from_face(face).map_or((0, 0), Direction::delta);
        let previous = position.checked_offset((-dx, -dy));

        let continued = self
            .entities
            .values_mut()
            .find(|entity| Some(entity.position) == previous);

        if let Some(entity) = continued {
            entity.position = position;
            entity.last_activity = now;
            debug!(
                "[Mob {}] => {} facing {}",
                entity.id,
                position,
                face_label(face)
            );
            return SampleOutcome::Moved(entity.id);
        }

        let from_spawn = self.spawns.contains_key(&position);
        let id = self.insert(position, now, from_spawn);
        info!(
            "New mob {} => {} facing {}{}",
            id,
            position,
            face_label(face),
            if from_spawn { " (spawn tile)" } else { "" }
        );
        SampleOutcome::Created(id)
    }

    /// Evicts mobs that have not moved for at least `timeout`.
    ///
    /// Mobs that did move since the previous sweep get their activity clock
    /// refreshed. Returns the evicted ids in ascending order.
    pub fn sweep_stale(&mut self, now: Instant, timeout: Duration) -> Vec<EntityId> {
        let mut evicted = Vec::new();

        self.entities.retain(|id, entity| {
            if entity.position == entity.last_position {
                if now.saturating_duration_since(entity.last_activity) >= timeout {
                    info!(
                        "Mob {} inactive for {:.1}s, removing",
                        id,
                        timeout.as_secs_f32()
                    );
                    evicted.push(*id);
                    return false;
                }
            } else {
                entity.last_activity = now;
            }
            entity.last_position = entity.position;
            true
        });

        evicted
    }

    pub fn remove(&mut self, id: EntityId) -> Option<TrackedEntity> {
        self.entities.remove(&id)
    }

    fn insert(&mut self, position: Position, now: Instant, from_spawn: bool) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, TrackedEntity::new(id, position, now, from_spawn));
        id
    }
}

fn face_label(face: i32) -> &'static str {
    Direction::from_face(face).map_or("?", <&'static str>::from)
}
