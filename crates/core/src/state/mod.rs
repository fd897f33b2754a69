//! Tracked-world data model.
//!
//! [`types`] defines the small value types shared across the workspace and
//! [`store`] owns the set of tracked mobs together with the spawn history.
mod store;
mod types;

pub use store::{EntityStore, SampleOutcome, SpawnRecord, TrackedEntity};
pub use types::{Direction, EntityId, Key, Position};
