//! Decision logic for the auto-hunter, free of any process or input I/O.
//!
//! `bot-core` turns raw position samples into a persistent set of tracked
//! mobs and decides what the character should do next:
//! - [`state`] holds the data model and the [`EntityStore`] lifecycle rules
//! - [`targeting`] picks which mob to pursue, with hysteresis
//! - [`pursuit`] plans one engagement or movement step per tick and drives
//!   it through the [`Actuator`] seam
//! - [`motion`] adapts key-press durations from observed outcomes
//!
//! The runtime crate supplies the imperative shell (memory reads, key
//! injection, timing) and implements [`Actuator`] on top of it.
pub mod error;
pub mod motion;
pub mod pursuit;
pub mod state;
pub mod targeting;

pub use error::{CoreError, Result};
pub use motion::{Adjustment, KeyStats, MotionProfile, MotionTuning};
pub use pursuit::{Actuator, AttackOutcome, PursuitOutcome, approach_for, facing_toward};
pub use state::{
    Direction, EntityId, EntityStore, Key, Position, SampleOutcome, SpawnRecord, TrackedEntity,
};
pub use targeting::{TargetingState, select_target};
