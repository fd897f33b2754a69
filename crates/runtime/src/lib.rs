//! Imperative shell around `bot-core`: process memory, key injection and the
//! polling loop that drives the hunter.
//!
//! Modules are organized by responsibility:
//! - [`memory`] reads the client structures through [`ProcessMemory`]
//! - [`input`] emits key events through [`InputInjector`]
//! - [`feedback`] presses keys and verifies their effect in memory
//! - [`perception`] runs the tick loop until cancelled
//! - [`platform`] provides the Windows backends for both seams
//! - [`calibration`] and [`config`] load startup settings
//! - [`builder`] assembles a ready-to-run [`PerceptionLoop`]
pub mod builder;
pub mod calibration;
pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod input;
pub mod memory;
pub mod perception;
pub mod platform;

pub use builder::BotBuilder;
pub use calibration::{Calibration, MOB_ADDRESS_FILE, PLAYER_ADDRESS_FILE, parse_address};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BotConfig, FeedbackTiming, LoopTiming};
pub use error::{CalibrationError, MemoryError, Result, RuntimeError};
pub use feedback::{MotionFeedbackController, MoveFeedback};
pub use input::{InputInjector, KeyBindings, VirtualKey};
pub use memory::{AddressLayout, ProcessMemory, RawSample};
pub use perception::{
    KeySummary, LoopState, PerceptionLoop, RunStats, RunSummary, StopReason, TickReport,
};
pub use platform::{GameProcess, KeyboardInjector, ProcessInfo, find_processes, focus_window};
