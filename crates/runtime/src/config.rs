//! Runtime configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use bot_core::MotionTuning;

use crate::calibration::{MOB_ADDRESS_FILE, PLAYER_ADDRESS_FILE};
use crate::error::Result;
use crate::input::KeyBindings;

/// Everything needed to find the game, calibrate and run the loop.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub process_name: String,
    /// Skips process discovery when set.
    pub pid: Option<u32>,
    pub calibration_dir: PathBuf,
    pub mob_address_file: String,
    pub player_address_file: String,
    pub focus_window: bool,
    pub rng_seed: Option<u64>,
    pub session_id: Option<String>,
    pub keys: KeyBindings,
    pub motion: MotionTuning,
    pub timing: LoopTiming,
    pub feedback: FeedbackTiming,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            process_name: "endless.exe".to_string(),
            pid: None,
            calibration_dir: default_calibration_dir(),
            mob_address_file: MOB_ADDRESS_FILE.to_string(),
            player_address_file: PLAYER_ADDRESS_FILE.to_string(),
            focus_window: true,
            rng_seed: None,
            session_id: None,
            keys: KeyBindings::default(),
            motion: MotionTuning::default(),
            timing: LoopTiming::default(),
            feedback: FeedbackTiming::default(),
        }
    }
}

impl BotConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `EOBOT_PROCESS_NAME` - Executable to attach to (default: endless.exe)
    /// - `EOBOT_PID` - Attach to this pid instead of searching
    /// - `EOBOT_CALIBRATION_DIR` - Directory holding the address files (default: next to the binary)
    /// - `EOBOT_MOB_ADDRESS_FILE` / `EOBOT_PLAYER_ADDRESS_FILE` - Address file names
    /// - `EOBOT_FOCUS_WINDOW` - Bring the game window to the front first (default: true)
    /// - `EOBOT_RNG_SEED` - Seed for stuck-recovery moves (default: entropy)
    /// - `EOBOT_SESSION_ID` - Log session name (default: timestamp)
    /// - `EOBOT_KEYMAP` - Key overrides, e.g. `up=0x26,attack=0x11`
    /// - `EOBOT_*_MS` / `EOBOT_REDUCE_THRESHOLD` / `EOBOT_MAX_READ_FAILURES` - Timing and tuning
    ///
    /// Unparseable numeric values fall back to their defaults; an unknown key
    /// name in `EOBOT_KEYMAP` is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`BotConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|value| value.trim().to_string());
        let parse = |key: &str| read(key).and_then(|value| value.parse::<u64>().ok());
        let millis = |key: &str| parse(key).map(Duration::from_millis);

        let mut config = Self::default();

        if let Some(name) = read("EOBOT_PROCESS_NAME").filter(|name| !name.is_empty()) {
            config.process_name = name;
        }
        config.pid = read("EOBOT_PID").and_then(|value| value.parse().ok());
        if let Some(dir) = read("EOBOT_CALIBRATION_DIR") {
            config.calibration_dir = PathBuf::from(dir);
        }
        if let Some(file) = read("EOBOT_MOB_ADDRESS_FILE") {
            config.mob_address_file = file;
        }
        if let Some(file) = read("EOBOT_PLAYER_ADDRESS_FILE") {
            config.player_address_file = file;
        }
        if let Some(focus) = read("EOBOT_FOCUS_WINDOW").and_then(|value| parse_bool(&value)) {
            config.focus_window = focus;
        }
        config.rng_seed = parse("EOBOT_RNG_SEED");
        config.session_id = read("EOBOT_SESSION_ID").filter(|id| !id.is_empty());

        if let Some(overrides) = read("EOBOT_KEYMAP") {
            config.keys.apply_overrides(&overrides)?;
        }

        // Motion tuning
        let motion = &mut config.motion;
        if let Some(value) = millis("EOBOT_MOVE_INITIAL_MS") {
            motion.initial_movement = value;
        }
        if let Some(value) = millis("EOBOT_MOVE_MAX_MS") {
            motion.max_movement = value;
        }
        if let Some(value) = millis("EOBOT_ATTACK_INITIAL_MS") {
            motion.initial_attack = value;
        }
        if let Some(value) = millis("EOBOT_ATTACK_MAX_MS") {
            motion.max_attack = value;
        }
        if let Some(value) = millis("EOBOT_DURATION_STEP_MS") {
            motion.increment = value;
        }
        if let Some(value) = millis("EOBOT_FACING_MS") {
            motion.facing = value;
        }
        if let Some(value) = read("EOBOT_REDUCE_THRESHOLD").and_then(|value| value.parse().ok()) {
            motion.reduce_threshold = value;
        }
        motion.max_movement = motion.max_movement.max(motion.initial_movement);
        motion.max_attack = motion.max_attack.max(motion.initial_attack);

        // Loop timing
        let timing = &mut config.timing;
        if let Some(value) = millis("EOBOT_STALE_TIMEOUT_MS") {
            timing.stale_timeout = value;
        }
        if let Some(value) = millis("EOBOT_STUCK_TIMEOUT_MS") {
            timing.stuck_timeout = value;
        }
        if let Some(value) = millis("EOBOT_ACTION_COOLDOWN_MS") {
            timing.action_cooldown = value;
        }
        if let Some(value) = millis("EOBOT_IDLE_INTERVAL_MS") {
            timing.idle_interval = value;
        }
        if let Some(value) = millis("EOBOT_TICK_INTERVAL_MS") {
            timing.tick_interval = value;
        }
        if let Some(value) = millis("EOBOT_READ_BACKOFF_MS") {
            timing.read_backoff = value;
        }
        if let Some(value) = read("EOBOT_MAX_READ_FAILURES").and_then(|value| value.parse().ok()) {
            timing.max_read_failures = value;
        }

        // Feedback settle intervals
        let feedback = &mut config.feedback;
        if let Some(value) = millis("EOBOT_MOVE_SETTLE_MS") {
            feedback.movement_settle = value;
        }
        if let Some(value) = millis("EOBOT_ATTACK_SETTLE_MS") {
            feedback.attack_settle = value;
        }
        if let Some(value) = millis("EOBOT_FACING_SETTLE_MS") {
            feedback.facing_settle = value;
        }

        Ok(config)
    }

    pub fn mob_address_path(&self) -> PathBuf {
        self.calibration_dir.join(&self.mob_address_file)
    }

    pub fn player_address_path(&self) -> PathBuf {
        self.calibration_dir.join(&self.player_address_file)
    }
}

/// Intervals and timeouts of the perception loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopTiming {
    /// A mob that has not moved for this long is forgotten.
    pub stale_timeout: Duration,
    /// Time without character displacement before a random move.
    pub stuck_timeout: Duration,
    /// Minimum spacing between planner actions on the same target.
    pub action_cooldown: Duration,
    /// Sleep when the mob slot did not change.
    pub idle_interval: Duration,
    /// Sleep after ingesting a mob sample.
    pub tick_interval: Duration,
    pub read_backoff: Duration,
    /// Consecutive failed ticks before stopping; 0 retries forever.
    pub max_read_failures: u32,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            stale_timeout: Duration::from_secs(7),
            stuck_timeout: Duration::from_secs(1),
            action_cooldown: Duration::from_millis(20),
            idle_interval: Duration::from_millis(40),
            tick_interval: Duration::from_millis(30),
            read_backoff: Duration::from_millis(500),
            max_read_failures: 120,
        }
    }
}

/// Waits between a key press and reading back its effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackTiming {
    pub movement_settle: Duration,
    pub attack_settle: Duration,
    /// Pause before every attack press, after facing when the target needed it.
    pub facing_settle: Duration,
}

impl Default for FeedbackTiming {
    fn default() -> Self {
        Self {
            movement_settle: Duration::from_millis(20),
            attack_settle: Duration::from_millis(200),
            facing_settle: Duration::from_millis(20),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_calibration_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
