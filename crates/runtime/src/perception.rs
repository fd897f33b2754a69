//! The polling loop that ties memory reads, tracking and pursuit together.
//!
//! Each [`PerceptionLoop::tick`] runs to completion on the calling thread:
//! read the raw fields, update the entity store, maybe act, ingest the mob
//! slot, sleep. Cancellation is observed only between ticks, so a key press
//! and its settle interval always finish.
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bot_core::{
    Direction, EntityId, EntityStore, Key, KeyStats, Position, SampleOutcome, TargetingState,
    pursuit, select_target,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::LoopTiming;
use crate::error::{MemoryError, Result, RuntimeError};
use crate::feedback::MotionFeedbackController;
use crate::input::InputInjector;
use crate::memory::ProcessMemory;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Cancelled,
    ReadRetriesExhausted,
    /// A non-recoverable memory failure (e.g. the process went away).
    Fatal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped(StopReason),
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// True when the raw read (or an action's read-back) failed.
    pub read_failed: bool,
    pub spawned: Option<EntityId>,
    pub evicted: Vec<EntityId>,
    /// Target pursued this tick, if the planner ran.
    pub target: Option<EntityId>,
    pub acted: bool,
    pub killed: Option<EntityId>,
    pub random_move: Option<Direction>,
    /// `None` when the mob slot was unchanged.
    pub sample: Option<SampleOutcome>,
}

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub ticks: u64,
    pub kills: u64,
    pub spawns: u64,
    pub mobs_created: u64,
    pub evictions: u64,
    pub read_failures: u64,
    pub random_moves: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeySummary {
    #[serde(flatten)]
    pub stats: KeyStats,
    pub ratio: f64,
    pub duration_ms: u64,
}

/// End-of-run report, written by the client as JSON.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub stats: RunStats,
    pub elapsed_ms: u64,
    pub tracked_at_exit: usize,
    pub stop_reason: Option<StopReason>,
    pub keys: BTreeMap<String, KeySummary>,
}

pub struct PerceptionLoop<M, I, C> {
    controller: MotionFeedbackController<M, I, C>,
    store: EntityStore,
    targeting: TargetingState,
    timing: LoopTiming,
    rng: StdRng,
    cancel: Arc<AtomicBool>,
    state: LoopState,
    stats: RunStats,
    started: Instant,

    last_mob: Option<(i32, Position)>,
    last_spawn: Option<(i32, Position)>,
    last_character: Option<Position>,
    last_displacement: Instant,
    random_move_issued: bool,
    last_action: Option<Instant>,
    consecutive_failures: u32,
}

impl<M, I, C> PerceptionLoop<M, I, C>
where
    M: ProcessMemory,
    I: InputInjector,
    C: Clock,
{
    pub fn new(
        controller: MotionFeedbackController<M, I, C>,
        timing: LoopTiming,
        rng_seed: Option<u64>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let now = controller.clock().now();

        Self {
            controller,
            store: EntityStore::new(),
            targeting: TargetingState::default(),
            timing,
            rng,
            cancel,
            state: LoopState::Running,
            stats: RunStats::default(),
            started: now,
            last_mob: None,
            last_spawn: None,
            last_character: None,
            last_displacement: now,
            random_move_issued: false,
            last_action: None,
            consecutive_failures: 0,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn targeting(&self) -> TargetingState {
        self.targeting
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn controller(&self) -> &MotionFeedbackController<M, I, C> {
        &self.controller
    }

    /// Flag that stops the loop at the next tick boundary once set.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Runs ticks until cancelled or a read failure becomes fatal.
    pub fn run(&mut self) -> Result<RunSummary> {
        let tuning = self.controller.profile().tuning();
        info!(
            "Starting with movement: {}ms, attack: {}ms",
            tuning.initial_movement.as_millis(),
            tuning.initial_attack.as_millis()
        );
        info!("Facing duration: {}ms", tuning.facing.as_millis());

        self.state = LoopState::Running;
        let result = loop {
            if self.cancel.load(Ordering::SeqCst) {
                info!("Exiting...");
                self.state = LoopState::Stopped(StopReason::Cancelled);
                break Ok(());
            }
            if let Err(err) = self.tick() {
                break Err(err);
            }
        };

        let summary = self.summary();
        log_summary(&summary);
        result.map(|()| summary)
    }

    /// Executes one perception tick.
    pub fn tick(&mut self) -> Result<TickReport> {
        let mut report = TickReport::default();
        self.stats.ticks += 1;

        let sample = match self.controller.read_sample() {
            Ok(sample) => sample,
            Err(err) => {
                self.on_read_failure(err)?;
                report.read_failed = true;
                return Ok(report);
            }
        };
        self.consecutive_failures = 0;
        let now = self.controller.clock().now();

        if self.last_character.is_some_and(|last| last != sample.character) {
            self.last_displacement = now;
            self.random_move_issued = false;
        }
        self.last_character = Some(sample.character);

        let spawn = (sample.spawn_face, sample.spawn);
        if self.last_spawn != Some(spawn) {
            self.last_spawn = Some(spawn);
            report.spawned = self
                .store
                .on_spawn_detected(sample.spawn, sample.spawn_face, now);
            if report.spawned.is_some() {
                self.stats.spawns += 1;
            }
        }

        report.evicted = self.store.sweep_stale(now, self.timing.stale_timeout);
        self.stats.evictions += report.evicted.len() as u64;
        self.targeting.release_if_missing(&self.store);

        if !self.store.is_empty() {
            if let Err(err) = self.pursue(sample.character, now, &mut report) {
                self.on_read_failure(err)?;
                report.read_failed = true;
                return Ok(report);
            }
        }

        let mob = (sample.mob_face, sample.mob);
        if self.last_mob == Some(mob) {
            self.controller.clock().sleep(self.timing.idle_interval);
            return Ok(report);
        }
        self.last_mob = Some(mob);

        let outcome = self.store.on_position_sample(sample.mob, sample.mob_face, now);
        if matches!(outcome, SampleOutcome::Created(_)) {
            self.stats.mobs_created += 1;
        }
        report.sample = Some(outcome);

        self.controller.clock().sleep(self.timing.tick_interval);
        Ok(report)
    }

    fn pursue(
        &mut self,
        character: Position,
        now: Instant,
        report: &mut TickReport,
    ) -> std::result::Result<(), MemoryError> {
        let selected = select_target(
            &self.store,
            character,
            self.targeting.current,
            self.targeting.locked,
        );
        let cooldown_due = self
            .last_action
            .is_none_or(|last| now.saturating_duration_since(last) >= self.timing.action_cooldown);

        let should_act = selected != self.targeting.current
            || (self.targeting.current.is_some() && cooldown_due);
        if !should_act {
            return Ok(());
        }

        if !self.targeting.locked || self.targeting.current.is_none() {
            self.targeting.current = selected;
        }
        let Some(target) = self.targeting.current else {
            return Ok(());
        };

        debug!(
            "{} mob {}",
            if self.targeting.locked { "LOCKED on" } else { "Moving toward" },
            target
        );
        let outcome = pursuit::step(
            &mut self.store,
            target,
            character,
            self.targeting.locked,
            &mut self.controller,
        )?;
        self.last_action = Some(now);
        self.targeting.locked = outcome.locked;
        report.target = Some(target);
        report.acted = outcome.acted;

        if !outcome.locked && !self.store.contains(target) {
            self.targeting.current = None;
            if outcome.acted {
                self.stats.kills += 1;
                report.killed = Some(target);
            }
        }

        let stuck_for = now.saturating_duration_since(self.last_displacement);
        if !outcome.acted && stuck_for > self.timing.stuck_timeout && !self.random_move_issued {
            if let Some(&direction) = Direction::ALL.choose(&mut self.rng) {
                info!(
                    "No progress for {:.1}s, trying random move {}",
                    stuck_for.as_secs_f32(),
                    direction
                );
                self.controller.press_movement(direction, character)?;
                self.random_move_issued = true;
                self.last_action = Some(now);
                self.stats.random_moves += 1;
                report.random_move = Some(direction);
            }
        }

        Ok(())
    }

    fn on_read_failure(&mut self, err: MemoryError) -> Result<()> {
        if !err.is_transient() {
            error!("Stopping on memory error: {}", err);
            self.state = LoopState::Stopped(StopReason::Fatal);
            return Err(err.into());
        }

        self.stats.read_failures += 1;
        self.consecutive_failures += 1;
        warn!(
            "Memory error ({} in a row): {}",
            self.consecutive_failures, err
        );
        self.controller.clock().sleep(self.timing.read_backoff);

        let max = self.timing.max_read_failures;
        if max > 0 && self.consecutive_failures >= max {
            error!("Giving up after {} consecutive read failures", max);
            self.state = LoopState::Stopped(StopReason::ReadRetriesExhausted);
            return Err(RuntimeError::ReadRetriesExhausted {
                attempts: self.consecutive_failures,
            });
        }
        Ok(())
    }

    /// Snapshot of counters and adaptive durations.
    pub fn summary(&self) -> RunSummary {
        let profile = self.controller.profile();
        let keys = Key::ALL
            .into_iter()
            .map(|key| {
                let stats = profile.stats(key);
                let summary = KeySummary {
                    stats,
                    ratio: stats.ratio(),
                    duration_ms: duration_ms(profile.duration(key)),
                };
                (key.to_string(), summary)
            })
            .collect();

        RunSummary {
            stats: self.stats,
            elapsed_ms: duration_ms(
                self.controller
                    .clock()
                    .now()
                    .saturating_duration_since(self.started),
            ),
            tracked_at_exit: self.store.len(),
            stop_reason: match self.state {
                LoopState::Running => None,
                LoopState::Stopped(reason) => Some(reason),
            },
            keys,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn log_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    info!(
        "Stopped after {} ticks ({:.1}s): {} kills, {} spawns, {} mobs seen, {} read failures, {} random moves",
        stats.ticks,
        summary.elapsed_ms as f64 / 1000.0,
        stats.kills,
        stats.spawns,
        stats.mobs_created,
        stats.read_failures,
        stats.random_moves
    );
    for (key, entry) in &summary.keys {
        info!(
            "  {:<6} {:>4}/{:<4} ({:.2}) at {}ms",
            key, entry.stats.successes, entry.stats.attempts, entry.ratio, entry.duration_ms
        );
    }
}
