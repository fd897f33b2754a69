//! Adaptive key-press durations.
//!
//! Each movement direction and the attack key carry their own press
//! duration. A failed action lengthens the press by one increment (up to a
//! ceiling); a success shortens it again once the lifetime success ratio of
//! that key is high enough (down to the floor).

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info};

use crate::state::Key;

/// Bounds and step sizes for duration adaptation.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionTuning {
    pub initial_movement: Duration,
    pub max_movement: Duration,
    pub initial_attack: Duration,
    pub max_attack: Duration,
    pub increment: Duration,
    /// Fixed press used to turn toward a target before attacking.
    pub facing: Duration,
    /// Success ratio above which a successful press shortens the duration.
    pub reduce_threshold: f64,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            initial_movement: Duration::from_millis(30),
            max_movement: Duration::from_millis(50),
            initial_attack: Duration::from_millis(50),
            max_attack: Duration::from_millis(300),
            increment: Duration::from_millis(50),
            facing: Duration::from_millis(500),
            reduce_threshold: 0.8,
        }
    }
}

impl MotionTuning {
    /// `(floor, ceiling)` for `key`.
    pub fn bounds(&self, key: Key) -> (Duration, Duration) {
        if key.is_movement() {
            (self.initial_movement, self.max_movement)
        } else {
            (self.initial_attack, self.max_attack)
        }
    }
}

/// Lifetime attempt/success counters for one key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyStats {
    pub attempts: u32,
    pub successes: u32,
}

impl KeyStats {
    pub fn ratio(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.successes) / f64::from(self.attempts)
        }
    }
}

/// How a recorded outcome changed a key's duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Unchanged,
    Decreased(Duration),
    Increased(Duration),
}

/// Per-key press durations and counters for one run.
#[derive(Clone, Debug)]
pub struct MotionProfile {
    tuning: MotionTuning,
    durations: BTreeMap<Key, Duration>,
    stats: BTreeMap<Key, KeyStats>,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::new(MotionTuning::default())
    }
}

impl MotionProfile {
    pub fn new(tuning: MotionTuning) -> Self {
        let durations = Key::ALL
            .into_iter()
            .map(|key| (key, tuning.bounds(key).0))
            .collect();
        let stats = Key::ALL
            .into_iter()
            .map(|key| (key, KeyStats::default()))
            .collect();

        Self {
            tuning,
            durations,
            stats,
        }
    }

    pub fn tuning(&self) -> &MotionTuning {
        &self.tuning
    }

    pub fn duration(&self, key: Key) -> Duration {
        self.durations
            .get(&key)
            .copied()
            .unwrap_or_else(|| self.tuning.bounds(key).0)
    }

    pub fn facing_duration(&self) -> Duration {
        self.tuning.facing
    }

    pub fn stats(&self, key: Key) -> KeyStats {
        self.stats.get(&key).copied().unwrap_or_default()
    }

    /// Records one attempt of `key` and adapts its duration.
    pub fn record(&mut self, key: Key, success: bool) -> Adjustment {
        let (floor, ceiling) = self.tuning.bounds(key);
        let current = self.duration(key);

        let stats = self.stats.entry(key).or_default();
        stats.attempts += 1;
        if success {
            stats.successes += 1;
        }
        let ratio = stats.ratio();

        let adjustment = if success {
            if ratio > self.tuning.reduce_threshold && current > floor {
                let reduced = current.saturating_sub(self.tuning.increment).max(floor);
                info!(
                    "Success rate: {:.2} - Reducing {} to {}ms",
                    ratio,
                    key,
                    reduced.as_millis()
                );
                Adjustment::Decreased(reduced)
            } else {
                Adjustment::Unchanged
            }
        } else {
            let raised = (current + self.tuning.increment).min(ceiling);
            if raised == current {
                Adjustment::Unchanged
            } else {
                debug!("{} failed - increasing to {}ms", key, raised.as_millis());
                Adjustment::Increased(raised)
            }
        };

        if let Adjustment::Decreased(value) | Adjustment::Increased(value) = adjustment {
            self.durations.insert(key, value);
        }
        adjustment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fine_grained() -> MotionTuning {
        MotionTuning {
            initial_movement: Duration::from_millis(30),
            max_movement: Duration::from_millis(130),
            increment: Duration::from_millis(20),
            ..MotionTuning::default()
        }
    }

    #[test]
    fn starts_at_floors() {
        let profile = MotionProfile::default();
        assert_eq!(profile.duration(Key::Right), Duration::from_millis(30));
        assert_eq!(profile.duration(Key::Attack), Duration::from_millis(50));
        assert_eq!(profile.facing_duration(), Duration::from_millis(500));
    }

    #[test]
    fn failures_saturate_at_ceiling() {
        let mut profile = MotionProfile::new(fine_grained());
        for _ in 0..5 {
            profile.record(Key::Right, false);
        }
        assert_eq!(profile.duration(Key::Right), Duration::from_millis(130));

        assert_eq!(profile.record(Key::Right, false), Adjustment::Unchanged);
        assert_eq!(profile.duration(Key::Right), Duration::from_millis(130));
    }

    #[test]
    fn durations_stay_bounded_for_any_failure_run() {
        let mut profile = MotionProfile::default();
        for n in 0..200 {
            profile.record(Key::Attack, false);
            profile.record(Key::Up, n % 3 == 0);
            let attack = profile.duration(Key::Attack);
            let up = profile.duration(Key::Up);
            assert!(attack >= Duration::from_millis(50) && attack <= Duration::from_millis(300));
            assert!(up >= Duration::from_millis(30) && up <= Duration::from_millis(50));
        }
    }

    #[test]
    fn directions_adapt_independently() {
        let mut profile = MotionProfile::default();
        profile.record(Key::Left, false);
        assert_eq!(profile.duration(Key::Left), Duration::from_millis(50));
        assert_eq!(profile.duration(Key::Right), Duration::from_millis(30));
    }

    #[test]
    fn success_reduces_only_above_threshold() {
        let mut profile = MotionProfile::new(fine_grained());
        profile.record(Key::Down, false);
        profile.record(Key::Down, false);
        assert_eq!(profile.duration(Key::Down), Duration::from_millis(70));

        // 1/3 and 2/4 are below 0.8.
        assert_eq!(profile.record(Key::Down, true), Adjustment::Unchanged);
        assert_eq!(profile.record(Key::Down, true), Adjustment::Unchanged);

        for _ in 0..6 {
            profile.record(Key::Down, true);
        }
        // 8/10 is not strictly above 0.8.
        assert_eq!(profile.stats(Key::Down).attempts, 10);
        assert_eq!(profile.duration(Key::Down), Duration::from_millis(70));

        assert_eq!(
            profile.record(Key::Down, true),
            Adjustment::Decreased(Duration::from_millis(50))
        );
        profile.record(Key::Down, true);
        assert_eq!(profile.duration(Key::Down), Duration::from_millis(30));
        assert_eq!(profile.record(Key::Down, true), Adjustment::Unchanged);
    }

    #[test]
    fn ratio_handles_zero_attempts() {
        assert_eq!(KeyStats::default().ratio(), 0.0);
        let stats = KeyStats {
            attempts: 4,
            successes: 3,
        };
        assert!((stats.ratio() - 0.75).abs() < f64::EPSILON);
    }
}
