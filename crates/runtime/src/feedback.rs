//! Key presses whose effect is read back from game memory.
//!
//! [`MotionFeedbackController`] is the runtime side of the planner's
//! [`Actuator`]: it holds a key for the adaptive duration, waits for the
//! client to settle, reads the relevant memory and feeds the outcome back
//! into the [`MotionProfile`].
use std::time::Duration;

use bot_core::{Actuator, Adjustment, AttackOutcome, Direction, Key, MotionProfile, Position};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::FeedbackTiming;
use crate::error::MemoryError;
use crate::input::{InputInjector, KeyBindings};
use crate::memory::sample::read_character;
use crate::memory::{AddressLayout, ProcessMemory, RawSample};

/// Outcome of one movement press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveFeedback {
    pub moved: bool,
    /// Character position read after the press.
    pub position: Position,
}

pub struct MotionFeedbackController<M, I, C> {
    memory: M,
    input: I,
    clock: C,
    layout: AddressLayout,
    keys: KeyBindings,
    profile: MotionProfile,
    timing: FeedbackTiming,
}

impl<M, I, C> MotionFeedbackController<M, I, C>
where
    M: ProcessMemory,
    I: InputInjector,
    C: Clock,
{
    pub fn new(
        memory: M,
        input: I,
        clock: C,
        layout: AddressLayout,
        keys: KeyBindings,
        profile: MotionProfile,
        timing: FeedbackTiming,
    ) -> Self {
        Self {
            memory,
            input,
            clock,
            layout,
            keys,
            profile,
            timing,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Reads every field the perception loop consumes.
    pub fn read_sample(&self) -> Result<RawSample, MemoryError> {
        RawSample::read(&self.memory, &self.layout)
    }

    pub fn read_character(&self) -> Result<Position, MemoryError> {
        read_character(&self.memory, &self.layout)
    }

    /// Holds `key` for `duration`.
    pub fn press(&mut self, key: Key, duration: Duration) {
        let code = self.keys.get(key);
        debug!("Pressing {} ({}) for {}ms", key, code, duration.as_millis());
        self.input.key_down(code);
        self.clock.sleep(duration);
        self.input.key_up(code);
    }

    /// Presses `direction` and checks the character stepped that way from `from`.
    pub fn press_movement(
        &mut self,
        direction: Direction,
        from: Position,
    ) -> Result<MoveFeedback, MemoryError> {
        let key = direction.key();
        self.press(key, self.profile.duration(key));
        self.clock.sleep(self.timing.movement_settle);

        let position = self.read_character()?;
        let moved = direction.is_progress(from, position);
        self.profile.record(key, moved);

        if moved {
            debug!("Moved {}: {} -> {}", direction, from, position);
        } else {
            debug!("Move {} from {} had no effect", direction, from);
        }
        Ok(MoveFeedback { moved, position })
    }

    /// Turns toward `direction` with the fixed facing press.
    pub fn press_facing(&mut self, direction: Direction) {
        self.press(direction.key(), self.profile.facing_duration());
    }

    /// Presses attack and inspects the hit and kill indicators.
    ///
    /// A kill is a kill indicator that reads non-zero and differs from its
    /// value before the press. Without a kill, any non-zero hit indicator
    /// counts as a hit.
    pub fn press_attack(&mut self) -> AttackOutcome {
        let before = self
            .read_pair(self.layout.kill_indicators)
            .unwrap_or_else(|err| {
                warn!("Error reading kill indicators: {}", err);
                [0, 0]
            });

        self.press(Key::Attack, self.profile.duration(Key::Attack));
        self.clock.sleep(self.timing.attack_settle);

        let kill = match self.read_pair(self.layout.kill_indicators) {
            Ok(after) => before
                .iter()
                .zip(after)
                .any(|(&before, after)| after != 0 && after != before),
            Err(err) => {
                warn!("Error checking kill: {}", err);
                false
            }
        };

        let hit = kill
            || match self.read_pair(self.layout.hit_indicators) {
                Ok(values) => values.iter().any(|&value| value != 0),
                Err(err) => {
                    warn!("Error checking hit: {}", err);
                    false
                }
            };

        if kill {
            debug!("Kill detected");
        } else if !hit {
            debug!("No hit detected");
        }

        if let Adjustment::Increased(duration) = self.profile.record(Key::Attack, hit) {
            warn!("Attack failed - increasing to {}ms", duration.as_millis());
        }

        AttackOutcome { hit, kill }
    }

    fn read_pair(&self, addresses: [u64; 2]) -> Result<[u8; 2], MemoryError> {
        Ok([
            self.memory.read_u8(addresses[0])?,
            self.memory.read_u8(addresses[1])?,
        ])
    }
}

impl<M, I, C> Actuator for MotionFeedbackController<M, I, C>
where
    M: ProcessMemory,
    I: InputInjector,
    C: Clock,
{
    type Error = MemoryError;

    fn face(&mut self, direction: Direction) -> Result<(), MemoryError> {
        self.press_facing(direction);
        Ok(())
    }

    fn attack(&mut self) -> Result<AttackOutcome, MemoryError> {
        self.clock.sleep(self.timing.facing_settle);
        Ok(self.press_attack())
    }

    fn try_move(&mut self, direction: Direction, from: Position) -> Result<bool, MemoryError> {
        self.press_movement(direction, from)
            .map(|feedback| feedback.moved)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;
    use std::rc::Rc;

    use bot_core::{EntityStore, MotionTuning, pursuit};

    use super::*;
    use crate::calibration::Calibration;
    use crate::clock::ManualClock;
    use crate::input::VirtualKey;

    const MOB_BASE: u64 = 0x1000;
    const PLAYER_BASE: u64 = 0x8000;

    /// Byte-addressed fake memory; unknown addresses read as zero unless poisoned.
    #[derive(Clone, Default)]
    struct FakeMemory {
        bytes: Rc<RefCell<HashMap<u64, u8>>>,
        poisoned: Rc<RefCell<Vec<u64>>>,
    }

    impl ProcessMemory for FakeMemory {
        fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
            if self.poisoned.borrow().contains(&address) {
                return Err(MemoryError::Read {
                    address,
                    len,
                    source: io::Error::other("poisoned"),
                });
            }
            let bytes = self.bytes.borrow();
            Ok((0..len as u64)
                .map(|i| bytes.get(&(address + i)).copied().unwrap_or(0))
                .collect())
        }

        fn write_bytes(&self, address: u64, data: &[u8]) -> Result<(), MemoryError> {
            let mut bytes = self.bytes.borrow_mut();
            for (i, byte) in data.iter().enumerate() {
                bytes.insert(address + i as u64, *byte);
            }
            Ok(())
        }
    }

    /// Records presses and runs a reaction on key-up.
    #[derive(Default)]
    struct Recorder {
        events: Vec<(bool, VirtualKey)>,
        on_release: Option<Box<dyn FnMut(VirtualKey)>>,
    }

    impl InputInjector for Recorder {
        fn key_down(&mut self, key: VirtualKey) {
            self.events.push((true, key));
        }

        fn key_up(&mut self, key: VirtualKey) {
            self.events.push((false, key));
            if let Some(reaction) = self.on_release.as_mut() {
                reaction(key);
            }
        }
    }

    fn controller(
        memory: FakeMemory,
        input: Recorder,
    ) -> MotionFeedbackController<FakeMemory, Recorder, ManualClock> {
        let layout = AddressLayout::from_calibration(&Calibration {
            mob_base: MOB_BASE,
            player_base: PLAYER_BASE,
        })
        .unwrap();
        MotionFeedbackController::new(
            memory,
            input,
            ManualClock::default(),
            layout,
            KeyBindings::default(),
            MotionProfile::new(MotionTuning::default()),
            FeedbackTiming::default(),
        )
    }

    #[test]
    fn press_holds_for_duration() {
        let mut controller = controller(FakeMemory::default(), Recorder::default());
        let start = controller.clock().now();

        controller.press(Key::Up, Duration::from_millis(30));

        assert_eq!(controller.clock().now() - start, Duration::from_millis(30));
        assert_eq!(
            controller.input.events,
            vec![(true, VirtualKey(0x68)), (false, VirtualKey(0x68))]
        );
    }

    #[test]
    fn successful_move_is_recorded() {
        let memory = FakeMemory::default();
        memory.write_i32(PLAYER_BASE, 10).unwrap();
        memory.write_i32(PLAYER_BASE + 4, 10).unwrap();

        let world = memory.clone();
        let input = Recorder {
            on_release: Some(Box::new(move |key| {
                if key == VirtualKey(0x66) {
                    world.write_i32(PLAYER_BASE, 11).unwrap();
                }
            })),
            ..Recorder::default()
        };
        let mut controller = controller(memory, input);

        let from = Position::new(10, 10);
        let feedback = controller.press_movement(Direction::Right, from).unwrap();

        assert_eq!(
            feedback,
            MoveFeedback {
                moved: true,
                position: Position::new(11, 10)
            }
        );
        assert_eq!(controller.profile().stats(Key::Right).successes, 1);
        assert_eq!(controller.profile().duration(Key::Right), Duration::from_millis(30));
    }

    #[test]
    fn blocked_move_lengthens_press() {
        let memory = FakeMemory::default();
        memory.write_i32(PLAYER_BASE, 10).unwrap();
        memory.write_i32(PLAYER_BASE + 4, 10).unwrap();
        let mut controller = controller(memory, Recorder::default());

        let moved = controller
            .try_move(Direction::Up, Position::new(10, 10))
            .unwrap();

        assert!(!moved);
        assert_eq!(controller.profile().duration(Key::Up), Duration::from_millis(50));
    }

    #[test]
    fn changed_kill_indicator_is_a_kill() {
        let memory = FakeMemory::default();
        memory.write_bytes(MOB_BASE + 0x9C, &[3]).unwrap();

        let world = memory.clone();
        let input = Recorder {
            on_release: Some(Box::new(move |key| {
                if key == VirtualKey(0x11) {
                    world.write_bytes(MOB_BASE + 0x9C, &[7]).unwrap();
                }
            })),
            ..Recorder::default()
        };
        let mut controller = controller(memory, input);

        let outcome = controller.press_attack();

        assert_eq!(outcome, AttackOutcome { hit: true, kill: true });
        assert_eq!(controller.profile().stats(Key::Attack).successes, 1);
    }

    #[test]
    fn unchanged_kill_indicator_with_hit_byte_is_a_hit() {
        let memory = FakeMemory::default();
        memory.write_bytes(MOB_BASE + 0x9C, &[3]).unwrap();
        memory.write_bytes(MOB_BASE + 0xA0, &[1]).unwrap();
        let mut controller = controller(memory, Recorder::default());

        let outcome = controller.press_attack();

        assert_eq!(outcome, AttackOutcome { hit: true, kill: false });
    }

    #[test]
    fn miss_lengthens_attack_press() {
        let mut controller = controller(FakeMemory::default(), Recorder::default());
        let start = controller.clock().now();

        let outcome = controller.press_attack();

        assert_eq!(outcome, AttackOutcome::default());
        assert_eq!(controller.profile().duration(Key::Attack), Duration::from_millis(100));
        // 50ms press + 200ms settle
        assert_eq!(controller.clock().now() - start, Duration::from_millis(250));
    }

    #[test]
    fn unreadable_kill_indicators_give_no_kill_signal() {
        let memory = FakeMemory::default();
        memory.write_bytes(MOB_BASE + 0x98, &[1]).unwrap();
        memory.poisoned.borrow_mut().push(MOB_BASE + 0xA4);
        let mut controller = controller(memory, Recorder::default());

        let outcome = controller.press_attack();

        assert_eq!(outcome, AttackOutcome { hit: true, kill: false });
    }

    #[test]
    fn facing_press_uses_fixed_duration() {
        let mut controller = controller(FakeMemory::default(), Recorder::default());
        let start = controller.clock().now();

        controller.face(Direction::Left).unwrap();

        assert_eq!(controller.clock().now() - start, Duration::from_millis(500));
        assert_eq!(controller.input.events[0], (true, VirtualKey(0x64)));
    }

    #[test]
    fn engagement_settles_before_attacking() {
        let mut controller = controller(FakeMemory::default(), Recorder::default());
        let start = controller.clock().now();

        controller.attack().unwrap();

        // 20ms settle + 50ms press + 200ms settle
        assert_eq!(controller.clock().now() - start, Duration::from_millis(270));
    }

    #[test]
    fn same_tile_engagement_still_settles() {
        let mut controller = controller(FakeMemory::default(), Recorder::default());
        let start = controller.clock().now();
        let mut store = EntityStore::new();
        let target = store.on_spawn_detected(Position::new(5, 5), 0, start).unwrap();

        let character = Position::new(5, 5);
        let outcome = pursuit::step(&mut store, target, character, false, &mut controller);

        assert!(outcome.unwrap().locked);
        assert_eq!(controller.clock().now() - start, Duration::from_millis(270));
        assert_eq!(
            controller.input.events,
            vec![(true, VirtualKey(0x11)), (false, VirtualKey(0x11))]
        );
    }
}
