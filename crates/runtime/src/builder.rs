//! Assembles a [`PerceptionLoop`] from configuration and I/O backends.
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use bot_core::MotionProfile;
use tracing::debug;

use crate::calibration::Calibration;
use crate::clock::Clock;
use crate::config::BotConfig;
use crate::error::Result;
use crate::feedback::MotionFeedbackController;
use crate::input::InputInjector;
use crate::memory::{AddressLayout, ProcessMemory};
use crate::perception::PerceptionLoop;

/// Builder for the perception loop.
///
/// Calibration is read from the configured address files unless one is
/// supplied explicitly.
pub struct BotBuilder {
    config: BotConfig,
    calibration: Option<Calibration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl BotBuilder {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            calibration: None,
            cancel: None,
        }
    }

    /// Use already-loaded base addresses.
    pub fn calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Share an existing cancellation flag with the loop.
    pub fn cancel_token(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn build<M, I, C>(self, memory: M, input: I, clock: C) -> Result<PerceptionLoop<M, I, C>>
    where
        M: ProcessMemory,
        I: InputInjector,
        C: Clock,
    {
        let calibration = match self.calibration {
            Some(calibration) => calibration,
            None => Calibration::load_files(
                &self.config.mob_address_path(),
                &self.config.player_address_path(),
            )?,
        };
        let layout = AddressLayout::from_calibration(&calibration)?;
        debug!("Address layout: {:?}", layout);

        let controller = MotionFeedbackController::new(
            memory,
            input,
            clock,
            layout,
            self.config.keys,
            MotionProfile::new(self.config.motion),
            self.config.feedback,
        );

        Ok(PerceptionLoop::new(
            controller,
            self.config.timing,
            self.config.rng_seed,
            self.cancel.unwrap_or_default(),
        ))
    }
}
