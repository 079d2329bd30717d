//! One-shot randomized start trigger.
//!
//! When activated, waits a random delay drawn uniformly from
//! `[min_delay, max_delay]` and then sets a named trigger on an animation
//! controller. Used to desynchronise crowds of identical animated
//! characters that spawn on the same frame.
//!
//! The trigger is tick-driven: the host calls [`RandomStartTrigger::update`]
//! once per frame with the elapsed time. It fires at most once.

use crate::error::{SnapError, SnapResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default trigger parameter name.
pub const DEFAULT_TRIGGER_NAME: &str = "Start";

/// Default upper bound of the random delay in seconds.
pub const DEFAULT_MAX_DELAY: f32 = 3.0;

/// Animation state machine capability used by the trigger.
pub trait AnimationController {
    /// Set the trigger parameter `name`.
    fn set_trigger(&mut self, name: &str);
}

/// Trigger parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Smallest delay in seconds.
    pub min_delay: f32,
    /// Largest delay in seconds.
    pub max_delay: f32,
    /// Trigger parameter set on the controller.
    pub trigger_name: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            min_delay: 0.0,
            max_delay: DEFAULT_MAX_DELAY,
            trigger_name: DEFAULT_TRIGGER_NAME.to_owned(),
        }
    }
}

impl TriggerConfig {
    /// Default trigger name with a custom delay range.
    pub fn with_delay_range(min_delay: f32, max_delay: f32) -> Self {
        Self {
            min_delay,
            max_delay,
            ..Self::default()
        }
    }

    /// Check preconditions.
    ///
    /// # Errors
    /// Returns [`SnapError::InvalidDelayRange`] unless both bounds are finite
    /// and `0 <= min_delay <= max_delay`, and [`SnapError::EmptyTriggerName`]
    /// for an empty name.
    pub fn validate(&self) -> SnapResult<()> {
        let (min, max) = (self.min_delay, self.max_delay);
        if !(min.is_finite() && max.is_finite() && min >= 0.0 && min <= max) {
            return Err(SnapError::InvalidDelayRange { min, max });
        }
        if self.trigger_name.is_empty() {
            return Err(SnapError::EmptyTriggerName);
        }
        Ok(())
    }
}

/// Lifecycle of a trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerState {
    /// Not activated yet.
    Idle,
    /// Waiting for the delay to elapse.
    Pending {
        /// Seconds left.
        remaining: f32,
    },
    /// Delay elapsed; the controller was triggered if present.
    Fired,
    /// Torn down before firing.
    Cancelled,
}

/// Fires a named animation trigger once after a random delay.
#[derive(Debug, Clone)]
pub struct RandomStartTrigger {
    config: TriggerConfig,
    state: TriggerState,
    delay: Option<f32>,
}

impl RandomStartTrigger {
    /// Create an idle trigger.
    ///
    /// # Errors
    /// Returns an error if `config` fails [`TriggerConfig::validate`].
    pub fn new(config: TriggerConfig) -> SnapResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: TriggerState::Idle,
            delay: None,
        })
    }

    /// Configuration.
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Delay drawn at activation, if activated.
    pub fn delay(&self) -> Option<f32> {
        self.delay
    }

    /// Whether the trigger has fired.
    pub fn has_fired(&self) -> bool {
        self.state == TriggerState::Fired
    }

    /// Draw the delay and start waiting. Does nothing unless idle.
    pub fn activate<R: Rng>(&mut self, rng: &mut R) {
        if self.state != TriggerState::Idle {
            return;
        }
        let delay = rng.random_range(self.config.min_delay..=self.config.max_delay);
        self.delay = Some(delay);
        self.state = TriggerState::Pending { remaining: delay };
        tracing::trace!("start trigger armed: {delay:.3}s");
    }

    /// Advance by `dt` seconds.
    ///
    /// Returns `true` on the update that fires. `controller` receives
    /// `set_trigger` at that moment when present; without one the trigger is
    /// still consumed. Negative or non-finite `dt` is treated as zero.
    pub fn update(&mut self, dt: f32, controller: Option<&mut dyn AnimationController>) -> bool {
        let TriggerState::Pending { remaining } = self.state else {
            return false;
        };
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let remaining = remaining - dt;

        if remaining > 0.0 {
            self.state = TriggerState::Pending { remaining };
            return false;
        }

        self.state = TriggerState::Fired;
        match controller {
            Some(controller) => controller.set_trigger(&self.config.trigger_name),
            None => tracing::debug!(
                "start trigger '{}' elapsed without an animation controller",
                self.config.trigger_name
            ),
        }
        true
    }

    /// Cancel a trigger that has not fired. Fired triggers stay fired.
    pub fn teardown(&mut self) {
        if self.state != TriggerState::Fired {
            self.state = TriggerState::Cancelled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl AnimationController for Recorder {
        fn set_trigger(&mut self, name: &str) {
            self.0.push(name.to_owned());
        }
    }

    #[test]
    fn fires_once_after_delay() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut trigger = RandomStartTrigger::new(TriggerConfig::with_delay_range(1.0, 1.0)).unwrap();
        let mut animator = Recorder::default();

        trigger.activate(&mut rng);
        assert_eq!(trigger.delay(), Some(1.0));

        assert!(!trigger.update(0.5, Some(&mut animator)));
        assert!(trigger.update(0.5, Some(&mut animator)));
        assert!(!trigger.update(10.0, Some(&mut animator)));

        assert_eq!(animator.0, vec!["Start".to_owned()]);
        assert!(trigger.has_fired());
    }

    #[test]
    fn idle_trigger_never_fires() {
        let mut trigger = RandomStartTrigger::new(TriggerConfig::default()).unwrap();
        let mut animator = Recorder::default();
        assert!(!trigger.update(100.0, Some(&mut animator)));
        assert!(animator.0.is_empty());
        assert_eq!(trigger.state(), TriggerState::Idle);
    }

    #[test]
    fn delay_is_within_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut trigger = RandomStartTrigger::new(TriggerConfig::default()).unwrap();
            trigger.activate(&mut rng);
            let delay = trigger.delay().unwrap();
            assert!((0.0..=3.0).contains(&delay), "delay {delay} out of range");
        }
    }

    #[test]
    fn second_activation_is_ignored() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut trigger = RandomStartTrigger::new(TriggerConfig::default()).unwrap();
        trigger.activate(&mut rng);
        let first = trigger.delay();
        trigger.activate(&mut rng);
        assert_eq!(trigger.delay(), first);
    }

    #[test]
    fn teardown_cancels_pending() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut trigger = RandomStartTrigger::new(TriggerConfig::with_delay_range(0.5, 0.5)).unwrap();
        let mut animator = Recorder::default();

        trigger.activate(&mut rng);
        trigger.teardown();

        assert!(!trigger.update(5.0, Some(&mut animator)));
        assert_eq!(trigger.state(), TriggerState::Cancelled);
        assert!(animator.0.is_empty());
    }

    #[test]
    fn missing_controller_consumes_trigger() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut trigger = RandomStartTrigger::new(TriggerConfig::with_delay_range(0.0, 0.0)).unwrap();
        trigger.activate(&mut rng);
        assert!(trigger.update(0.0, None));
        assert!(trigger.has_fired());
    }

    #[test]
    fn rejects_bad_config() {
        assert!(RandomStartTrigger::new(TriggerConfig::with_delay_range(2.0, 1.0)).is_err());
        assert!(RandomStartTrigger::new(TriggerConfig::with_delay_range(-1.0, 1.0)).is_err());
        assert!(RandomStartTrigger::new(TriggerConfig::with_delay_range(0.0, f32::NAN)).is_err());
        let unnamed = TriggerConfig {
            trigger_name: String::new(),
            ..TriggerConfig::default()
        };
        assert_eq!(
            RandomStartTrigger::new(unnamed).unwrap_err(),
            SnapError::EmptyTriggerName
        );
    }
}
