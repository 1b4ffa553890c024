use std::time::Duration;

use crate::ConfigError;

/// Smallest interval the builder and float-second constructors will produce.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Timing settings for one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub interval: Duration,
    pub delay: Duration,
    pub one_shot: bool,
    pub paused: bool,
    /// Diagnostic origin shown by inspection. Never affects scheduling.
    pub label: Option<String>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::every(DEFAULT_INTERVAL)
    }
}

impl Schedule {
    pub const fn every(interval: Duration) -> Self {
        Self {
            interval,
            delay: Duration::ZERO,
            one_shot: false,
            paused: false,
            label: None,
        }
    }

    /// Float seconds, the unit frame deltas usually arrive in. Negative or NaN
    /// values become zero, which [`Scheduler`](crate::Scheduler) rejects.
    pub fn every_secs(secs: f32) -> Self {
        Self::every(secs_to_duration(secs))
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn after_secs(self, secs: f32) -> Self {
        self.after(secs_to_duration(secs))
    }

    pub fn once(mut self) -> Self {
        self.one_shot = true;
        self
    }

    pub fn start_paused(mut self) -> Self {
        self.paused = true;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

pub(crate) fn secs_to_duration(secs: f32) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}
