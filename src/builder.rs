use std::time::Duration;

use tracing::warn;

use crate::{
    Arg, CallResult, ConfigError, Frame, MIN_INTERVAL, OwnerRef, Owners, Schedule, Scheduler,
    TimerHandle, item::Callback, resolve::member_label, schedule::secs_to_duration,
};

enum Target<O> {
    None,
    Callback {
        callback: Callback<O>,
        origin: &'static str,
    },
    Method {
        owner: OwnerRef,
        member: String,
        args: Vec<Arg>,
    },
}

/// Fluent front end for a single registration.
///
/// ```ignore
/// let handle = TickBuilder::method(turret, "fire")
///     .interval_secs(0.25)
///     .delay_secs(1.0)
///     .register(&mut scheduler, &owners)?;
/// ```
///
/// Unlike [`Schedule`], the builder clamps the interval to at least
/// [`MIN_INTERVAL`] instead of rejecting it, and derives a label from the
/// target when none is given.
pub struct TickBuilder<O> {
    target: Target<O>,
    schedule: Schedule,
}

impl<O: 'static> Default for TickBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: 'static> TickBuilder<O> {
    /// Builder without a target. Registering it fails with
    /// [`ConfigError::MissingTarget`].
    pub fn new() -> Self {
        Self {
            target: Target::None,
            schedule: Schedule::default(),
        }
    }

    pub fn callback<F>(callback: F) -> Self
    where
        F: FnMut(&mut Frame<O>) -> CallResult + 'static,
    {
        Self {
            target: Target::Callback {
                callback: Box::new(callback),
                origin: callback_label::<F>(),
            },
            ..Self::new()
        }
    }

    pub fn method(owner: OwnerRef, member: impl Into<String>) -> Self {
        Self::method_with_args(owner, member, Vec::new())
    }

    pub fn method_with_args(owner: OwnerRef, member: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            target: Target::Method {
                owner,
                member: member.into(),
                args,
            },
            ..Self::new()
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.schedule.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn interval_secs(self, secs: f32) -> Self {
        self.interval(secs_to_duration(secs))
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.schedule.delay = delay;
        self
    }

    /// Negative delays clamp to zero.
    pub fn delay_secs(self, secs: f32) -> Self {
        self.delay(secs_to_duration(secs))
    }

    pub fn one_shot(mut self) -> Self {
        self.schedule.one_shot = true;
        self
    }

    pub fn paused(mut self) -> Self {
        self.schedule.paused = true;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.schedule.label = Some(label.into());
        self
    }

    /// Settings the registration will use, minus any derived label.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Performs exactly one registration.
    pub fn register(
        self,
        scheduler: &mut Scheduler<O>,
        owners: &Owners<O>,
    ) -> Result<TimerHandle, ConfigError> {
        let mut schedule = self.schedule;

        match self.target {
            Target::None => {
                warn!("tick builder registered without a callback or method");
                Err(ConfigError::MissingTarget)
            }
            Target::Callback { callback, origin } => {
                schedule.label.get_or_insert_with(|| origin.to_owned());
                scheduler.register_boxed(callback, schedule)
            }
            Target::Method {
                owner,
                member,
                args,
            } => {
                schedule
                    .label
                    .get_or_insert_with(|| member_label::<O>(&member));
                scheduler.register_bound_call(owners, owner, &member, args, schedule)
            }
        }
    }
}

/// Innermost named item a callback type belongs to: the function name for fn
/// items, the enclosing function for closures.
fn callback_label<F>() -> &'static str {
    let full = std::any::type_name::<F>().trim_end_matches("::{{closure}}");
    full.rsplit("::").next().unwrap_or(full)
}
