use std::time::Duration;

use crate::{
    CallResult, ConfigError, Frame, Method, OwnerRef, Owners, Schedule, TimerHandle, TimerId,
    TimerKind,
};

/// A fixed argument captured at registration and passed on every fire.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Arg {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Arg::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Arg::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Ints widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Arg::Float(v) => Some(*v),
            Arg::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Int(v.into())
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Arg::Float(v.into())
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Str(v.to_owned())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Str(v)
    }
}

pub(crate) type Callback<O> = Box<dyn FnMut(&mut Frame<O>) -> CallResult>;

pub(crate) enum Payload<O> {
    Callback(Callback<O>),
    Method {
        owner: OwnerRef,
        method: Method<O>,
    },
    MethodWithArgs {
        owner: OwnerRef,
        method: Method<O>,
        args: Vec<Arg>,
    },
}

impl<O> Payload<O> {
    /// Bound payload; an empty argument list gives the plain method shape.
    pub(crate) fn bound(owner: OwnerRef, method: Method<O>, args: Vec<Arg>) -> Self {
        if args.is_empty() {
            Payload::Method { owner, method }
        } else {
            Payload::MethodWithArgs {
                owner,
                method,
                args,
            }
        }
    }

    pub(crate) fn kind(&self) -> TimerKind {
        match self {
            Payload::Callback(_) => TimerKind::Callback,
            Payload::Method { .. } => TimerKind::Method,
            Payload::MethodWithArgs { .. } => TimerKind::MethodWithArgs,
        }
    }

    fn owner(&self) -> Option<OwnerRef> {
        match self {
            Payload::Callback(_) => None,
            Payload::Method { owner, .. } | Payload::MethodWithArgs { owner, .. } => Some(*owner),
        }
    }
}

/// Outcome of advancing one item by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    Idle,
    Due,
    Retire,
}

/// One registration: payload plus its countdown state.
///
/// Lifecycle: delaying (while `delay_remaining > 0`), counting, due. A due item
/// is executed by the scheduler, then either retires (one-shot) or counts down
/// a full interval again.
pub(crate) struct TimerItem<O> {
    id: TimerId,
    interval: Duration,
    timer: Duration,
    delay_remaining: Duration,
    one_shot: bool,
    paused: bool,
    label: Option<String>,
    payload: Payload<O>,
}

impl<O> TimerItem<O> {
    /// Validates the schedule and allocates a fresh id.
    pub(crate) fn new(payload: Payload<O>, schedule: Schedule) -> Result<Self, ConfigError> {
        schedule.validate()?;

        Ok(Self {
            id: TimerId::next(),
            interval: schedule.interval,
            timer: schedule.interval,
            delay_remaining: schedule.delay,
            one_shot: schedule.one_shot,
            paused: schedule.paused,
            label: schedule.label,
            payload,
        })
    }

    #[inline(always)]
    pub(crate) fn id(&self) -> TimerId {
        self.id
    }

    #[inline(always)]
    pub(crate) fn kind(&self) -> TimerKind {
        self.payload.kind()
    }

    #[inline(always)]
    pub(crate) fn handle(&self) -> TimerHandle {
        TimerHandle::new(self.id, self.kind())
    }

    #[inline(always)]
    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left on the interval countdown.
    #[inline(always)]
    pub(crate) fn remaining(&self) -> Duration {
        self.timer
    }

    #[inline(always)]
    pub(crate) fn delay_remaining(&self) -> Duration {
        self.delay_remaining
    }

    #[inline(always)]
    pub(crate) fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    #[inline(always)]
    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline(always)]
    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(crate) fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Callbacks are always valid; bound items only while their owner lives.
    pub(crate) fn is_valid(&self, owners: &Owners<O>) -> bool {
        self.payload
            .owner()
            .is_none_or(|owner| owner.is_alive(owners))
    }

    pub(crate) fn tick(&mut self, dt: Duration, owners: &Owners<O>) -> Tick {
        if self.paused {
            return Tick::Idle;
        }

        if !self.is_valid(owners) {
            return Tick::Retire;
        }

        if !self.delay_remaining.is_zero() {
            // Whatever part of dt overshoots the delay is dropped.
            self.delay_remaining = self.delay_remaining.saturating_sub(dt);
            return Tick::Idle;
        }

        self.timer = self.timer.saturating_sub(dt);
        if self.timer.is_zero() {
            self.timer = self.interval;
            Tick::Due
        } else {
            Tick::Idle
        }
    }

    /// Runs the payload. A bound item whose owner vanished does nothing.
    pub(crate) fn execute(&mut self, owners: &mut Owners<O>, frame: &mut Frame<O>) -> CallResult {
        match &mut self.payload {
            Payload::Callback(callback) => callback(frame),
            Payload::Method { owner, method } => match owner.resolve_mut(owners) {
                Some(target) => method(target, &[], frame),
                None => Ok(()),
            },
            Payload::MethodWithArgs {
                owner,
                method,
                args,
            } => match owner.resolve_mut(owners) {
                Some(target) => method(target, args.as_slice(), frame),
                None => Ok(()),
            },
        }
    }
}
