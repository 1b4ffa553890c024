use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Process-wide id source. Ids are never handed out twice, not even across
/// [`Scheduler::reset`](crate::Scheduler::reset) or separate schedulers.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a registration. `0` is reserved for "no registration".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub const NONE: TimerId = TimerId(0);

    pub(crate) fn next() -> Self {
        TimerId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline(always)]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which payload shape a registration carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimerKind {
    #[default]
    Callback,
    Method,
    MethodWithArgs,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimerKind::Callback => "Callback",
            TimerKind::Method => "Method",
            TimerKind::MethodWithArgs => "MethodWithArgs",
        })
    }
}

/// Handle for cancelling a registration.
///
/// # Semantics
///
/// `TimerHandle` is `Copy`: many parties may hold the same handle, and
/// cancelling is idempotent. The first
/// [`unregister`](crate::Scheduler::unregister) removes the item, every later
/// one is a no-op.
///
/// # Validity
///
/// `TimerHandle::default()` is [`TimerHandle::INVALID`] and never matches a
/// registration. A handle also goes stale once its item retires (one-shot
/// fired, owner expired) or the scheduler is reset; stale handles are always
/// safe to pass back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: TimerId,
    kind: TimerKind,
}

impl TimerHandle {
    pub const INVALID: TimerHandle = TimerHandle {
        id: TimerId::NONE,
        kind: TimerKind::Callback,
    };

    pub(crate) const fn new(id: TimerId, kind: TimerKind) -> Self {
        Self { id, kind }
    }

    #[inline(always)]
    pub const fn id(&self) -> TimerId {
        self.id
    }

    #[inline(always)]
    pub const fn kind(&self) -> TimerKind {
        self.kind
    }

    #[inline(always)]
    pub const fn is_valid(&self) -> bool {
        !self.id.is_none()
    }
}
