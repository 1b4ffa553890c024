use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use tracing::{debug, warn};

use crate::{
    AdvanceError, Arg, CallResult, ConfigError, Frame, IntervalGroup, Method, MethodTable,
    OwnerRef, Owners, Resolve, Schedule, TimerHandle, TimerId,
    group::Pass,
    item::{Callback, Payload, TimerItem},
};

/// Frame-driven registry of recurring timers, grouped by interval.
///
/// # Driving
///
/// The host calls [`advance`](Scheduler::advance) once per frame with the
/// frame's delta time and the owner arena. Every group is visited in
/// ascending interval order, every item in registration order, and each item
/// fires at most once per call regardless of how large `dt` is.
///
/// # Threading
///
/// A scheduler has a single thread of control. Payloads are not `Send`, so
/// the scheduler is neither `Send` nor `Sync`; hosts that need shared access
/// wrap it in one coarse lock.
pub struct Scheduler<O = ()> {
    groups: BTreeMap<Duration, IntervalGroup<O>>,
    index: HashMap<TimerId, Duration>,
    resolver: Box<dyn Resolve<O>>,
}

impl<O: 'static> Default for Scheduler<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: 'static> Scheduler<O> {
    /// Scheduler whose resolver knows no members. Use
    /// [`with_resolver`](Scheduler::with_resolver) for name-based binding.
    pub fn new() -> Self {
        Self::with_resolver(MethodTable::new())
    }

    pub fn with_resolver<R>(resolver: R) -> Self
    where
        R: Resolve<O> + 'static,
    {
        Self {
            groups: BTreeMap::new(),
            index: HashMap::new(),
            resolver: Box::new(resolver),
        }
    }

    pub fn set_resolver<R>(&mut self, resolver: R)
    where
        R: Resolve<O> + 'static,
    {
        self.resolver = Box::new(resolver);
    }

    /// Number of live registrations.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline(always)]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups in ascending interval order.
    pub fn groups(&self) -> impl Iterator<Item = &IntervalGroup<O>> {
        self.groups.values()
    }

    pub fn group(&self, interval: Duration) -> Option<&IntervalGroup<O>> {
        self.groups.get(&interval)
    }

    pub fn is_registered(&self, handle: TimerHandle) -> bool {
        self.index.contains_key(&handle.id())
    }

    /// `None` when the handle is invalid or stale.
    pub fn is_paused(&self, handle: TimerHandle) -> Option<bool> {
        self.item(handle.id()).map(TimerItem::is_paused)
    }

    /// Pauses or resumes a registration. A paused item keeps its remaining
    /// delay and countdown untouched until resumed.
    ///
    /// Returns `false` when the handle is invalid or stale.
    pub fn set_paused(&mut self, handle: TimerHandle, paused: bool) -> bool {
        match self.item_mut(handle.id()) {
            Some(item) => {
                item.set_paused(paused);
                true
            }
            None => false,
        }
    }

    pub fn register_callback<F>(
        &mut self,
        callback: F,
        schedule: Schedule,
    ) -> Result<TimerHandle, ConfigError>
    where
        F: FnMut(&mut Frame<O>) -> CallResult + 'static,
    {
        self.register_boxed(Box::new(callback), schedule)
    }

    pub(crate) fn register_boxed(
        &mut self,
        callback: Callback<O>,
        schedule: Schedule,
    ) -> Result<TimerHandle, ConfigError> {
        let item = TimerItem::new(Payload::Callback(callback), schedule)
            .map_err(rejected)?;
        Ok(self.insert(item))
    }

    /// Binds an already resolved method to `owner`.
    ///
    /// With an empty `args` list the registration is a plain
    /// [`TimerKind::Method`](crate::TimerKind::Method); otherwise the arguments
    /// are captured and passed on every fire.
    pub fn register_method(
        &mut self,
        owners: &Owners<O>,
        owner: OwnerRef,
        method: Method<O>,
        args: Vec<Arg>,
        schedule: Schedule,
    ) -> Result<TimerHandle, ConfigError> {
        schedule.validate().map_err(rejected)?;
        if !owner.is_alive(owners) {
            return Err(rejected(ConfigError::OwnerExpired));
        }

        let item = TimerItem::new(Payload::bound(owner, method, args), schedule)
            .map_err(rejected)?;
        Ok(self.insert(item))
    }

    /// Resolves `member` on `owner` through the scheduler's resolver, then
    /// registers it like [`register_method`](Scheduler::register_method).
    pub fn register_bound_call(
        &mut self,
        owners: &Owners<O>,
        owner: OwnerRef,
        member: &str,
        args: Vec<Arg>,
        schedule: Schedule,
    ) -> Result<TimerHandle, ConfigError> {
        schedule.validate().map_err(rejected)?;
        if member.is_empty() {
            return Err(rejected(ConfigError::EmptyMember));
        }

        let Some(target) = owner.resolve(owners) else {
            return Err(rejected(ConfigError::OwnerExpired));
        };

        let Some(method) = self.resolver.resolve(target, member) else {
            return Err(rejected(ConfigError::UnresolvedMember {
                member: member.to_owned(),
            }));
        };

        self.register_method(owners, owner, method, args, schedule)
    }

    /// Cancels a registration.
    ///
    /// Invalid, unknown, already cancelled, retired, or pre-reset handles are
    /// a silent no-op returning `false`.
    pub fn unregister(&mut self, handle: TimerHandle) -> bool {
        if !handle.is_valid() {
            return false;
        }
        self.remove(handle.id())
    }

    /// Advances every timer by `dt` and fires the ones that come due.
    ///
    /// Each payload's failure is isolated: the remaining items are still
    /// evaluated, failing items stay scheduled (one-shots still retire), and
    /// the failures are returned together with the fire count.
    ///
    /// Registrations made by payloads during this call join afterwards and are
    /// first visited by the next call.
    pub fn advance(&mut self, dt: Duration, owners: &mut Owners<O>) -> Result<usize, AdvanceError> {
        let mut frame = Frame::new();
        let mut pass = Pass::default();

        for group in self.groups.values_mut() {
            group.advance(dt, owners, &mut frame, &mut pass);
        }

        for id in &pass.evicted {
            self.index.remove(id);
        }

        let (cancelled, staged) = frame.into_parts();
        for id in cancelled {
            // Items visited before their cancellation was issued.
            self.remove(id);
        }
        for item in staged {
            // Frames cannot see the arena, so staged owners are checked here.
            if !item.is_valid(owners) {
                debug!(id = %item.id(), "dropped staged timer with expired owner");
                continue;
            }
            self.insert(item);
        }

        self.prune();
        pass.finish()
    }

    /// Drops every registration. Handles issued before the reset stay stale
    /// forever since ids are never reused.
    pub fn reset(&mut self) {
        let dropped = self.index.len();
        self.groups.clear();
        self.index.clear();
        debug!(dropped, "scheduler reset");
    }

    fn insert(&mut self, item: TimerItem<O>) -> TimerHandle {
        let handle = item.handle();
        let interval = item.interval();

        self.index.insert(handle.id(), interval);
        self.groups
            .entry(interval)
            .or_insert_with(|| IntervalGroup::new(interval))
            .push(item);

        handle
    }

    fn remove(&mut self, id: TimerId) -> bool {
        let Some(interval) = self.index.remove(&id) else {
            return false;
        };

        let Some(group) = self.groups.get_mut(&interval) else {
            return false;
        };

        let removed = group.remove(id).is_some();
        if group.is_empty() {
            self.groups.remove(&interval);
        }
        removed
    }

    fn prune(&mut self) {
        let before = self.groups.len();
        self.groups.retain(|_, group| !group.is_empty());

        let pruned = before - self.groups.len();
        if pruned > 0 {
            debug!(pruned, "pruned empty interval groups");
        }
    }

    fn item(&self, id: TimerId) -> Option<&TimerItem<O>> {
        let interval = self.index.get(&id)?;
        self.groups.get(interval)?.get(id)
    }

    fn item_mut(&mut self, id: TimerId) -> Option<&mut TimerItem<O>> {
        let interval = self.index.get(&id)?;
        self.groups.get_mut(interval)?.get_mut(id)
    }
}

fn rejected(error: ConfigError) -> ConfigError {
    warn!(%error, "rejected timer registration");
    error
}
