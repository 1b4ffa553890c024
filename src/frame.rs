use std::collections::HashSet;

use tracing::warn;

use crate::{
    Arg, CallResult, ConfigError, Method, OwnerRef, Schedule, TimerHandle, TimerId,
    item::{Payload, TimerItem},
};

/// Commands issued by payloads while an advance is in progress.
///
/// Every callback and bound method receives the frame of the pass that fired
/// it. Cancellations take effect immediately for the rest of the pass, so an
/// item cancelled by an earlier one in the same frame does not fire.
/// Registrations are staged and join the scheduler once the pass is over; the
/// pass that created them never visits them. A staged bound call whose owner
/// is destroyed before it joins is dropped.
pub struct Frame<O> {
    current: TimerHandle,
    cancelled: HashSet<TimerId>,
    staged: Vec<TimerItem<O>>,
}

impl<O> Frame<O> {
    pub(crate) fn new() -> Self {
        Self {
            current: TimerHandle::INVALID,
            cancelled: HashSet::new(),
            staged: Vec::new(),
        }
    }

    /// Handle of the item currently executing.
    #[inline(always)]
    pub fn current(&self) -> TimerHandle {
        self.current
    }

    /// Cancels a registration. Invalid or unknown handles are ignored.
    pub fn unregister(&mut self, handle: TimerHandle) {
        if !handle.is_valid() {
            return;
        }
        self.staged.retain(|item| item.id() != handle.id());
        self.cancelled.insert(handle.id());
    }

    /// Stages a new callback. The returned handle is live as soon as this
    /// advance returns.
    pub fn register_callback<F>(
        &mut self,
        callback: F,
        schedule: Schedule,
    ) -> Result<TimerHandle, ConfigError>
    where
        F: FnMut(&mut Frame<O>) -> CallResult + 'static,
    {
        self.stage(Payload::Callback(Box::new(callback)), schedule)
    }

    /// Stages `method` bound to `owner`, like
    /// [`Scheduler::register_method`](crate::Scheduler::register_method).
    pub fn register_method(
        &mut self,
        owner: OwnerRef,
        method: Method<O>,
        args: Vec<Arg>,
        schedule: Schedule,
    ) -> Result<TimerHandle, ConfigError> {
        self.stage(Payload::bound(owner, method, args), schedule)
    }

    fn stage(
        &mut self,
        payload: Payload<O>,
        schedule: Schedule,
    ) -> Result<TimerHandle, ConfigError> {
        let item = TimerItem::new(payload, schedule)
            .inspect_err(|error| warn!(%error, "rejected timer registration"))?;
        let handle = item.handle();
        self.staged.push(item);
        Ok(handle)
    }

    #[inline(always)]
    pub(crate) fn is_cancelled(&self, id: TimerId) -> bool {
        self.cancelled.contains(&id)
    }

    #[inline(always)]
    pub(crate) fn set_current(&mut self, handle: TimerHandle) {
        self.current = handle;
    }

    pub(crate) fn into_parts(self) -> (HashSet<TimerId>, Vec<TimerItem<O>>) {
        (self.cancelled, self.staged)
    }
}
