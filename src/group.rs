use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::{
    AdvanceError, ExecutionError, Frame, Owners, TimerHandle, TimerId,
    item::{Tick, TimerItem},
};

/// Registrations sharing one interval, in insertion order.
pub struct IntervalGroup<O> {
    interval: Duration,
    items: Vec<TimerItem<O>>,
}

impl<O> IntervalGroup<O> {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            items: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn handles(&self) -> impl Iterator<Item = TimerHandle> {
        self.items.iter().map(TimerItem::handle)
    }

    pub(crate) fn items(&self) -> &[TimerItem<O>] {
        &self.items
    }

    pub(crate) fn push(&mut self, item: TimerItem<O>) {
        debug_assert_eq!(item.interval(), self.interval);
        self.items.push(item);
    }

    pub(crate) fn get(&self, id: TimerId) -> Option<&TimerItem<O>> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: TimerId) -> Option<&mut TimerItem<O>> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Removes one item, keeping the order of the rest.
    pub(crate) fn remove(&mut self, id: TimerId) -> Option<TimerItem<O>> {
        let pos = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(pos))
    }

    /// Advances every item once and compacts out the ones that retire.
    ///
    /// `retain_mut` visits each item exactly once in order while removing, so
    /// an eviction never skips or repeats a neighbour.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        owners: &mut Owners<O>,
        frame: &mut Frame<O>,
        pass: &mut Pass,
    ) {
        self.items.retain_mut(|item| {
            if frame.is_cancelled(item.id()) {
                pass.evicted.push(item.id());
                return false;
            }

            match item.tick(dt, owners) {
                Tick::Idle => true,
                Tick::Retire => {
                    debug!(id = %item.id(), "owner expired, evicting timer");
                    pass.evicted.push(item.id());
                    false
                }
                Tick::Due => {
                    pass.fire(item, owners, frame);

                    let keep = !item.is_one_shot() && !frame.is_cancelled(item.id());
                    if !keep {
                        pass.evicted.push(item.id());
                    }
                    keep
                }
            }
        });
    }
}

/// Bookkeeping for one advance across all groups.
#[derive(Default)]
pub(crate) struct Pass {
    pub(crate) fired: usize,
    pub(crate) evicted: Vec<TimerId>,
    pub(crate) failures: Vec<ExecutionError>,
}

impl Pass {
    fn fire<O>(&mut self, item: &mut TimerItem<O>, owners: &mut Owners<O>, frame: &mut Frame<O>) {
        frame.set_current(item.handle());
        trace!(id = %item.id(), interval = ?item.interval(), "timer fired");

        if let Err(source) = item.execute(owners, frame) {
            warn!(
                id = %item.id(),
                label = item.label().unwrap_or_default(),
                error = %source,
                "timer callback failed"
            );
            self.failures.push(ExecutionError {
                id: item.id(),
                kind: item.kind(),
                label: item.label().map(str::to_owned),
                source,
            });
        }

        self.fired += 1;
        frame.set_current(TimerHandle::INVALID);
    }

    pub(crate) fn finish(self) -> Result<usize, AdvanceError> {
        if self.failures.is_empty() {
            Ok(self.fired)
        } else {
            Err(AdvanceError {
                fired: self.fired,
                failures: self.failures,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Schedule, item::Payload};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn logging_item(
        log: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
        schedule: Schedule,
    ) -> TimerItem<()> {
        let log = Rc::clone(log);
        TimerItem::new(
            Payload::Callback(Box::new(move |_| {
                log.borrow_mut().push(name);
                Ok(())
            })),
            schedule,
        )
        .unwrap()
    }

    fn run(group: &mut IntervalGroup<()>, dt: Duration) -> Pass {
        let mut owners = Owners::new();
        let mut frame = Frame::new();
        let mut pass = Pass::default();
        group.advance(dt, &mut owners, &mut frame, &mut pass);
        pass
    }

    #[test]
    fn test_push_and_remove_keep_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = IntervalGroup::new(ms(100));

        let a = logging_item(&log, "a", Schedule::every(ms(100)));
        let b = logging_item(&log, "b", Schedule::every(ms(100)));
        let c = logging_item(&log, "c", Schedule::every(ms(100)));
        let b_id = b.id();
        group.push(a);
        group.push(b);
        group.push(c);

        assert_eq!(group.len(), 3);
        assert!(group.contains(b_id));
        assert!(group.remove(b_id).is_some());
        assert!(group.remove(b_id).is_none());

        run(&mut group, ms(100));
        assert_eq!(*log.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn test_adjacent_one_shots_all_evicted() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = IntervalGroup::new(ms(100));

        // Neighbouring removals in one pass must neither skip nor repeat.
        for name in ["a", "b", "c", "d"] {
            group.push(logging_item(&log, name, Schedule::every(ms(100)).once()));
        }
        group.push(logging_item(&log, "loop", Schedule::every(ms(100))));

        let pass = run(&mut group, ms(100));

        assert_eq!(*log.borrow(), vec!["a", "b", "c", "d", "loop"]);
        assert_eq!(pass.fired, 5);
        assert_eq!(pass.evicted.len(), 4);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_cancelled_item_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = IntervalGroup::new(ms(100));

        let a = logging_item(&log, "a", Schedule::every(ms(100)));
        let a_handle = a.handle();
        group.push(a);
        group.push(logging_item(&log, "b", Schedule::every(ms(100))));

        let mut owners = Owners::new();
        let mut frame = Frame::new();
        let mut pass = Pass::default();
        frame.unregister(a_handle);
        group.advance(ms(100), &mut owners, &mut frame, &mut pass);

        assert_eq!(*log.borrow(), vec!["b"]);
        assert_eq!(pass.evicted, vec![a_handle.id()]);
        assert!(!group.contains(a_handle.id()));
    }

    #[test]
    fn test_failure_recorded_and_item_kept() {
        let mut group = IntervalGroup::new(ms(100));
        group.push(
            TimerItem::new(
                Payload::Callback(Box::new(|_| Err("jammed".into()))),
                Schedule::every(ms(100)).label("jam"),
            )
            .unwrap(),
        );

        let pass = run(&mut group, ms(100));
        assert_eq!(group.len(), 1);

        let err = pass.finish().unwrap_err();
        assert_eq!(err.fired, 1);
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].label.as_deref(), Some("jam"));
    }

    #[test]
    fn test_finish_ok_without_failures() {
        let mut pass = Pass::default();
        pass.fired = 3;
        assert_eq!(pass.finish().unwrap(), 3);
    }

    #[test]
    fn test_handles_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = IntervalGroup::new(ms(50));
        let a = logging_item(&log, "a", Schedule::every(ms(50)));
        let b = logging_item(&log, "b", Schedule::every(ms(50)));
        let ids = [a.id(), b.id()];
        group.push(a);
        group.push(b);

        let handles: Vec<_> = group.handles().map(|h| h.id()).collect();
        assert_eq!(handles, ids);
        assert_eq!(group.interval(), ms(50));
    }
}
