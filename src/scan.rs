use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    Owners, Schedule, Scheduler, TimerHandle, resolve::member_label, schedule::secs_to_duration,
};

/// A recurring tick an owner type declares for one of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickDecl {
    pub member: &'static str,
    pub interval: Duration,
    pub delay: Duration,
}

impl TickDecl {
    pub const fn every(member: &'static str, interval: Duration) -> Self {
        Self {
            member,
            interval,
            delay: Duration::ZERO,
        }
    }

    /// Negative seconds clamp to zero.
    pub fn every_secs(member: &'static str, secs: f32) -> Self {
        Self::every(member, secs_to_duration(secs))
    }

    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn after_secs(self, secs: f32) -> Self {
        self.after(secs_to_duration(secs))
    }
}

/// Owner types that declare their own ticks.
///
/// [`Scheduler::scan`] binds every declaration to a zero-argument member
/// resolved through the scheduler's resolver.
pub trait Tickable {
    fn ticks(&self) -> Vec<TickDecl>;
}

impl<O: Tickable + 'static> Scheduler<O> {
    /// Registers the declared ticks of every live owner, looping and unpaused.
    ///
    /// Declarations that fail to register (zero interval, unknown member) are
    /// skipped.
    pub fn scan(&mut self, owners: &Owners<O>) -> Vec<TimerHandle> {
        let mut handles = Vec::new();

        for (owner, target) in owners.iter() {
            for decl in target.ticks() {
                let schedule = Schedule::every(decl.interval)
                    .after(decl.delay)
                    .label(member_label::<O>(decl.member));

                match self.register_bound_call(owners, owner, decl.member, Vec::new(), schedule) {
                    Ok(handle) => handles.push(handle),
                    Err(error) => warn!(member = decl.member, %error, "skipping declared tick"),
                }
            }
        }

        debug!(
            registered = handles.len(),
            owners = owners.len(),
            "scanned owners"
        );
        handles
    }

    /// Drops every registration, then scans again.
    pub fn rescan(&mut self, owners: &Owners<O>) -> Vec<TimerHandle> {
        self.reset();
        self.scan(owners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MethodTable;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    struct Spawner {
        spawned: usize,
        cleaned: usize,
        broken: bool,
    }

    impl Spawner {
        fn new() -> Self {
            Self {
                spawned: 0,
                cleaned: 0,
                broken: false,
            }
        }
    }

    impl Tickable for Spawner {
        fn ticks(&self) -> Vec<TickDecl> {
            let mut ticks = vec![
                TickDecl::every("spawn", ms(100)),
                TickDecl::every_secs("cleanup", 0.5).after_secs(1.0),
            ];
            if self.broken {
                ticks.push(TickDecl::every("explode", ms(100)));
                ticks.push(TickDecl::every_secs("spawn", -1.0));
            }
            ticks
        }
    }

    fn scheduler() -> Scheduler<Spawner> {
        Scheduler::with_resolver(
            MethodTable::<Spawner>::new()
                .with("spawn", |spawner, _, _| {
                    spawner.spawned += 1;
                    Ok(())
                })
                .with("cleanup", |spawner, _, _| {
                    spawner.cleaned += 1;
                    Ok(())
                }),
        )
    }

    #[test]
    fn test_decl_clamps_negative() {
        let decl = TickDecl::every_secs("x", -2.0).after_secs(-1.0);
        assert_eq!(decl.interval, Duration::ZERO);
        assert_eq!(decl.delay, Duration::ZERO);
    }

    #[test]
    fn test_scan_registers_declared_ticks() {
        let mut sched = scheduler();
        let mut owners = Owners::new();
        let a = owners.spawn(Spawner::new());
        let b = owners.spawn(Spawner::new());

        let handles = sched.scan(&owners);
        assert_eq!(handles.len(), 4);
        assert_eq!(sched.group_count(), 2);

        for _ in 0..15 {
            sched.advance(ms(100), &mut owners).unwrap();
        }

        for owner in [a, b] {
            let spawner = owners.get(owner).unwrap();
            assert_eq!(spawner.spawned, 15);
            // 1s delay, then every 500ms
            assert_eq!(spawner.cleaned, 1);
        }
    }

    #[test]
    fn test_scan_skips_bad_declarations() {
        let mut sched = scheduler();
        let mut owners = Owners::new();
        let mut broken = Spawner::new();
        broken.broken = true;
        owners.spawn(broken);

        let handles = sched.scan(&owners);
        assert_eq!(handles.len(), 2);
        assert_eq!(sched.len(), 2);
    }

    #[test]
    fn test_scan_labels() {
        let mut sched = scheduler();
        let mut owners = Owners::new();
        owners.spawn(Spawner::new());
        sched.scan(&owners);

        let mut labels: Vec<String> = sched
            .groups()
            .flat_map(|group| group.items())
            .filter_map(|item| item.label().map(str::to_owned))
            .collect();
        labels.sort();
        assert_eq!(labels, vec!["Spawner.cleanup", "Spawner.spawn"]);
    }

    #[test]
    fn test_rescan_replaces_registrations() {
        let mut sched = scheduler();
        let mut owners = Owners::new();
        owners.spawn(Spawner::new());

        let first = sched.scan(&owners);
        owners.spawn(Spawner::new());
        let second = sched.rescan(&owners);

        assert_eq!(second.len(), 4);
        assert_eq!(sched.len(), 4);
        assert!(first.iter().all(|h| !sched.is_registered(*h)));
    }

    #[test]
    fn test_scan_empty_arena() {
        let mut sched = scheduler();
        let owners = Owners::new();
        assert!(sched.scan(&owners).is_empty());
    }
}
