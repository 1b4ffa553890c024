use std::{fmt, time::Duration};

use crate::{Owners, Scheduler, TimerId, TimerKind, group::IntervalGroup, item::TimerItem};

/// Snapshot of one interval group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInfo {
    pub interval: Duration,
    pub items: Vec<ItemInfo>,
}

/// Snapshot of one registration.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
    pub id: TimerId,
    pub kind: TimerKind,
    /// `false` once a bound item's owner is gone; the item is evicted on its
    /// next unpaused advance.
    pub valid: bool,
    pub paused: bool,
    pub one_shot: bool,
    pub remaining: Duration,
    pub delay_remaining: Duration,
    pub label: Option<String>,
}

impl GroupInfo {
    fn capture<O>(group: &IntervalGroup<O>, owners: &Owners<O>) -> Self {
        Self {
            interval: group.interval(),
            items: group
                .items()
                .iter()
                .map(|item| ItemInfo::capture(item, owners))
                .collect(),
        }
    }
}

impl ItemInfo {
    fn capture<O>(item: &TimerItem<O>, owners: &Owners<O>) -> Self {
        Self {
            id: item.id(),
            kind: item.kind(),
            valid: item.is_valid(owners),
            paused: item.is_paused(),
            one_shot: item.is_one_shot(),
            remaining: item.remaining(),
            delay_remaining: item.delay_remaining(),
            label: item.label().map(str::to_owned),
        }
    }
}

/// `Interval: 0.500s | Count: 2`. The alternate form (`{:#}`) also lists the
/// items, one per indented line.
impl fmt::Display for GroupInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interval: {:.3}s | Count: {}",
            self.interval.as_secs_f64(),
            self.items.len()
        )?;

        if f.alternate() {
            for item in &self.items {
                write!(f, "\n  {item}")?;
            }
        }
        Ok(())
    }
}

/// `[ID: 7] [Active] [Loop] [Valid] (Callback) label`
impl fmt::Display for ItemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ID: {}] [{}] [{}] [{}] ({})",
            self.id,
            if self.paused { "Paused" } else { "Active" },
            if self.one_shot { "OneShot" } else { "Loop" },
            if self.valid { "Valid" } else { "Invalid" },
            self.kind,
        )?;

        if let Some(label) = &self.label {
            write!(f, " {label}")?;
        }
        Ok(())
    }
}

impl<O: 'static> Scheduler<O> {
    /// Read-only snapshot of every group, in ascending interval order.
    pub fn inspect(&self, owners: &Owners<O>) -> Vec<GroupInfo> {
        self.groups()
            .map(|group| GroupInfo::capture(group, owners))
            .collect()
    }
}
