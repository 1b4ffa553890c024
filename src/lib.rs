//! Frame-driven recurring timers.
//!
//! The host owns a [`Scheduler`] and an [`Owners`] arena and calls
//! [`Scheduler::advance`] once per frame with the frame's delta time. Timers
//! sharing an interval are grouped; each group is walked in registration
//! order and every due item fires at most once per frame.
//!
//! ```ignore
//! let mut scheduler: Scheduler = Scheduler::new();
//! let mut owners = Owners::new();
//!
//! let handle = scheduler.register_callback(
//!     |_| {
//!         println!("half a second passed");
//!         Ok(())
//!     },
//!     Schedule::every_secs(0.5),
//! )?;
//!
//! loop {
//!     scheduler.advance(frame_dt, &mut owners)?;
//! }
//! ```
//!
//! Timers may also be bound to a member of an owner in the arena. Those stop
//! firing and are evicted once the owner is destroyed.

mod builder;
mod error;
mod frame;
mod group;
mod handle;
mod inspect;
mod item;
mod owner;
mod resolve;
mod scan;
mod schedule;
mod scheduler;

#[cfg(test)]
mod latency;

pub use builder::TickBuilder;
pub use error::{AdvanceError, BoxError, CallResult, ConfigError, ExecutionError};
pub use frame::Frame;
pub use group::IntervalGroup;
pub use handle::{TimerHandle, TimerId, TimerKind};
pub use inspect::{GroupInfo, ItemInfo};
pub use item::Arg;
pub use owner::{OwnerKey, OwnerRef, Owners};
pub use resolve::{Method, MethodTable, Resolve};
pub use scan::{TickDecl, Tickable};
pub use schedule::{DEFAULT_INTERVAL, MIN_INTERVAL, Schedule};
pub use scheduler::Scheduler;
