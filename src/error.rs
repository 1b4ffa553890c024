use crate::{TimerId, TimerKind};

/// Error type payloads return when an invocation fails.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return type of every callback and bound method.
pub type CallResult = Result<(), BoxError>;

/// A registration was rejected. Nothing was scheduled.
///
/// Callers that prefer the sentinel handle can use
/// `result.unwrap_or_default()`, which yields [`TimerHandle::INVALID`](crate::TimerHandle::INVALID).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("interval must be greater than zero")]
    InvalidInterval,

    #[error("owner is no longer alive")]
    OwnerExpired,

    #[error("member name is empty")]
    EmptyMember,

    #[error("member `{member}` not found on owner")]
    UnresolvedMember { member: String },

    #[error("no callback or owner method to register")]
    MissingTarget,
}

/// A payload returned an error while firing.
#[derive(Debug, thiserror::Error)]
#[error("timer {id} ({kind}) failed: {source}")]
pub struct ExecutionError {
    pub id: TimerId,
    pub kind: TimerKind,
    pub label: Option<String>,
    #[source]
    pub source: BoxError,
}

/// Some payloads failed during [`Scheduler::advance`](crate::Scheduler::advance).
///
/// Every other item was still evaluated; `fired` counts all executions,
/// failed ones included.
#[derive(Debug, thiserror::Error)]
#[error("{} of {fired} fired timers failed", .failures.len())]
pub struct AdvanceError {
    pub fired: usize,
    pub failures: Vec<ExecutionError>,
}
