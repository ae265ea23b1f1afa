//! Error taxonomy for the lookup core.

use lookup_abi::ActorId;
use thiserror::Error;

/// Result alias used throughout the lookup core.
pub type LookupResult<T> = Result<T, LookupError>;

/// Recoverable anomalies surfaced by the lookup core.
///
/// Stale or duplicate resolver results are not errors; routing reports them
/// as [`crate::RouteOutcome::NotFound`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// A raw description could not be read as text.
    #[error("invalid text description: {0}")]
    InvalidDescription(String),

    /// The actor has no lookup state (cancelled twice, or never enqueued).
    #[error("no lookup state for {0}")]
    UnknownActor(ActorId),

    /// Configuration rejected by [`crate::SchedulerConfig::validate`].
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfig(&'static str),
}

impl LookupError {
    /// Builds an [`LookupError::InvalidDescription`] from any message.
    pub fn invalid_description(msg: impl Into<String>) -> Self {
        LookupError::InvalidDescription(msg.into())
    }
}
