//! Collaborator traits the scheduler drives.

use crate::description::TextDescription;
use crate::ids::ActorId;
use smallvec::SmallVec;
use std::sync::Arc;

/// Outcome returned when attempting to hand a lookup to the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Request entered the resolver untouched.
    Accepted,
    /// Request was intentionally dropped by the resolver.
    Dropped,
    /// Resolver could not accept without blocking.
    WouldBlock,
    /// Resolver is closed or unhealthy.
    Closed,
}

impl SubmitOutcome {
    /// Returns `true` when the resolver took the request.
    pub fn is_accepted(self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }
}

/// One result delivered by the resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    /// Actor the lookup was issued for.
    pub actor: ActorId,
    /// Description echoed back by the resolver, in its raw JSON shape.
    pub description: serde_json::Value,
    /// Final display string.
    pub text: String,
    /// Whether the resolver produced a real result rather than a fallback.
    pub translated: bool,
}

/// Non-blocking resolver service.
///
/// Submissions are fire-and-forget: results arrive later, possibly out of
/// order, duplicated, or not at all.
pub trait Resolver {
    /// Issues one lookup for `description` on behalf of `actor`.
    fn try_resolve(&self, actor: ActorId, description: &TextDescription) -> SubmitOutcome;

    /// Drains up to `max` results without blocking. Defaults to empty for
    /// resolvers that deliver results out-of-band.
    fn drain(&self, _max: usize) -> SmallVec<[Resolved; 8]> {
        SmallVec::new()
    }
}

/// Connectivity source queried once per actor per cycle.
pub trait ActorLifecycle {
    /// Returns `false` once the actor has gone away.
    fn is_connected(&self, actor: ActorId) -> bool;
}

/// Shared handle to a resolver implementation.
pub type ResolverHandle = Arc<dyn Resolver + Send + Sync>;
/// Shared handle to a lifecycle implementation.
pub type LifecycleHandle = Arc<dyn ActorLifecycle + Send + Sync>;
