//! Collaborator hub: the resolver and lifecycle handles the scheduler drives.

#![deny(missing_docs)]

use anyhow::{anyhow, Result};

pub use lookup_abi::{
    ActorId, ActorLifecycle, LifecycleHandle, Resolved, Resolver, ResolverHandle, SubmitOutcome,
    TextDescription,
};

/// Default budget for draining resolver results per scheduler cycle.
pub const DEFAULT_RESULT_BUDGET: usize = 64;

/// Aggregates the external collaborators of the lookup scheduler.
#[derive(Clone)]
pub struct CollaboratorHub {
    resolver: ResolverHandle,
    lifecycle: LifecycleHandle,
}

impl CollaboratorHub {
    /// Creates a new builder for constructing a hub.
    pub fn builder() -> CollaboratorHubBuilder {
        CollaboratorHubBuilder::new()
    }

    /// Hands one lookup to the resolver.
    pub fn try_resolve(&self, actor: ActorId, description: &TextDescription) -> SubmitOutcome {
        self.resolver.try_resolve(actor, description)
    }

    /// Returns whether `actor` is still connected.
    pub fn is_connected(&self, actor: ActorId) -> bool {
        self.lifecycle.is_connected(actor)
    }

    /// Drains resolver results up to the provided budget.
    pub fn drain_results(&self, budget: usize) -> Vec<Resolved> {
        if budget == 0 {
            return Vec::new();
        }

        let mut remaining = budget;
        let mut out = Vec::with_capacity(budget.min(DEFAULT_RESULT_BUDGET));

        while remaining > 0 {
            let drained = self.resolver.drain(remaining);
            if drained.is_empty() {
                break;
            }
            remaining = remaining.saturating_sub(drained.len());
            out.extend(drained);
        }

        out
    }
}

impl std::fmt::Debug for CollaboratorHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaboratorHub").finish_non_exhaustive()
    }
}

/// Builder for assembling a [`CollaboratorHub`] from individual handles.
pub struct CollaboratorHubBuilder {
    resolver: Option<ResolverHandle>,
    lifecycle: Option<LifecycleHandle>,
}

impl CollaboratorHubBuilder {
    /// Creates an empty builder with no collaborators attached.
    pub fn new() -> Self {
        Self {
            resolver: None,
            lifecycle: None,
        }
    }

    /// Sets the resolver handle.
    pub fn resolver(mut self, resolver: ResolverHandle) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the actor lifecycle handle.
    pub fn lifecycle(mut self, lifecycle: LifecycleHandle) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Builds a [`CollaboratorHub`], returning an error if a handle is missing.
    pub fn build(self) -> Result<CollaboratorHub> {
        Ok(CollaboratorHub {
            resolver: self.resolver.ok_or_else(|| anyhow!("missing resolver"))?,
            lifecycle: self
                .lifecycle
                .ok_or_else(|| anyhow!("missing actor lifecycle"))?,
        })
    }
}

impl Default for CollaboratorHubBuilder {
    fn default() -> Self {
        Self::new()
    }
}
