//! Boundary types shared between the lookup core and its collaborators.
//!
//! This crate defines the protocol boundary between the scheduler (layer 05)
//! and resolver / lifecycle implementations (layer 06), with no scheduling
//! logic of its own.

#![deny(missing_docs)]

mod description;
mod ids;
mod resolver;

pub use description::TextDescription;
pub use ids::{ActorId, ConsumerId, DictionaryName};
pub use resolver::{
    ActorLifecycle, LifecycleHandle, Resolved, Resolver, ResolverHandle, SubmitOutcome,
};
