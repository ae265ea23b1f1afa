//! Per-actor lookup state and the registry the cycle scheduler walks.
//!
//! The `lookup-state` crate stays free of collaborator calls. It owns the
//! deduplication key, the sort / translate / wait machine for one actor, and
//! the registry of active actors. Schedulers feed it cycles and resolver
//! results and act on what it returns.

#![deny(missing_docs)]

/// Per-actor phase machine and its pending-entry table.
pub mod actor;
/// Scheduler tunables.
pub mod config;
/// Error taxonomy for the lookup core.
pub mod error;
/// Canonical deduplication keys for text descriptions.
pub mod key;
/// Registry of active actors.
pub mod registry;
/// Request and pending-entry shapes.
pub mod types;

pub use crate::actor::{ActorState, StepOutcome, TranslateTable};
pub use crate::config::{SchedulerConfig, DEFAULT_TOTAL_BUDGET, DEFAULT_WAIT_CYCLES};
pub use crate::error::{LookupError, LookupResult};
pub use crate::key::{description_from_value, serialize, serialize_value, TextKey};
pub use crate::registry::{GlobalState, RouteOutcome};
pub use crate::types::{Consumers, Item, PendingEntry, Phase};
pub use lookup_abi::{ActorId, ConsumerId, DictionaryName, TextDescription};
