//! Registry of actors with lookup work in flight.

use crate::actor::ActorState;
use crate::error::{LookupError, LookupResult};
use crate::key::TextKey;
use crate::types::{Consumers, Item, PendingEntry};
use log::{debug, trace, warn};
use lookup_abi::ActorId;
use std::collections::HashMap;

/// Result of matching a resolver result against pending work.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// No pending entry matched: unknown actor, or a stale or duplicate result.
    NotFound,
    /// The entry was pending and has been removed.
    Matched {
        /// The removed entry, with every consumer that asked for it.
        entry: PendingEntry,
        /// `true` when this result completed the actor's workflow.
        finished: bool,
    },
}

impl RouteOutcome {
    /// Returns `true` when this result completed the actor's workflow.
    pub fn finished(&self) -> bool {
        matches!(self, RouteOutcome::Matched { finished: true, .. })
    }

    /// Consumers to dispatch the result to, if anything matched.
    pub fn consumers(&self) -> Option<&Consumers> {
        match self {
            RouteOutcome::Matched { entry, .. } => Some(&entry.consumers),
            RouteOutcome::NotFound => None,
        }
    }

    /// Splits into `(consumers, finished)`.
    pub fn into_parts(self) -> (Option<Consumers>, bool) {
        match self {
            RouteOutcome::Matched { entry, finished } => (Some(entry.consumers), finished),
            RouteOutcome::NotFound => (None, false),
        }
    }
}

/// Process-wide lookup state: one [`ActorState`] per active actor.
///
/// The active count is the registry size, so it can never drift from the
/// actors it counts.
#[derive(Debug, Default, Clone)]
pub struct GlobalState {
    actors: HashMap<ActorId, ActorState>,
}

impl GlobalState {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actors with state.
    pub fn active_count(&self) -> usize {
        self.actors.len()
    }

    /// Returns `true` when `actor` has lookup work in flight.
    pub fn contains(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    /// Borrows one actor's state.
    pub fn actor(&self, actor: ActorId) -> Option<&ActorState> {
        self.actors.get(&actor)
    }

    /// Mutably borrows one actor's state.
    pub fn actor_mut(&mut self, actor: ActorId) -> Option<&mut ActorState> {
        self.actors.get_mut(&actor)
    }

    /// Snapshot of the active actor ids, in no particular order.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    /// Queues `items` for `actor`, creating its state on first use.
    ///
    /// An empty batch for an unknown actor is ignored: there would be nothing
    /// to ever complete the workflow.
    pub fn add_requests(&mut self, actor: ActorId, items: impl IntoIterator<Item = Item>) {
        if let Some(state) = self.actors.get_mut(&actor) {
            state.enqueue(items);
            debug!("{actor}: restarted sorting with {} queued", state.queued());
            return;
        }

        let state = ActorState::new(items);
        if state.queued() == 0 {
            trace!("{actor}: empty request batch ignored");
            return;
        }
        debug!("{actor}: created with {} queued", state.queued());
        self.actors.insert(actor, state);
    }

    /// Drops all state for `actor`.
    ///
    /// Cancelling an actor without state is a logged no-op; the returned
    /// error lets callers inspect it but needs no handling.
    pub fn cancel(&mut self, actor: ActorId) -> LookupResult<()> {
        match self.actors.remove(&actor) {
            Some(_) => {
                debug!("{actor}: cancelled");
                Ok(())
            }
            None => {
                warn!("{actor}: cancel requested but no lookup state exists");
                Err(LookupError::UnknownActor(actor))
            }
        }
    }

    /// Matches a resolver result for `actor` against its pending entries.
    ///
    /// The entry is removed exactly once; the result that empties the table
    /// also removes the actor and reports `finished`.
    pub fn route(&mut self, actor: ActorId, key: &TextKey) -> RouteOutcome {
        let Some(state) = self.actors.get_mut(&actor) else {
            trace!("{actor}: result for unknown actor ignored");
            return RouteOutcome::NotFound;
        };
        let Some(entry) = state.take_entry(key) else {
            trace!("{actor}: stale result ignored");
            return RouteOutcome::NotFound;
        };

        let finished = state.pending_count() == 0;
        if finished {
            self.actors.remove(&actor);
            debug!("{actor}: all lookups resolved");
        }
        RouteOutcome::Matched { entry, finished }
    }

    /// Drops every actor.
    pub fn clear(&mut self) {
        self.actors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::serialize;
    use lookup_abi::TextDescription;

    fn key(text: &str) -> TextKey {
        serialize(&TextDescription::text(text))
    }

    fn sorted(state: &mut GlobalState, actor: ActorId) {
        let steps = state
            .actor_mut(actor)
            .expect("actor exists")
            .advance(actor, 0, 1_000, 20);
        assert!(steps.steps > 0);
    }

    #[test]
    fn add_requests_creates_then_extends() {
        let mut state = GlobalState::new();
        let actor = ActorId(7);

        state.add_requests(actor, [Item::new("a", "d", 1u64)]);
        assert_eq!(state.active_count(), 1);

        state.add_requests(actor, [Item::new("b", "d", 2u64)]);
        assert_eq!(state.active_count(), 1);
        assert_eq!(state.actor(actor).map(ActorState::queued), Some(2));
    }

    #[test]
    fn empty_batch_for_unknown_actor_is_ignored() {
        let mut state = GlobalState::new();
        state.add_requests(ActorId(1), Vec::new());
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn cancel_twice_reports_unknown_actor() {
        let mut state = GlobalState::new();
        let actor = ActorId(3);
        state.add_requests(actor, [Item::new("a", "d", 1u64)]);

        assert_eq!(state.cancel(actor), Ok(()));
        assert_eq!(state.active_count(), 0);
        assert_eq!(state.cancel(actor), Err(LookupError::UnknownActor(actor)));
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn route_reports_finished_exactly_once() {
        let mut state = GlobalState::new();
        let actor = ActorId(1);
        state.add_requests(
            actor,
            [Item::new("a", "d", 1u64), Item::new("b", "d", 2u64)],
        );
        sorted(&mut state, actor);

        let first = state.route(actor, &key("a"));
        assert!(matches!(first, RouteOutcome::Matched { finished: false, .. }));
        assert_eq!(state.route(actor, &key("a")), RouteOutcome::NotFound);

        let second = state.route(actor, &key("b"));
        assert!(second.finished());
        assert!(!state.contains(actor));
        assert_eq!(state.route(actor, &key("b")), RouteOutcome::NotFound);
    }

    #[test]
    fn route_for_unknown_actor_is_not_found() {
        let mut state = GlobalState::new();
        assert_eq!(state.route(ActorId(9), &key("a")), RouteOutcome::NotFound);
    }

    #[test]
    fn into_parts_exposes_consumers() {
        let mut state = GlobalState::new();
        let actor = ActorId(1);
        state.add_requests(
            actor,
            [Item::new("a", "x", 1u64), Item::new("a", "y", 2u64)],
        );
        sorted(&mut state, actor);

        let (consumers, finished) = state.route(actor, &key("a")).into_parts();
        let consumers = consumers.expect("matched");
        assert!(finished);
        assert_eq!(consumers.len(), 2);
    }
}
