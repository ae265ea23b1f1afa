//! Cycle scheduler and result router for deduplicated, budgeted lookups.
//!
//! A [`Scheduler`] is driven by two kinds of events: one
//! [`Scheduler::iterate_batch`] call per host cycle, and one
//! [`Scheduler::process_result`] call per resolver result. Everything runs on
//! the caller's thread; state carries over between events through the
//! cursors kept in each actor's phase.

#![deny(missing_docs)]

mod stats;

use log::{debug, warn};
use lookup_hub::CollaboratorHub;
use lookup_state::key;
use std::sync::Arc;

pub use crate::stats::SchedulerStats;
pub use lookup_hub::DEFAULT_RESULT_BUDGET;
pub use lookup_state::{
    ActorId, Consumers, ConsumerId, DictionaryName, GlobalState, Item, LookupError, LookupResult,
    PendingEntry, Phase, RouteOutcome, SchedulerConfig, TextDescription, TextKey,
};

/// One resolved text addressed to one consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// Actor the lookup belonged to.
    pub actor: ActorId,
    /// Dictionary the consumer filed the request under.
    pub dictionary: DictionaryName,
    /// Consumer that asked.
    pub consumer: ConsumerId,
    /// Description that was resolved.
    pub description: Arc<TextDescription>,
    /// Resolved display string, shared by every consumer of the entry.
    pub text: Arc<str>,
    /// Whether the resolver produced a real result.
    pub translated: bool,
}

/// Results routed by one [`Scheduler::pump_results`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pumped {
    /// One delivery per waiting `(dictionary, consumer)` pair.
    pub deliveries: Vec<Delivery>,
    /// Actors whose workflow completed during the pump.
    pub finished: Vec<ActorId>,
}

/// Owns the lookup registry and drives it against the collaborators.
pub struct Scheduler {
    state: GlobalState,
    hub: CollaboratorHub,
    config: SchedulerConfig,
    stats: SchedulerStats,
}

impl Scheduler {
    /// Establishes an empty registry after validating `config`.
    pub fn init(config: SchedulerConfig, hub: CollaboratorHub) -> LookupResult<Self> {
        config.validate()?;
        Ok(Self {
            state: GlobalState::new(),
            hub,
            config,
            stats: SchedulerStats::default(),
        })
    }

    /// Creates a scheduler with the default budget and wait window.
    pub fn new(hub: CollaboratorHub) -> Self {
        Self {
            state: GlobalState::new(),
            hub,
            config: SchedulerConfig::default(),
            stats: SchedulerStats::default(),
        }
    }

    /// Drops every actor and zeroes the counters.
    pub fn reset(&mut self) {
        self.state.clear();
        self.stats = SchedulerStats::default();
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Counters accumulated since init or the last reset.
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Read-only view of the registry.
    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    /// Canonical deduplication key for `description`.
    pub fn serialize(description: &TextDescription) -> TextKey {
        key::serialize(description)
    }

    /// Number of actors with lookups in flight.
    pub fn active_count(&self) -> usize {
        self.state.active_count()
    }

    /// Returns `true` while `actor` has lookups in flight.
    pub fn is_translating(&self, actor: ActorId) -> bool {
        self.state.contains(actor)
    }

    /// Current phase of `actor`, if it has state.
    pub fn phase(&self, actor: ActorId) -> Option<Phase> {
        self.state.actor(actor).map(|state| state.phase())
    }

    /// Entries still awaiting a result for `actor`, if it has state.
    pub fn pending_count(&self, actor: ActorId) -> Option<usize> {
        self.state.actor(actor).map(|state| state.pending_count())
    }

    /// Queues lookups for `actor`; new work always restarts deduplication.
    ///
    /// An empty batch for an actor without state creates nothing, so
    /// [`Scheduler::is_translating`] stays `false` for it.
    pub fn add_requests(&mut self, actor: ActorId, items: impl IntoIterator<Item = Item>) {
        self.state.add_requests(actor, items);
    }

    /// Drops all state for `actor`. Unknown actors are a logged no-op.
    pub fn cancel(&mut self, actor: ActorId) -> LookupResult<()> {
        self.state.cancel(actor)
    }

    /// Advances every active actor by its share of the cycle budget.
    pub fn iterate_batch(&mut self, cycle: u64) {
        let active = self.state.active_count();
        if active == 0 {
            return;
        }
        SchedulerStats::bump(&mut self.stats.busy_cycles);
        let iterations = self.config.iterations_per_actor(active);

        for actor in self.state.actor_ids() {
            if !self.hub.is_connected(actor) {
                debug!("{actor}: disconnected, cancelling lookups");
                if self.state.cancel(actor).is_ok() {
                    SchedulerStats::bump(&mut self.stats.disconnect_cancels);
                }
                continue;
            }

            let Some(actor_state) = self.state.actor_mut(actor) else {
                continue;
            };
            let outcome = actor_state.advance(actor, cycle, iterations, self.config.wait_cycles);
            if outcome.reissued {
                SchedulerStats::bump(&mut self.stats.reissue_windows);
            }

            for description in &outcome.requests {
                let submitted = self.hub.try_resolve(actor, description);
                self.stats.record_submit(submitted);
                if !submitted.is_accepted() {
                    debug!("{actor}: resolver refused lookup ({submitted:?}), retrying after wait");
                }
            }
        }
    }

    /// Routes one resolver result for `actor`.
    ///
    /// Returns [`RouteOutcome::NotFound`] for unknown actors and for stale or
    /// duplicate results.
    pub fn process_result(&mut self, actor: ActorId, description: &TextDescription) -> RouteOutcome {
        if self.state.active_count() == 0 {
            SchedulerStats::bump(&mut self.stats.stale_results);
            return RouteOutcome::NotFound;
        }
        let key = key::serialize(description);
        self.route(actor, &key)
    }

    /// Routes one resolver result given in its raw JSON shape.
    ///
    /// Like [`Scheduler::process_result`], an idle scheduler reports
    /// [`RouteOutcome::NotFound`] without reading the value.
    pub fn process_raw_result(
        &mut self,
        actor: ActorId,
        description: &serde_json::Value,
    ) -> LookupResult<RouteOutcome> {
        if self.state.active_count() == 0 {
            SchedulerStats::bump(&mut self.stats.stale_results);
            return Ok(RouteOutcome::NotFound);
        }
        let key = key::serialize_value(description)?;
        Ok(self.route(actor, &key))
    }

    fn route(&mut self, actor: ActorId, key: &TextKey) -> RouteOutcome {
        let outcome = self.state.route(actor, key);
        match &outcome {
            RouteOutcome::NotFound => SchedulerStats::bump(&mut self.stats.stale_results),
            RouteOutcome::Matched { finished: true, .. } => {
                SchedulerStats::bump(&mut self.stats.finished_actors)
            }
            RouteOutcome::Matched { .. } => {}
        }
        outcome
    }

    /// Drains up to `budget` resolver results and routes each one.
    pub fn pump_results(&mut self, budget: usize) -> Pumped {
        let mut pumped = Pumped::default();

        for resolved in self.hub.drain_results(budget) {
            let actor = resolved.actor;
            match self.process_raw_result(actor, &resolved.description) {
                Ok(RouteOutcome::Matched { entry, finished }) => {
                    let text: Arc<str> = Arc::from(resolved.text);
                    pumped
                        .deliveries
                        .extend(entry.pairs().map(|(dictionary, consumer)| Delivery {
                            actor,
                            dictionary: dictionary.clone(),
                            consumer,
                            description: Arc::clone(&entry.description),
                            text: Arc::clone(&text),
                            translated: resolved.translated,
                        }));
                    if finished {
                        pumped.finished.push(actor);
                    }
                }
                Ok(RouteOutcome::NotFound) => {}
                Err(err) => {
                    warn!("{actor}: dropping unreadable resolver result: {err}");
                    SchedulerStats::bump(&mut self.stats.invalid_results);
                }
            }
        }

        pumped
    }

    /// Runs one full cycle: advance every actor, then route pending results.
    pub fn run_cycle(&mut self, cycle: u64, result_budget: usize) -> Pumped {
        self.iterate_batch(cycle);
        self.pump_results(result_budget)
    }
}
