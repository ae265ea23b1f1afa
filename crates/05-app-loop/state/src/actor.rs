//! Sort / translate / wait machine for one actor.
//!
//! Each scheduling cycle grants an actor a number of steps. Sorting consumes
//! one queued item per step, translating issues one resolver call per step,
//! and a wait check ends the actor's turn for the cycle without spending
//! budget. Cursors live in the phase itself, so the next cycle resumes
//! exactly where this one stopped.

use crate::key::{self, TextKey};
use crate::types::{Item, PendingEntry, Phase};
use log::{debug, trace};
use lookup_abi::{ActorId, TextDescription};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Deduplicated pending entries in insertion order.
///
/// Removal leaves the key in `order`; stale keys are skipped by the cursor
/// and dropped whenever translation restarts from the front. A key that is
/// resolved and then requested again is re-appended, so only its last
/// position counts.
#[derive(Debug, Default, Clone)]
pub struct TranslateTable {
    entries: HashMap<TextKey, PendingEntry>,
    order: Vec<TextKey>,
}

impl TranslateTable {
    /// Number of entries still waiting on a result.
    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entry is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry for `key`.
    pub fn get(&self, key: &TextKey) -> Option<&PendingEntry> {
        self.entries.get(key)
    }

    /// Iterates pending entries in issue order.
    pub fn iter(&self) -> impl Iterator<Item = (&TextKey, &PendingEntry)> + '_ {
        let mut seen = HashSet::new();
        let mut live: Vec<_> = self
            .order
            .iter()
            .rev()
            .filter(|key| seen.insert(*key))
            .filter_map(|key| self.entries.get_key_value(key))
            .collect();
        live.reverse();
        live.into_iter()
    }

    /// Removes the entry for `key`, returning it if it was still pending.
    pub fn remove(&mut self, key: &TextKey) -> Option<PendingEntry> {
        self.entries.remove(key)
    }

    /// Merges `item` into the entry for `key`. Returns `true` if a new entry
    /// was created.
    fn merge(&mut self, key: TextKey, item: Item) -> bool {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.register(item.dictionary, item.consumer);
            return false;
        }
        self.order.push(key.clone());
        self.entries.insert(key, PendingEntry::from_item(item));
        true
    }

    fn next_from(&self, cursor: usize) -> Option<(usize, &PendingEntry)> {
        self.order
            .iter()
            .enumerate()
            .skip(cursor)
            .find_map(|(idx, key)| self.entries.get(key).map(|entry| (idx, entry)))
    }

    // Keeps the last position of each live key.
    fn compact(&mut self) {
        let entries = &self.entries;
        let mut seen = HashSet::new();
        let mut order: Vec<TextKey> = self
            .order
            .drain(..)
            .rev()
            .filter(|key| entries.contains_key(key) && seen.insert(key.clone()))
            .collect();
        order.reverse();
        self.order = order;
    }
}

#[derive(Debug, Clone)]
enum PhaseState {
    Sorting { queue: VecDeque<Item> },
    Translating { cursor: usize },
    Waiting { deadline: Option<u64> },
}

/// What one actor did during one cycle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepOutcome {
    /// Descriptions to hand to the resolver, in issue order.
    pub requests: SmallVec<[Arc<TextDescription>; 8]>,
    /// Budget consumed (items sorted plus calls issued).
    pub steps: usize,
    /// Whether the wait window expired and translation restarted.
    pub reissued: bool,
}

/// Lookup workflow state for one actor.
#[derive(Debug, Clone)]
pub struct ActorState {
    phase: PhaseState,
    table: TranslateTable,
}

impl ActorState {
    /// Creates a state in [`Phase::Sorting`] holding its own copy of `items`.
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            phase: PhaseState::Sorting {
                queue: items.into_iter().collect(),
            },
            table: TranslateTable::default(),
        }
    }

    /// Queues more items and restarts deduplication, whatever the phase.
    pub fn enqueue(&mut self, items: impl IntoIterator<Item = Item>) {
        match &mut self.phase {
            PhaseState::Sorting { queue } => queue.extend(items),
            _ => {
                self.phase = PhaseState::Sorting {
                    queue: items.into_iter().collect(),
                };
            }
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        match self.phase {
            PhaseState::Sorting { .. } => Phase::Sorting,
            PhaseState::Translating { .. } => Phase::Translating,
            PhaseState::Waiting { .. } => Phase::Waiting,
        }
    }

    /// Items still queued for sorting; zero outside [`Phase::Sorting`].
    pub fn queued(&self) -> usize {
        match &self.phase {
            PhaseState::Sorting { queue } => queue.len(),
            _ => 0,
        }
    }

    /// Cycle at which waiting gives up, once the wait has been observed.
    pub fn wait_deadline(&self) -> Option<u64> {
        match self.phase {
            PhaseState::Waiting { deadline } => deadline,
            _ => None,
        }
    }

    /// Pending entries.
    pub fn table(&self) -> &TranslateTable {
        &self.table
    }

    /// Number of entries still waiting on a result.
    pub fn pending_count(&self) -> usize {
        self.table.pending_count()
    }

    pub(crate) fn take_entry(&mut self, key: &TextKey) -> Option<PendingEntry> {
        self.table.remove(key)
    }

    /// Runs up to `iterations` steps for this actor at `cycle`.
    pub fn advance(
        &mut self,
        actor: ActorId,
        cycle: u64,
        iterations: usize,
        wait_cycles: u64,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        while outcome.steps < iterations {
            let mut next_phase = None;
            let mut end_turn = false;

            match &mut self.phase {
                PhaseState::Sorting { queue } => match queue.pop_front() {
                    Some(item) => {
                        let key = key::serialize(&item.description);
                        let created = self.table.merge(key, item);
                        trace!("{actor}: sorted item (new entry: {created})");
                        outcome.steps += 1;
                    }
                    None => {
                        self.table.compact();
                        debug!(
                            "{actor}: sorting done, {} pending entries",
                            self.table.pending_count()
                        );
                        next_phase = Some(PhaseState::Translating { cursor: 0 });
                    }
                },
                PhaseState::Translating { cursor } => match self.table.next_from(*cursor) {
                    Some((idx, entry)) => {
                        trace!("{actor}: issuing lookup #{idx}");
                        outcome.requests.push(Arc::clone(&entry.description));
                        *cursor = idx + 1;
                        outcome.steps += 1;
                    }
                    None => {
                        debug!("{actor}: all lookups issued, waiting");
                        next_phase = Some(PhaseState::Waiting { deadline: None });
                    }
                },
                PhaseState::Waiting { deadline } => {
                    match *deadline {
                        None => *deadline = Some(cycle.saturating_add(wait_cycles)),
                        Some(at) if cycle >= at => {
                            self.table.compact();
                            debug!(
                                "{actor}: wait expired at cycle {cycle}, re-issuing {} lookups",
                                self.table.pending_count()
                            );
                            next_phase = Some(PhaseState::Translating { cursor: 0 });
                            outcome.reissued = true;
                        }
                        Some(_) => {}
                    }
                    end_turn = true;
                }
            }

            if let Some(phase) = next_phase {
                self.phase = phase;
            }
            if end_turn {
                break;
            }
        }

        outcome
    }
}
