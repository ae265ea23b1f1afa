//! Mock collaborators for tests and the simulation driver.
//!
//! [`MockResolver`] answers every lookup by queueing a rendered result that
//! the scheduler drains on a later cycle. It can be told to lose results,
//! which is how the wait-and-retry path gets exercised.

#![deny(missing_docs)]

use log::trace;
use lookup_abi::{
    ActorId, ActorLifecycle, Resolved, Resolver, SubmitOutcome, TextDescription,
};
use lookup_hub::CollaboratorHub;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default result queue capacity for [`make_rig`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct Loss {
    every: Option<NonZeroUsize>,
    next: usize,
    seen: usize,
}

impl Loss {
    fn should_lose(&mut self) -> bool {
        self.seen = self.seen.wrapping_add(1);
        if self.next > 0 {
            self.next -= 1;
            return true;
        }
        self.every
            .is_some_and(|every| self.seen % every.get() == 0)
    }
}

/// Queue-backed resolver that renders descriptions locally.
#[derive(Debug)]
pub struct MockResolver {
    queue: Mutex<VecDeque<Resolved>>,
    issued: Mutex<Vec<(ActorId, TextDescription)>>,
    loss: Mutex<Loss>,
    capacity: usize,
    closed: Mutex<bool>,
}

impl MockResolver {
    /// Creates a resolver whose pending-result queue holds `capacity` results.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_QUEUE_CAPACITY))),
            issued: Mutex::new(Vec::new()),
            loss: Mutex::new(Loss::default()),
            capacity,
            closed: Mutex::new(false),
        }
    }

    /// Loses every `n`th accepted lookup from now on.
    pub fn lose_every(&self, n: Option<NonZeroUsize>) {
        self.loss.lock().every = n;
    }

    /// Loses the next `count` accepted lookups.
    pub fn lose_next(&self, count: usize) {
        self.loss.lock().next = count;
    }

    /// Makes every further submission return [`SubmitOutcome::Closed`].
    pub fn close(&self) {
        *self.closed.lock() = true;
    }

    /// Every lookup handed to the resolver so far, in issue order.
    pub fn issued(&self) -> Vec<(ActorId, TextDescription)> {
        self.issued.lock().clone()
    }

    /// Number of lookups handed to the resolver so far.
    pub fn issued_count(&self) -> usize {
        self.issued.lock().len()
    }

    /// Number of results waiting to be drained.
    pub fn queued_results(&self) -> usize {
        self.queue.lock().len()
    }
}

impl Resolver for MockResolver {
    fn try_resolve(&self, actor: ActorId, description: &TextDescription) -> SubmitOutcome {
        if *self.closed.lock() {
            return SubmitOutcome::Closed;
        }

        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            return SubmitOutcome::WouldBlock;
        }

        self.issued.lock().push((actor, description.clone()));
        if self.loss.lock().should_lose() {
            trace!("{actor}: mock resolver losing result");
            return SubmitOutcome::Accepted;
        }

        queue.push_back(Resolved {
            actor,
            description: description.to_value(),
            text: render(description),
            translated: true,
        });
        SubmitOutcome::Accepted
    }

    fn drain(&self, max: usize) -> SmallVec<[Resolved; 8]> {
        let mut queue = self.queue.lock();
        let limit = max.min(queue.len());
        queue.drain(..limit).collect()
    }
}

/// Joins every text leaf of `description` with single spaces.
pub fn render(description: &TextDescription) -> String {
    let mut words = Vec::new();
    let mut stack = vec![description];
    while let Some(node) = stack.pop() {
        match node {
            TextDescription::Text(text) => words.push(text.as_str()),
            TextDescription::Composed(parts) => stack.extend(parts.iter().rev()),
        }
    }
    words.join(" ")
}

/// Lifecycle source where every actor is connected until told otherwise.
#[derive(Debug, Default)]
pub struct MockLifecycle {
    disconnected: Mutex<HashSet<ActorId>>,
}

impl MockLifecycle {
    /// Creates a lifecycle with every actor connected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `actor` as disconnected.
    pub fn disconnect(&self, actor: ActorId) {
        self.disconnected.lock().insert(actor);
    }

    /// Marks `actor` as connected again.
    pub fn reconnect(&self, actor: ActorId) {
        self.disconnected.lock().remove(&actor);
    }
}

impl ActorLifecycle for MockLifecycle {
    fn is_connected(&self, actor: ActorId) -> bool {
        !self.disconnected.lock().contains(&actor)
    }
}

/// Hub plus direct handles to the mocks behind it.
#[derive(Debug, Clone)]
pub struct MockRig {
    /// Hub wired to the mocks below.
    pub hub: CollaboratorHub,
    /// The resolver behind `hub`.
    pub resolver: Arc<MockResolver>,
    /// The lifecycle source behind `hub`.
    pub lifecycle: Arc<MockLifecycle>,
}

/// Creates a rig with a lossless resolver and default capacity.
pub fn make_rig() -> MockRig {
    make_rig_with(DEFAULT_QUEUE_CAPACITY, None)
}

/// Creates a rig with a custom queue capacity and optional loss rate.
pub fn make_rig_with(capacity: usize, lose_every: Option<NonZeroUsize>) -> MockRig {
    let resolver = Arc::new(MockResolver::new(capacity));
    resolver.lose_every(lose_every);
    let lifecycle = Arc::new(MockLifecycle::new());

    let hub = CollaboratorHub::builder()
        .resolver(resolver.clone())
        .lifecycle(lifecycle.clone())
        .build()
        .expect("mock hub build");

    MockRig {
        hub,
        resolver,
        lifecycle,
    }
}
