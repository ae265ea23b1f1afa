//! Request and pending-entry shapes shared by the actor machine and routing.

use lookup_abi::{ConsumerId, DictionaryName, TextDescription};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Phase of one actor's lookup workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Deduplicating newly enqueued items into the pending table.
    Sorting,
    /// Issuing one resolver call per pending entry.
    Translating,
    /// Letting results arrive before re-issuing what is still pending.
    Waiting,
}

/// One lookup request from a consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    /// Text to resolve.
    pub description: TextDescription,
    /// Dictionary the consumer files the result under.
    pub dictionary: DictionaryName,
    /// Who asked.
    pub consumer: ConsumerId,
}

impl Item {
    /// Creates a request for `description` on behalf of `consumer`.
    pub fn new(
        description: impl Into<TextDescription>,
        dictionary: impl Into<DictionaryName>,
        consumer: impl Into<ConsumerId>,
    ) -> Self {
        Self {
            description: description.into(),
            dictionary: dictionary.into(),
            consumer: consumer.into(),
        }
    }
}

/// Consumers waiting on one entry, grouped by dictionary in request order.
pub type Consumers = BTreeMap<DictionaryName, Vec<ConsumerId>>;

/// One deduplicated resolver request and everyone waiting on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEntry {
    /// Description handed to the resolver, shared with every issued request.
    pub description: Arc<TextDescription>,
    /// Consumers to notify once the result arrives.
    pub consumers: Consumers,
}

impl PendingEntry {
    pub(crate) fn from_item(item: Item) -> Self {
        let mut consumers = Consumers::new();
        consumers.insert(item.dictionary, vec![item.consumer]);
        Self {
            description: Arc::new(item.description),
            consumers,
        }
    }

    pub(crate) fn register(&mut self, dictionary: DictionaryName, consumer: ConsumerId) {
        self.consumers.entry(dictionary).or_default().push(consumer);
    }

    /// Iterates `(dictionary, consumer)` pairs in dictionary then request order.
    pub fn pairs(&self) -> impl Iterator<Item = (&DictionaryName, ConsumerId)> + '_ {
        self.consumers
            .iter()
            .flat_map(|(dictionary, ids)| ids.iter().map(move |id| (dictionary, *id)))
    }
}
