//! Identifier newtypes used across the lookup pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one independent consumer entity with its own lookup workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

impl From<u32> for ActorId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Caller-chosen handle identifying who asked for a given lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsumerId(pub u64);

impl From<u64> for ConsumerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Namespace tag grouping lookup results for downstream consumption.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DictionaryName(String);

impl DictionaryName {
    /// Creates a dictionary name from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DictionaryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DictionaryName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DictionaryName {
    fn from(value: String) -> Self {
        Self(value)
    }
}
