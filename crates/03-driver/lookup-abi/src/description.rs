//! Structured description of a piece of display text.

use serde::{Deserialize, Serialize};

/// Text to be resolved: either an atomic string or an ordered composition of
/// nested descriptions (a template key followed by its parameters, for
/// example).
///
/// Serialized untagged, so JSON strings map to [`TextDescription::Text`] and
/// JSON arrays map to [`TextDescription::Composed`].
///
/// Dropping is iterative, so arbitrarily deep values can be released.
/// `Clone`, equality and hashing still recurse; the lookup pipeline shares
/// descriptions behind an `Arc` instead of cloning them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextDescription {
    /// Atomic string.
    Text(String),
    /// Ordered sequence of nested descriptions.
    Composed(Vec<TextDescription>),
}

impl TextDescription {
    /// Creates an atomic description.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates a composed description from its parts.
    pub fn composed(parts: impl IntoIterator<Item = TextDescription>) -> Self {
        Self::Composed(parts.into_iter().collect())
    }

    /// Returns `true` for text and for compositions without parts.
    fn is_leaf(&self) -> bool {
        match self {
            Self::Text(_) => true,
            Self::Composed(parts) => parts.is_empty(),
        }
    }

    /// Returns the JSON shape the resolver reports descriptions in.
    ///
    /// Recurses once per nesting level.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Composed(parts) => {
                serde_json::Value::Array(parts.iter().map(Self::to_value).collect())
            }
        }
    }
}

impl Drop for TextDescription {
    fn drop(&mut self) {
        let Self::Composed(parts) = self else {
            return;
        };
        if parts.iter().all(|part| part.is_leaf()) {
            return;
        }

        // Detach children before each node drops, keeping drop depth at one.
        let mut stack = std::mem::take(parts);
        while let Some(mut node) = stack.pop() {
            if let Self::Composed(children) = &mut node {
                stack.append(children);
            }
        }
    }
}

impl From<&str> for TextDescription {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for TextDescription {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
