//! Canonical deduplication keys for text descriptions.
//!
//! Keys are length-prefixed so that no two distinct descriptions can produce
//! the same string:
//!
//! * `Text(s)` encodes as `s<byte_len>:<s>`
//! * `Composed(parts)` encodes as `l<count>[` followed by each part and `]`
//!
//! Keys are only ever compared, never parsed back. Both the encoder and the
//! JSON conversion walk the input with an explicit stack, so nesting depth is
//! bounded by memory rather than by the call stack.

use crate::error::{LookupError, LookupResult};
use lookup_abi::TextDescription;
use serde_json::Value;
use std::fmt;

/// Canonical string form of a [`TextDescription`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextKey(String);

impl TextKey {
    /// Returns the encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

enum Frame<'a> {
    Node(&'a TextDescription),
    Close,
}

/// Serializes `description` into its canonical key.
pub fn serialize(description: &TextDescription) -> TextKey {
    let mut out = String::new();
    let mut stack = vec![Frame::Node(description)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Close => out.push(']'),
            Frame::Node(TextDescription::Text(text)) => {
                out.push('s');
                out.push_str(&text.len().to_string());
                out.push(':');
                out.push_str(text);
            }
            Frame::Node(TextDescription::Composed(parts)) => {
                out.push('l');
                out.push_str(&parts.len().to_string());
                out.push('[');
                stack.push(Frame::Close);
                stack.extend(parts.iter().rev().map(Frame::Node));
            }
        }
    }

    TextKey(out)
}

/// Converts a raw resolver value into a [`TextDescription`].
///
/// Strings become text, arrays become compositions, and numbers or booleans
/// become text holding their JSON rendering. `null` and objects are rejected.
pub fn description_from_value(value: &Value) -> LookupResult<TextDescription> {
    let mut open: Vec<(std::slice::Iter<'_, Value>, Vec<TextDescription>)> = Vec::new();
    let mut next = Some(value);

    loop {
        let mut done = match next.take() {
            Some(Value::Array(items)) => {
                open.push((items.iter(), Vec::with_capacity(items.len())));
                None
            }
            Some(atom) => Some(atom_from_value(atom)?),
            None => None,
        };

        // Attach finished nodes to their parent until a parent has more input.
        loop {
            let Some((items, parts)) = open.last_mut() else {
                return done.ok_or_else(|| LookupError::invalid_description("empty input"));
            };
            if let Some(node) = done.take() {
                parts.push(node);
            }
            if let Some(item) = items.next() {
                next = Some(item);
                break;
            }
            if let Some((_, parts)) = open.pop() {
                done = Some(TextDescription::Composed(parts));
            }
        }
    }
}

fn atom_from_value(value: &Value) -> LookupResult<TextDescription> {
    match value {
        Value::String(text) => Ok(TextDescription::Text(text.clone())),
        Value::Number(number) => Ok(TextDescription::Text(number.to_string())),
        Value::Bool(flag) => Ok(TextDescription::Text(flag.to_string())),
        Value::Null => Err(LookupError::invalid_description("null is not text")),
        Value::Object(_) => Err(LookupError::invalid_description(
            "objects are not text descriptions",
        )),
        Value::Array(_) => Err(LookupError::invalid_description("unexpected array")),
    }
}

/// Converts and serializes a raw resolver value in one step.
pub fn serialize_value(value: &Value) -> LookupResult<TextKey> {
    description_from_value(value).map(|description| serialize(&description))
}
