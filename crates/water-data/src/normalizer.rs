//! Conversation normaliser.
//!
//! Turns export text of unknown shape into a [`ParsedConversation`]: locates
//! the message collection, normalises every entry into a
//! [`CanonicalMessage`], drops entries without text and computes the date
//! range.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;
use water_core::data_processors::{IdExtractor, RoleExtractor, TextExtractor, TimestampProcessor};
use water_core::error::{ImpactError, Result};
use water_core::models::{CanonicalMessage, DateRange, ParsedConversation};
use water_core::time_utils::{datetime_to_epoch_seconds, epoch_seconds_to_datetime};

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse and normalise raw export text.
///
/// Fails with [`ImpactError::InvalidJson`] on a syntax error,
/// [`ImpactError::InvalidStructure`] on a scalar root,
/// [`ImpactError::NoMessagesFound`] when no (non-empty) collection is found
/// and [`ImpactError::NoValidContent`] when every entry lacks text.
pub fn normalize_conversations(raw_text: &str) -> Result<ParsedConversation> {
    let text = raw_text.strip_prefix('\u{feff}').unwrap_or(raw_text);
    let root: Value = serde_json::from_str(text)?;

    match &root {
        Value::Object(_) | Value::Array(_) => {}
        other => return Err(ImpactError::InvalidStructure(json_type_name(other))),
    }

    log_structure(&root);

    let raw_messages = locate_messages(&root)?;
    if raw_messages.is_empty() {
        return Err(ImpactError::NoMessagesFound);
    }

    let now = datetime_to_epoch_seconds(Utc::now());
    let messages: Vec<CanonicalMessage> = raw_messages
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_entry(entry, index, now))
        .filter(|msg| !msg.text.trim().is_empty())
        .collect();

    debug!(
        "Normalised {} of {} raw entries ({} dropped without text)",
        messages.len(),
        raw_messages.len(),
        raw_messages.len() - messages.len()
    );

    let date_range = compute_date_range(&messages).ok_or(ImpactError::NoValidContent)?;

    Ok(ParsedConversation {
        total_messages: messages.len(),
        messages,
        date_range,
    })
}

/// Locate the raw message collection inside `root`.
///
/// Strategies, first match wins: root array (flattening conversation
/// containers), `messages` array, `data` array, `mapping` object, first
/// array-valued property.
pub fn locate_messages(root: &Value) -> Result<Vec<&Value>> {
    match root {
        Value::Array(items) => {
            if items.iter().any(is_conversation_container) {
                debug!(
                    "Root array holds {} conversation containers; flattening mappings",
                    items.len()
                );
                Ok(flatten_conversations(items))
            } else {
                debug!("Using root array as message list");
                Ok(items.iter().collect())
            }
        }
        Value::Object(obj) => locate_in_object(obj),
        other => Err(ImpactError::InvalidStructure(json_type_name(other))),
    }
}

/// Normalise one raw entry. `index` is its position in the raw list and
/// `now` the fallback timestamp.
pub fn normalize_entry(entry: &Value, index: usize, now: f64) -> CanonicalMessage {
    CanonicalMessage {
        id: IdExtractor::extract(entry, index),
        role: RoleExtractor::extract(entry),
        text: TextExtractor::extract(entry),
        timestamp_seconds: TimestampProcessor::extract(entry).unwrap_or(now),
    }
}

/// Earliest and latest message instants; `None` for an empty slice.
pub fn compute_date_range(messages: &[CanonicalMessage]) -> Option<DateRange> {
    let first = messages.first()?.timestamp_seconds;
    let (min, max) = messages
        .iter()
        .map(|m| m.timestamp_seconds)
        .fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts)));

    Some(DateRange {
        start: epoch_seconds_to_datetime(min).unwrap_or_default(),
        end: epoch_seconds_to_datetime(max).unwrap_or_default(),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Object-root strategies: `messages`, `data`, `mapping`, first array value.
fn locate_in_object(obj: &Map<String, Value>) -> Result<Vec<&Value>> {
    if let Some(Value::Array(items)) = obj.get("messages") {
        debug!("Using `messages` array ({} entries)", items.len());
        return Ok(items.iter().collect());
    }

    if let Some(Value::Array(items)) = obj.get("data") {
        debug!("Using `data` array ({} entries)", items.len());
        return Ok(items.iter().collect());
    }

    if let Some(Value::Object(mapping)) = obj.get("mapping") {
        let messages = mapping_messages(mapping);
        debug!(
            "Using `mapping` object ({} nodes, {} with messages)",
            mapping.len(),
            messages.len()
        );
        return Ok(messages);
    }

    if let Some((key, items)) = obj
        .iter()
        .find_map(|(key, value)| value.as_array().map(|items| (key, items)))
    {
        debug!(
            "Falling back to first array property `{}` ({} entries)",
            key,
            items.len()
        );
        return Ok(items.iter().collect());
    }

    Err(ImpactError::NoMessagesFound)
}

/// The non-null `message` values of a mapping's nodes, in enumeration order.
fn mapping_messages(mapping: &Map<String, Value>) -> Vec<&Value> {
    mapping
        .values()
        .filter_map(|node| node.get("message"))
        .filter(|message| !message.is_null())
        .collect()
}

/// `true` for an object carrying its own `mapping` object.
fn is_conversation_container(value: &Value) -> bool {
    matches!(value.get("mapping"), Some(Value::Object(_)))
}

/// Expand every conversation container into its mapping messages; any other
/// element is kept as a bare message.
fn flatten_conversations(items: &[Value]) -> Vec<&Value> {
    items
        .iter()
        .flat_map(|item| match item.get("mapping") {
            Some(Value::Object(mapping)) => mapping_messages(mapping),
            _ => vec![item],
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn log_structure(root: &Value) {
    match root {
        Value::Array(items) => debug!("File structure detected: root array of {}", items.len()),
        Value::Object(obj) => {
            let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            debug!(
                "File structure detected: object with keys {:?} (messages: {}, data: {}, mapping: {})",
                keys,
                obj.contains_key("messages"),
                obj.contains_key("data"),
                obj.contains_key("mapping"),
            );
        }
        _ => {}
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
