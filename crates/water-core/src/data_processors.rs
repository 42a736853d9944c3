//! Field extractors for raw export entries.
//!
//! Each extractor is a plain `fn(&Value) -> Option<T>`; the priority chains
//! below are ordered slices of them applied first-match-wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

use crate::time_utils::datetime_to_epoch_seconds;

/// A single extraction rule.
pub type Extractor<T> = fn(&Value) -> Option<T>;

/// Apply `rules` in order and return the first hit.
pub fn first_match<T>(value: &Value, rules: &[Extractor<T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule(value))
}

/// Returns `true` when `s` holds nothing but whitespace.
fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Stringify a truthy scalar: a non-empty string, a non-zero number or `true`.
///
/// Empty strings, zero, `false`, null and containers yield `None`.
fn truthy_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

// ── TextExtractor ─────────────────────────────────────────────────────────────

/// Extracts the message text from a raw entry.
///
/// A rule that applies returns `Some`, possibly with empty text; that result
/// is final even when blank, so an entry whose `content.parts` are all empty
/// never falls through to a sibling field.
pub struct TextExtractor;

impl TextExtractor {
    const RULES: &'static [Extractor<String>] = &[
        Self::content_string,
        Self::content_parts,
        Self::content_text,
        Self::content_any_string,
        Self::message_field,
        Self::text_field,
        Self::body_field,
    ];

    const CONTENT_RULES: &'static [Extractor<String>] = &[
        Self::content_string,
        Self::content_parts,
        Self::content_text,
        Self::content_any_string,
    ];

    /// Run the full priority chain; returns an empty string when nothing applies.
    pub fn extract(entry: &Value) -> String {
        first_match(entry, Self::RULES).unwrap_or_default()
    }

    fn content_string(entry: &Value) -> Option<String> {
        match entry.get("content")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    fn content_parts(entry: &Value) -> Option<String> {
        let parts = entry.get("content")?.get("parts")?.as_array()?;
        let joined = parts
            .iter()
            .filter_map(Value::as_str)
            .filter(|part| !is_blank(part))
            .collect::<Vec<_>>()
            .join(" ");
        Some(joined)
    }

    fn content_text(entry: &Value) -> Option<String> {
        match entry.get("content")?.get("text")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    fn content_any_string(entry: &Value) -> Option<String> {
        let values: Vec<&Value> = match entry.get("content")? {
            Value::Object(map) => map.values().collect(),
            Value::Array(items) => items.iter().collect(),
            _ => return None,
        };
        let found = values
            .into_iter()
            .filter_map(Value::as_str)
            .find(|s| !is_blank(s))
            .map(str::to_string);
        Some(found.unwrap_or_default())
    }

    fn message_field(entry: &Value) -> Option<String> {
        let message = entry.get("message")?;
        match message {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(_) => match message.get("content")? {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => {
                    Some(first_match(message, Self::CONTENT_RULES).unwrap_or_default())
                }
                // Array contents stringify as their string elements joined by commas.
                Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(","),
                ),
                scalar => Some(truthy_scalar(scalar).unwrap_or_default()),
            },
            _ => None,
        }
    }

    fn text_field(entry: &Value) -> Option<String> {
        truthy_scalar(entry.get("text")?)
    }

    fn body_field(entry: &Value) -> Option<String> {
        truthy_scalar(entry.get("body")?)
    }


}

// ── RoleExtractor ─────────────────────────────────────────────────────────────

/// Extracts the author role: `author.role` → `role` → `sender` → `"user"`.
pub struct RoleExtractor;

impl RoleExtractor {
    pub const DEFAULT_ROLE: &'static str = "user";

    const RULES: &'static [Extractor<String>] =
        &[Self::author_role, Self::role_field, Self::sender_field];

    pub fn extract(entry: &Value) -> String {
        first_match(entry, Self::RULES).unwrap_or_else(|| Self::DEFAULT_ROLE.to_string())
    }

    fn author_role(entry: &Value) -> Option<String> {
        Self::non_empty(entry.get("author")?.get("role")?)
    }

    fn role_field(entry: &Value) -> Option<String> {
        Self::non_empty(entry.get("role")?)
    }

    fn sender_field(entry: &Value) -> Option<String> {
        Self::non_empty(entry.get("sender")?)
    }

    fn non_empty(value: &Value) -> Option<String> {
        value
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

// ── IdExtractor ───────────────────────────────────────────────────────────────

/// Extracts the source `id`, synthesising `"msg-<index>"` when it is absent
/// or falsy (empty string, zero, `false`, null) or not a scalar.
pub struct IdExtractor;

impl IdExtractor {
    pub fn extract(entry: &Value, index: usize) -> String {
        entry
            .get("id")
            .and_then(truthy_scalar)
            .unwrap_or_else(|| format!("msg-{}", index))
    }
}

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses timestamps from the variety of formats found in chat exports.
pub struct TimestampProcessor;

impl TimestampProcessor {
    const RULES: &'static [Extractor<f64>] =
        &[Self::create_time, Self::timestamp_field, Self::created_at];

    /// Epoch seconds from `create_time` → `timestamp` → `created_at`.
    ///
    /// Returns `None` when no candidate yields a usable instant; the caller
    /// substitutes the current time.
    pub fn extract(entry: &Value) -> Option<f64> {
        first_match(entry, Self::RULES)
    }

    fn create_time(entry: &Value) -> Option<f64> {
        Self::parse(entry.get("create_time")?)
    }

    fn timestamp_field(entry: &Value) -> Option<f64> {
        Self::parse(entry.get("timestamp")?)
    }

    fn created_at(entry: &Value) -> Option<f64> {
        Self::parse(entry.get("created_at")?)
    }

    /// Attempt to parse a [`serde_json::Value`] into epoch seconds.
    ///
    /// Handles:
    /// * JSON number  → Unix timestamp in seconds, taken as-is.
    /// * JSON string  → numeric string, ISO 8601 / RFC 3339 (including
    ///   `Z`-suffix), RFC 2822 or common date-time patterns.
    ///
    /// Zero, null and unparseable values yield `None`.
    pub fn parse(value: &Value) -> Option<f64> {
        let secs = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => Self::parse_str(s.trim())?,
            _ => return None,
        };
        if secs == 0.0 || crate::time_utils::epoch_seconds_to_datetime(secs).is_none() {
            return None;
        }
        Some(secs)
    }

    fn parse_str(s: &str) -> Option<f64> {
        if s.is_empty() {
            return None;
        }

        if let Ok(secs) = s.parse::<f64>() {
            return secs.is_finite().then_some(secs);
        }

        Self::parse_datetime(s).map(datetime_to_epoch_seconds)
    }

    /// Parse a calendar timestamp string into a UTC [`DateTime`].
    pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        // Replace trailing 'Z' with '+00:00' for RFC 3339 compatibility.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }

        // Naive patterns are interpreted as UTC.
        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y/%m/%d %H:%M:%S",
        ];

        for fmt in FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }

        debug!(
            "TimestampProcessor: could not parse timestamp string \"{}\"",
            s
        );
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
