/// Normalization boundary for push payloads. The backend raises notification
/// events from several code paths with inconsistent field casing, so every
/// payload is flattened here into the canonical [`Notification`] shape and
/// the rest of the crate never sees the aliases.
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::models::Notification;

/// Placeholder title for events that carry none.
pub const DEFAULT_TITLE: &str = "Notification";

const ID_ALIASES: [&str; 2] = ["id", "Id"];
const ACCOUNT_ALIASES: [&str; 4] = ["accountId", "accountID", "AccountId", "AccountID"];
const TITLE_ALIASES: [&str; 2] = ["title", "Title"];
const MESSAGE_ALIASES: [&str; 4] = ["message", "Message", "content", "Content"];
const CREATED_ALIASES: [&str; 4] = ["createdAt", "CreatedAt", "created_at", "Created_At"];

/// Converts one push payload into zero or more notification records.
///
/// Arrays are expanded recursively in element order. Objects become exactly
/// one record, absent fields replaced by typed defaults. Anything else is
/// dropped without error: a malformed event must never take the feed down.
pub fn normalize(raw: &Value) -> Vec<Notification> {
    match raw {
        Value::Array(items) => items.iter().flat_map(normalize).collect(),
        Value::Object(_) => vec![normalize_object(raw)],
        _ => Vec::new(),
    }
}

fn normalize_object(raw: &Value) -> Notification {
    Notification {
        id: first_present(raw, &ID_ALIASES)
            .map(stringify)
            .unwrap_or_else(synthetic_id),
        account_id: first_present(raw, &ACCOUNT_ALIASES)
            .and_then(integer_value)
            .unwrap_or(0),
        title: first_present(raw, &TITLE_ALIASES)
            .map(stringify)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        message: first_present(raw, &MESSAGE_ALIASES)
            .map(stringify)
            .unwrap_or_default(),
        created_at: first_present(raw, &CREATED_ALIASES)
            .map(stringify)
            .unwrap_or_else(receipt_time),
        is_read: false,
    }
}

/// First alias whose value is present and non-empty. Empty strings and the
/// number zero count as absent, so a hollow `id: ""` still gets a synthetic
/// id and `accountId: 0` defers to the next alias.
fn first_present<'a>(raw: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| raw.get(name))
        .find(|value| is_meaningful(value))
}

fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// String form of a field value: strings pass through unquoted, everything
/// else keeps its compact JSON spelling.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            let (sign, rest) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return None;
            }
            digits.parse::<i64>().ok().map(|v| sign * v)
        }
        _ => None,
    }
}

/// Synthetic id for events that arrive without one. Unique enough for an
/// in-memory feed: receipt milliseconds plus a random suffix.
fn synthetic_id() -> String {
    format!(
        "notif-{}-{}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}

fn receipt_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
