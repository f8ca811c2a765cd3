//! Tolerant decoder for module log payloads.
//!
//! The log endpoint answers with newline-delimited JSON, but a single object or
//! a JSON array of entries is accepted too. Lines that fail to parse are
//! dropped instead of failing the batch.

use chrono::{DateTime, SecondsFormat};
use serde::Deserialize;
use serde_json::{Number, Value};

/// Rendered in place of an empty log listing.
pub const NO_LOGS: &str = "No logs available";

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_TARGET: &str = "unknown";
const UNKNOWN_TIME: &str = "unknown";

#[derive(Debug, Deserialize)]
struct RawLogEntry {
    #[serde(default)]
    ts: Option<Value>,
    #[serde(default)]
    level: Option<Value>,
    #[serde(default)]
    target: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
}

/// One decoded log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogRecord {
    /// Decodes an entry object, returning `None` for anything else.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let entry = RawLogEntry::deserialize(value).ok()?;
        Some(Self {
            timestamp: entry
                .ts
                .as_ref()
                .map_or_else(|| UNKNOWN_TIME.to_string(), format_timestamp),
            level: field_text(entry.level).unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            target: field_text(entry.target).unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            message: field_text(entry.message).unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "[{}] {:<5} {} - {}",
            self.timestamp,
            self.level.to_uppercase(),
            self.target,
            self.message
        )
    }
}

/// Decodes every well-formed entry in a log payload, in input order.
#[must_use]
pub fn decode_log_records(body: &str) -> Vec<LogRecord> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(entries)) => entries.iter().filter_map(LogRecord::from_value).collect(),
        Ok(entry @ Value::Object(_)) => LogRecord::from_value(&entry).into_iter().collect(),
        Ok(Value::String(inner)) => decode_log_records(&inner),
        _ => trimmed
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
            .filter_map(|entry| LogRecord::from_value(&entry))
            .collect(),
    }
}

#[must_use]
pub fn format_log_records(records: &[LogRecord]) -> String {
    if records.is_empty() {
        return NO_LOGS.to_string();
    }
    records
        .iter()
        .map(LogRecord::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes and renders a log payload.
#[must_use]
pub fn format_logs(body: &str) -> String {
    format_log_records(&decode_log_records(body))
}

/// Strings verbatim, other JSON scalars and structures as their JSON text.
fn field_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn timestamp_micros(number: &Number) -> Option<i64> {
    if let Some(micros) = number.as_i64() {
        return Some(micros);
    }
    let micros = number.as_f64().filter(|value| value.is_finite())?;
    Some(micros.round() as i64)
}

fn format_timestamp(ts: &Value) -> String {
    match ts {
        Value::Number(number) => timestamp_micros(number)
            .and_then(DateTime::from_timestamp_micros)
            .map_or_else(
                || number.to_string(),
                |time| time.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ndjson_and_skips_malformed_lines() {
        let body = concat!(
            r#"{"level":"Info","ts":1700000000000000,"target":"chat","message":"first"}"#,
            "\n",
            "{not json\n",
            "\n",
            r#"{"level":"Error","ts":1700000000123000,"target":"chat::send","message":"second"}"#,
            "\n",
            "42\n",
        );
        let output = format_logs(body);
        assert_eq!(
            output,
            "[2023-11-14T22:13:20.000Z] INFO  chat - first\n\
             [2023-11-14T22:13:20.123Z] ERROR chat::send - second"
        );
    }

    #[test]
    fn accepts_arrays_and_single_objects() {
        let array = r#"[{"level":"warn","ts":0,"target":"a","message":"x"}, 5]"#;
        assert_eq!(
            format_logs(array),
            "[1970-01-01T00:00:00.000Z] WARN  a - x"
        );

        let single = r#"{"level":"Debug","ts":"yesterday","message":"y"}"#;
        assert_eq!(format_logs(single), "[yesterday] DEBUG unknown - y");
    }

    #[test]
    fn non_string_fields_and_float_timestamps_are_kept() {
        let body = concat!(
            r#"{"level":"info","ts":1700000000000000,"target":"a","message":42}"#,
            "\n",
            r#"{"level":"info","ts":1.7e15,"target":"a","message":"f"}"#,
            "\n",
            r#"{"level":null,"ts":1700000000000000,"target":7,"message":{"k":true}}"#,
        );
        assert_eq!(
            format_logs(body),
            "[2023-11-14T22:13:20.000Z] INFO  a - 42\n\
             [2023-11-14T22:13:20.000Z] INFO  a - f\n\
             [2023-11-14T22:13:20.000Z] INFO  7 - {\"k\":true}"
        );
    }

    #[test]
    fn empty_or_garbage_payloads_have_no_logs() {
        assert_eq!(format_logs(""), NO_LOGS);
        assert_eq!(format_logs("   \n  "), NO_LOGS);
        assert_eq!(format_logs("garbage\nmore garbage"), NO_LOGS);
        assert_eq!(format_logs("[]"), NO_LOGS);
    }

    #[test]
    fn long_levels_are_not_truncated() {
        let record = LogRecord {
            timestamp: "t".to_string(),
            level: "panic".to_string(),
            target: "m".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(record.render(), "[t] PANIC m - boom");
        let record = LogRecord {
            level: "trace_extra".to_string(),
            ..record
        };
        assert_eq!(record.render(), "[t] TRACE_EXTRA m - boom");
    }
}
