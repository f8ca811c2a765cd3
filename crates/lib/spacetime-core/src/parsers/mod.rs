//! Parsers for remote payloads.
//!
//! Each parser turns a raw response body into display text without failing on
//! partially malformed input.

pub mod logs;

pub use logs::{LogRecord, NO_LOGS, decode_log_records, format_log_records, format_logs};
