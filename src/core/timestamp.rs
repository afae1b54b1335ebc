//! Timestamp formatting utilities
//!
//! Formatters carry an optional timestamp pattern. A pattern is either one of
//! the named presets below or a strftime string, which is validated when the
//! formatter is registered so rendering can never fail mid-dispatch.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use rust_log_router::core::TimestampFormat;
///
/// let format = TimestampFormat::parse("%Y-%m-%d").unwrap();
/// assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
///
/// let preset = TimestampFormat::parse("rfc3339").unwrap();
/// assert_eq!(preset, TimestampFormat::Rfc3339);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Resolve a configured pattern into a format.
    ///
    /// Returns `None` when the pattern is a strftime string chrono rejects.
    pub fn parse(pattern: &str) -> Option<Self> {
        let preset = match pattern.to_ascii_lowercase().as_str() {
            "iso8601" => Some(TimestampFormat::Iso8601),
            "iso8601_micros" => Some(TimestampFormat::Iso8601Micros),
            "rfc3339" => Some(TimestampFormat::Rfc3339),
            "unix" => Some(TimestampFormat::Unix),
            "unix_millis" => Some(TimestampFormat::UnixMillis),
            "unix_micros" => Some(TimestampFormat::UnixMicros),
            _ => None,
        };
        if preset.is_some() {
            return preset;
        }

        let valid = !pattern.is_empty()
            && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
        valid.then(|| TimestampFormat::Custom(pattern.to_string()))
    }

    /// Format a `DateTime<Utc>` according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }
}
