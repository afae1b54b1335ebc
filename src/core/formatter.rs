//! Named output templates
//!
//! A template is plain text with `%field%` placeholders:
//!
//! | placeholder   | rendered as                                   |
//! |---------------|-----------------------------------------------|
//! | `%message%`   | the record message                            |
//! | `%level%`     | `DEBUG`, `INFO`, `WARNING`, `ERROR`, ...      |
//! | `%name%`      | the logger name the record was emitted on     |
//! | `%timestamp%` | record time, or nothing without a pattern     |
//! | `%thread%`    | thread name, falling back to the thread id    |
//!
//! `%%` produces a literal percent sign. Templates are compiled once, at
//! registration, so a typo fails the configuration load rather than the
//! first log call.

use super::error::{LoggerError, Result};
use super::log_record::LogRecord;
use super::timestamp::TimestampFormat;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Message,
    Level,
    Name,
    Timestamp,
    Thread,
}

impl Field {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "message" => Some(Field::Message),
            "level" => Some(Field::Level),
            "name" => Some(Field::Name),
            "timestamp" => Some(Field::Timestamp),
            "thread" => Some(Field::Thread),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

fn compile(formatter: &str, template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('%') {
            literal.push('%');
            rest = tail;
            continue;
        }

        let end = after.find('%').ok_or_else(|| {
            LoggerError::invalid_template(formatter, format!("unterminated placeholder in '{}'", template))
        })?;
        let key = &after[..end];
        let field = Field::lookup(key).ok_or_else(|| {
            LoggerError::invalid_template(formatter, format!("unknown placeholder '%{}%'", key))
        })?;

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Field(field));
        rest = &after[end + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// An immutable, compiled output template.
#[derive(Debug, Clone)]
pub struct Formatter {
    name: String,
    template: String,
    timestamp: Option<TimestampFormat>,
    segments: Vec<Segment>,
}

impl Formatter {
    /// Compile `template`, resolving `timestamp_pattern` into a [`TimestampFormat`].
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        timestamp_pattern: Option<&str>,
    ) -> Result<Self> {
        let name = name.into();
        let template = template.into();
        let segments = compile(&name, &template)?;
        let timestamp = match timestamp_pattern {
            Some(pattern) => Some(TimestampFormat::parse(pattern).ok_or_else(|| {
                LoggerError::InvalidTimestampPattern {
                    formatter: name.clone(),
                    pattern: pattern.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            name,
            template,
            timestamp,
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn timestamp_format(&self) -> Option<&TimestampFormat> {
        self.timestamp.as_ref()
    }

    /// Render a record into one output line (without the trailing newline).
    pub fn format(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(self.template.len() + record.message.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Message) => out.push_str(&record.message),
                Segment::Field(Field::Level) => out.push_str(record.level.to_str()),
                Segment::Field(Field::Name) => out.push_str(&record.logger_name),
                Segment::Field(Field::Thread) => out.push_str(record.thread()),
                Segment::Field(Field::Timestamp) => {
                    if let Some(ref format) = self.timestamp {
                        out.push_str(&format.format(&record.timestamp));
                    }
                }
            }
        }
        out
    }
}

/// Formatters by name.
#[derive(Debug, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Arc<Formatter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        template: &str,
        timestamp_pattern: Option<&str>,
    ) -> Result<Arc<Formatter>> {
        if self.formatters.contains_key(name) {
            return Err(LoggerError::duplicate("formatter", name));
        }
        let formatter = Arc::new(Formatter::new(name, template, timestamp_pattern)?);
        self.formatters
            .insert(name.to_string(), Arc::clone(&formatter));
        Ok(formatter)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Formatter>> {
        self.formatters
            .get(name)
            .cloned()
            .ok_or_else(|| LoggerError::unknown_formatter(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use chrono::{TimeZone, Utc};

    fn record() -> LogRecord {
        LogRecord::new("ubii.framework", LogLevel::Warning, "topic lost")
            .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap())
    }

    #[test]
    fn test_message_only() {
        let formatter = Formatter::new("brief", "%message%", None).unwrap();
        assert_eq!(formatter.format(&record()), "topic lost");
    }

    #[test]
    fn test_all_fields() {
        let formatter = Formatter::new(
            "detailed",
            "%timestamp% [%level%] %name%: %message%",
            Some("%H:%M:%S"),
        )
        .unwrap();
        assert_eq!(
            formatter.format(&record()),
            "10:30:45 [WARNING] ubii.framework: topic lost"
        );
    }

    #[test]
    fn test_timestamp_omitted_without_pattern() {
        let formatter = Formatter::new("plain", "%timestamp%|%message%", None).unwrap();
        assert_eq!(formatter.format(&record()), "|topic lost");
    }

    #[test]
    fn test_literal_percent() {
        let formatter = Formatter::new("pct", "100%% %message%%%", None).unwrap();
        assert_eq!(formatter.format(&record()), "100% topic lost%");
    }

    #[test]
    fn test_adjacent_placeholders() {
        let formatter = Formatter::new("tight", "%level%%message%", None).unwrap();
        assert_eq!(formatter.format(&record()), "WARNINGtopic lost");
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let err = Formatter::new("bad", "%msg%", None).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_unterminated_placeholder_rejected() {
        let err = Formatter::new("bad", "50% done", None).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_invalid_timestamp_pattern_rejected() {
        let err = Formatter::new("bad", "%message%", Some("%Y-%")).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidTimestampPattern { .. }));
    }

    #[test]
    fn test_registry_duplicate_and_unknown() {
        let mut registry = FormatterRegistry::new();
        registry.register("brief", "%message%", None).unwrap();

        let err = registry.register("brief", "%level%", None).unwrap_err();
        assert!(matches!(err, LoggerError::DuplicateName { .. }));
        assert_eq!(registry.resolve("brief").unwrap().template(), "%message%");

        let err = registry.resolve("missing").unwrap_err();
        assert!(matches!(err, LoggerError::UnknownFormatter { .. }));
        assert_eq!(registry.len(), 1);
    }
}
