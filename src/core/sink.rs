//! Named output destinations
//!
//! A [`Sink`] couples a formatter, a severity threshold and an appender. Each
//! sink serializes its own writes, so concurrent records routed to the same
//! sink never interleave while unrelated sinks never wait on each other.

use super::appender::Appender;
use super::error::{LoggerError, Result};
use super::formatter::{Formatter, FormatterRegistry};
use super::log_level::LogLevel;
use super::log_record::LogRecord;
use crate::appenders::{FileAppender, FileMode, StreamAppender, StreamTarget};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a configured sink writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stream { target: StreamTarget, colors: bool },
    File { path: PathBuf, mode: FileMode },
}

impl Destination {
    pub fn stream(target: StreamTarget) -> Self {
        Destination::Stream {
            target,
            colors: false,
        }
    }

    pub fn file(path: impl Into<PathBuf>, mode: FileMode) -> Self {
        Destination::File {
            path: path.into(),
            mode,
        }
    }

    /// Appender for this destination; nothing is touched on disk yet
    fn appender(&self) -> Box<dyn Appender> {
        match self {
            Destination::Stream { target, colors } => {
                Box::new(StreamAppender::new(*target).with_colors(*colors))
            }
            Destination::File { path, mode } => Box::new(FileAppender::new(path.clone(), *mode)),
        }
    }
}

pub struct Sink {
    name: String,
    formatter: Arc<Formatter>,
    min_level: LogLevel,
    destination: Option<Destination>,
    appender: Mutex<Box<dyn Appender>>,
}

impl Sink {
    pub fn new(
        name: impl Into<String>,
        formatter: Arc<Formatter>,
        min_level: LogLevel,
        appender: Box<dyn Appender>,
    ) -> Self {
        Self {
            name: name.into(),
            formatter,
            min_level,
            destination: None,
            appender: Mutex::new(appender),
        }
    }

    pub fn with_destination(
        name: impl Into<String>,
        formatter: Arc<Formatter>,
        min_level: LogLevel,
        destination: Destination,
    ) -> Self {
        let appender = destination.appender();
        let mut sink = Self::new(name, formatter, min_level, appender);
        sink.destination = Some(destination);
        sink
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// `None` for sinks built around a caller-supplied appender
    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn accepts(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Format and write one record.
    ///
    /// Returns `Ok(false)` when the record is below the sink threshold. A
    /// successful write has been flushed to the destination.
    pub fn emit(&self, record: &LogRecord) -> Result<bool> {
        if !self.accepts(record.level) {
            return Ok(false);
        }

        let line = self.formatter.format(record);
        let mut appender = self.appender.lock();
        appender
            .append(record, &line)
            .and_then(|()| appender.flush())
            .map_err(|e| LoggerError::sink_write(&self.name, e))?;
        Ok(true)
    }

    /// Prepare the destination for writing (truncate-mode files are emptied here)
    pub fn open(&self) -> Result<()> {
        self.appender
            .lock()
            .open()
            .map_err(|e| LoggerError::sink_write(&self.name, e))
    }

    pub fn flush(&self) -> Result<()> {
        self.appender
            .lock()
            .flush()
            .map_err(|e| LoggerError::sink_write(&self.name, e))
    }

    pub fn close(&self) -> Result<()> {
        self.appender
            .lock()
            .close()
            .map_err(|e| LoggerError::sink_write(&self.name, e))
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("formatter", &self.formatter.name())
            .field("min_level", &self.min_level)
            .field("destination", &self.destination)
            .finish()
    }
}

/// Sinks by name. Formatter references are resolved at registration.
#[derive(Debug, Default)]
pub struct SinkRegistry {
    sinks: HashMap<String, Arc<Sink>>,
    order: Vec<String>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        formatter_name: &str,
        min_level: LogLevel,
        destination: Destination,
        formatters: &FormatterRegistry,
    ) -> Result<Arc<Sink>> {
        self.ensure_free(name)?;
        let formatter = formatters.resolve(formatter_name)?;
        let sink = Sink::with_destination(name, formatter, min_level, destination);
        Ok(self.insert(sink))
    }

    /// Register a sink that writes through a caller-supplied appender
    pub fn register_appender(
        &mut self,
        name: &str,
        formatter_name: &str,
        min_level: LogLevel,
        appender: Box<dyn Appender>,
        formatters: &FormatterRegistry,
    ) -> Result<Arc<Sink>> {
        self.ensure_free(name)?;
        let formatter = formatters.resolve(formatter_name)?;
        Ok(self.insert(Sink::new(name, formatter, min_level, appender)))
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Sink>> {
        self.sinks
            .get(name)
            .cloned()
            .ok_or_else(|| LoggerError::unknown_sink(name))
    }

    /// Sinks in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Sink>> {
        self.order.iter().filter_map(|name| self.sinks.get(name))
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn ensure_free(&self, name: &str) -> Result<()> {
        if self.sinks.contains_key(name) {
            return Err(LoggerError::duplicate("handler", name));
        }
        Ok(())
    }

    fn insert(&mut self, sink: Sink) -> Arc<Sink> {
        let sink = Arc::new(sink);
        self.order.push(sink.name().to_string());
        self.sinks.insert(sink.name().to_string(), Arc::clone(&sink));
        sink
    }
}
