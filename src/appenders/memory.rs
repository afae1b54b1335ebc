//! In-memory appender
//!
//! Collects formatted lines in a shared buffer. Clones share the buffer, so
//! one clone can be handed to a sink while another is kept to read back what
//! was written.

use crate::core::{Appender, LogRecord, LoggerError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryAppender {
    lines: Arc<Mutex<Vec<String>>>,
    closed: bool,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, _record: &LogRecord, line: &str) -> Result<()> {
        if self.closed {
            return Err(LoggerError::writer("memory buffer closed"));
        }
        self.lines.lock().push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_clones_share_buffer() {
        let reader = MemoryAppender::new();
        let mut writer = reader.clone();
        let record = LogRecord::new("app", LogLevel::Info, "x");

        writer.append(&record, "first").unwrap();
        writer.append(&record, "second").unwrap();

        assert_eq!(reader.lines(), vec!["first", "second"]);
        reader.clear();
        assert!(reader.is_empty());
    }
}
