//! Appender trait for log output destinations

use super::{error::Result, log_record::LogRecord};

/// The write side of a sink.
///
/// Sinks format the record and hand the finished line to their appender; the
/// appender only has to put the bytes somewhere. `record` is passed along for
/// destinations that style output by level.
pub trait Appender: Send + Sync {
    fn append(&mut self, record: &LogRecord, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;

    /// Prepare the destination once the engine that owns it is committed.
    ///
    /// Called by [`EngineBuilder::build`](crate::core::EngineBuilder::build)
    /// only after the whole configuration validated, so anything destructive
    /// (such as truncating a file) belongs here rather than in a constructor.
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the underlying resource. Writes after close are errors.
    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}
