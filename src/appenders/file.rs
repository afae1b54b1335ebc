//! File appender implementation

use crate::core::{Appender, LogRecord, LoggerError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How a file destination treats existing content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Empty the file once, when the appender is opened
    Truncate,
    #[default]
    Append,
}

impl FromStr for FileMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "write" | "truncate" => Ok(FileMode::Truncate),
            "a" | "append" => Ok(FileMode::Append),
            _ => Err(format!("Invalid file mode: '{}'", s)),
        }
    }
}

/// Appends lines to a file, opening it on the first write.
///
/// Creating the appender touches nothing on disk. A truncate-mode file is
/// emptied by [`Appender::open`] (or the first write, whichever comes
/// first) and only once, so later lazy opens keep what was written.
pub struct FileAppender {
    path: PathBuf,
    mode: FileMode,
    writer: Option<BufWriter<File>>,
    pending_truncate: bool,
    closed: bool,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>, mode: FileMode) -> Self {
        Self {
            path: path.into(),
            mode,
            writer: None,
            pending_truncate: mode == FileMode::Truncate,
            closed: false,
        }
    }

    fn truncate_if_pending(&mut self) -> Result<()> {
        if !self.pending_truncate {
            return Ok(());
        }
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::io_operation("truncating log file", self.path.display().to_string(), e)
            })?;
        self.pending_truncate = false;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Whether the file handle has been acquired yet
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        if self.closed {
            return Err(LoggerError::writer(format!(
                "file '{}' already closed",
                self.path.display()
            )));
        }

        if self.writer.is_none() {
            self.truncate_if_pending()?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|e| {
                    LoggerError::io_operation("opening log file", self.path.display().to_string(), e)
                })?;
            self.writer = Some(BufWriter::new(file));
        }

        self.writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))
    }
}

impl Appender for FileAppender {
    fn open(&mut self) -> Result<()> {
        self.truncate_if_pending()
    }

    fn append(&mut self, _record: &LogRecord, line: &str) -> Result<()> {
        let writer = self.writer()?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
