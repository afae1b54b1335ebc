//! Stream appender implementation

use crate::core::{Appender, LogRecord, LoggerError, Result};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Standard stream a [`StreamAppender`] writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StreamTarget {
    Stdout,
    #[default]
    Stderr,
}

impl StreamTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamTarget::Stdout => "stdout",
            StreamTarget::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamTarget {
    type Err = String;

    // `ext://sys.stdout` is accepted so existing handler configs load unchanged.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let target = s.trim().to_ascii_lowercase();
        match target.strip_prefix("ext://sys.").unwrap_or(&target) {
            "stdout" => Ok(StreamTarget::Stdout),
            "stderr" => Ok(StreamTarget::Stderr),
            _ => Err(format!("Invalid stream target: '{}'", s)),
        }
    }
}

pub struct StreamAppender {
    target: StreamTarget,
    use_colors: bool,
    closed: bool,
}

impl StreamAppender {
    pub fn new(target: StreamTarget) -> Self {
        Self {
            target,
            use_colors: false,
            closed: false,
        }
    }

    pub fn stdout() -> Self {
        Self::new(StreamTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(StreamTarget::Stderr)
    }

    /// Color each line by record severity (requires the `console` feature)
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn target(&self) -> StreamTarget {
        self.target
    }

    #[cfg(feature = "console")]
    fn decorate(&self, record: &LogRecord, line: &str) -> String {
        use colored::Colorize;
        if self.use_colors {
            line.color(record.level.color_code()).to_string()
        } else {
            line.to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn decorate(&self, _record: &LogRecord, line: &str) -> String {
        line.to_string()
    }
}

impl Default for StreamAppender {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Appender for StreamAppender {
    fn append(&mut self, record: &LogRecord, line: &str) -> Result<()> {
        if self.closed {
            return Err(LoggerError::writer(format!("{} stream closed", self.target)));
        }

        let mut output = self.decorate(record, line);
        output.push('\n');

        // Hold the std lock for the whole line so other writers can't split it
        match self.target {
            StreamTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(output.as_bytes())?;
                out.flush()?;
            }
            StreamTarget::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(output.as_bytes())?;
                err.flush()?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.target {
            StreamTarget::Stdout => std::io::stdout().flush()?,
            StreamTarget::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.target.as_str()
    }

    fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_parse_targets() {
        assert_eq!("stdout".parse::<StreamTarget>(), Ok(StreamTarget::Stdout));
        assert_eq!("STDERR".parse::<StreamTarget>(), Ok(StreamTarget::Stderr));
        assert_eq!(
            "ext://sys.stdout".parse::<StreamTarget>(),
            Ok(StreamTarget::Stdout)
        );
        assert!("syslog".parse::<StreamTarget>().is_err());
    }

    #[test]
    fn test_write_after_close_fails() {
        let mut appender = StreamAppender::stderr();
        let record = LogRecord::new("app", LogLevel::Info, "bye");
        appender.close().unwrap();
        assert!(appender.append(&record, "bye").is_err());
    }

    #[test]
    fn test_default_targets_stderr() {
        assert_eq!(StreamAppender::default().target(), StreamTarget::Stderr);
        assert_eq!(StreamAppender::default().name(), "stderr");
    }
}
