//! Error types for the log router

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A formatter, sink or logger name was registered twice
    #[error("Duplicate {kind} name '{name}'")]
    DuplicateName { kind: String, name: String },

    /// A sink references a formatter that does not exist
    #[error("Unknown formatter '{name}'")]
    UnknownFormatter { name: String },

    /// A logger references a sink that does not exist
    #[error("Unknown handler '{name}'")]
    UnknownSink { name: String },

    /// Severity name that does not parse
    #[error("Invalid level '{value}' for {component}")]
    InvalidLevel { component: String, value: String },

    /// Output template that does not compile
    #[error("Invalid template for formatter '{formatter}': {message}")]
    InvalidTemplate { formatter: String, message: String },

    /// strftime pattern chrono cannot render
    #[error("Invalid timestamp pattern '{pattern}' for formatter '{formatter}'")]
    InvalidTimestampPattern { formatter: String, pattern: String },

    /// Root logger registered without any handler
    #[error("Root logger requires at least one handler")]
    EmptyRoot,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Every problem found while loading a configuration
    #[error("Invalid logging configuration ({} problem(s)): {}", .0.len(), join_problems(.0))]
    Configuration(Vec<LoggerError>),

    /// A logger resolved to zero sinks
    #[error("Logger '{logger}' resolved to no handlers; record dropped")]
    NoSink { logger: String },

    /// A sink could not write a record
    #[error("Handler '{sink}' failed to write: {source}")]
    SinkWrite {
        sink: String,
        #[source]
        source: Box<LoggerError>,
    },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_problems(problems: &[LoggerError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        LoggerError::DuplicateName {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn unknown_formatter(name: impl Into<String>) -> Self {
        LoggerError::UnknownFormatter { name: name.into() }
    }

    pub fn unknown_sink(name: impl Into<String>) -> Self {
        LoggerError::UnknownSink { name: name.into() }
    }

    pub fn invalid_level(component: impl Into<String>, value: impl Into<String>) -> Self {
        LoggerError::InvalidLevel {
            component: component.into(),
            value: value.into(),
        }
    }

    pub fn invalid_template(formatter: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidTemplate {
            formatter: formatter.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Wrap a destination failure with the name of the sink it happened in
    pub fn sink_write(sink: impl Into<String>, source: LoggerError) -> Self {
        LoggerError::SinkWrite {
            sink: sink.into(),
            source: Box::new(source),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Problems carried by an aggregated configuration error, or the error itself
    pub fn problems(&self) -> Vec<&LoggerError> {
        match self {
            LoggerError::Configuration(problems) => problems.iter().collect(),
            other => vec![other],
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, LoggerError::Configuration(_))
    }
}
