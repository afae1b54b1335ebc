//! Core routing types and traits

pub mod appender;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod hierarchy;
pub mod log_level;
pub mod log_record;
pub mod metrics;
pub mod sink;
pub mod timestamp;

pub use appender::Appender;
pub use engine::{
    Engine, EngineBuilder, Logger, DEFAULT_SINK_NAME, DEFAULT_TEMPLATE, MAX_CACHED_ROUTES,
};
pub use error::{LoggerError, Result};
pub use formatter::{Formatter, FormatterRegistry};
pub use hierarchy::{LoggerHierarchy, LoggerNode, DEFAULT_ROOT_LEVEL};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use metrics::DispatchMetrics;
pub use sink::{Destination, Sink, SinkRegistry};
pub use timestamp::TimestampFormat;
