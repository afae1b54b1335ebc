//! # Rust Log Router
//!
//! Structured log routing: named, dot-separated loggers forward records
//! through a hierarchy to named sinks, each of which formats and writes
//! them to a stream or a file.
//!
//! ## Features
//!
//! - **Hierarchical Routing**: `a.b.c` inherits the sinks of `a.b`, `a` and
//!   root until a logger stops propagation
//! - **Template Formatters**: `%timestamp% %level% %name% %message% %thread%`
//!   placeholders with preset or strftime timestamps
//! - **Declarative Configuration**: JSON or TOML documents, validated as a
//!   whole with every problem reported at once
//! - **Layered Setup**: temporary configuration and verbosity overrides that
//!   swap the running engine atomically
//!
//! ## Example
//!
//! ```
//! use rust_log_router::prelude::*;
//!
//! let memory = MemoryAppender::new();
//! let engine = Engine::builder()
//!     .formatter("brief", "%name%: %message%", None)
//!     .appender_sink("memory", "brief", LogLevel::Info, memory.clone())
//!     .root(["memory"])
//!     .build()
//!     .unwrap();
//!
//! engine.logger("app").child("db").info("connected");
//! assert_eq!(memory.lines(), vec!["app.db: connected"]);
//! ```

pub mod appenders;
pub mod config;
pub mod core;
pub mod macros;
pub mod setup;

pub mod prelude {
    pub use crate::appenders::{
        FileAppender, FileMode, MemoryAppender, StreamAppender, StreamTarget,
    };
    pub use crate::config::{ConfigFormat, LoggingConfig};
    pub use crate::core::{
        Appender, Destination, DispatchMetrics, Engine, EngineBuilder, Formatter,
        FormatterRegistry, LogLevel, LogRecord, Logger, LoggerError, LoggerHierarchy, LoggerNode,
        Result, Sink, SinkRegistry, TimestampFormat, DEFAULT_SINK_NAME, DEFAULT_TEMPLATE,
    };
    pub use crate::setup::{LoggingSetup, ScopedOverride};
}

pub use appenders::{FileAppender, FileMode, MemoryAppender, StreamAppender, StreamTarget};
pub use config::{ConfigFormat, LoggingConfig};
pub use core::{
    Appender, Destination, DispatchMetrics, Engine, EngineBuilder, Formatter, FormatterRegistry,
    LogLevel, LogRecord, Logger, LoggerError, LoggerHierarchy, LoggerNode, Result, Sink,
    SinkRegistry, TimestampFormat, DEFAULT_SINK_NAME, DEFAULT_TEMPLATE,
};
pub use setup::{LoggingSetup, ScopedOverride};
