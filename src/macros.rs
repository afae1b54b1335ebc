//! Logging macros for ergonomic log message formatting.
//!
//! These macros format their arguments like `format!` and hand the result to
//! [`Engine::log`](crate::Engine::log) under the given logger name. The
//! message is only formatted when the logger is enabled for the level.
//!
//! # Examples
//!
//! ```
//! use rust_log_router::prelude::*;
//! use rust_log_router::info;
//!
//! let engine = Engine::builder().build().unwrap();
//!
//! // Basic logging
//! info!(engine, "server", "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(engine, "server.http", "Listening on port {}", port);
//! ```

/// Log a message under a logger name with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let engine = Engine::builder().build().unwrap();
/// use rust_log_router::log;
/// log!(engine, "app", LogLevel::Info, "Simple message");
/// log!(engine, "app.db", LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($engine:expr, $name:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        let name: &str = $name;
        if $engine.is_enabled_for(name, level) {
            $engine.log(name, level, format!($($arg)+));
        }
    }};
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let engine = Engine::builder().build().unwrap();
/// use rust_log_router::debug;
/// debug!(engine, "app", "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($engine:expr, $name:expr, $($arg:tt)+) => {
        $crate::log!($engine, $name, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let engine = Engine::builder().build().unwrap();
/// use rust_log_router::info;
/// info!(engine, "app", "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($engine:expr, $name:expr, $($arg:tt)+) => {
        $crate::log!($engine, $name, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let engine = Engine::builder().build().unwrap();
/// use rust_log_router::warning;
/// warning!(engine, "app", "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($engine:expr, $name:expr, $($arg:tt)+) => {
        $crate::log!($engine, $name, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let engine = Engine::builder().build().unwrap();
/// use rust_log_router::error;
/// error!(engine, "app.db", "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($engine:expr, $name:expr, $($arg:tt)+) => {
        $crate::log!($engine, $name, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let engine = Engine::builder().build().unwrap();
/// use rust_log_router::critical;
/// critical!(engine, "app", "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($engine:expr, $name:expr, $($arg:tt)+) => {
        $crate::log!($engine, $name, $crate::LogLevel::Critical, $($arg)+)
    };
}
