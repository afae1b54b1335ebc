//! Configuration loading: text → [`LoggingConfig`] → [`Engine`].

use super::schema::{HandlerSection, LoggingConfig};
use crate::appenders::{FileMode, StreamTarget};
use crate::core::{Destination, Engine, EngineBuilder, LogLevel, LoggerError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Only configuration schema version understood by the loader
pub const SUPPORTED_VERSION: u32 = 1;

/// Serialization of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Handler classes the loader can build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerClass {
    Stream,
    File,
}

impl HandlerClass {
    /// Resolve `Stream`, `StreamHandler`, `logging.StreamHandler`, ... (any case)
    pub fn resolve(class: &str) -> Option<Self> {
        let short = class.rsplit('.').next().unwrap_or(class).to_ascii_lowercase();
        match short.strip_suffix("handler").unwrap_or(&short) {
            "stream" => Some(HandlerClass::Stream),
            "file" => Some(HandlerClass::File),
            _ => None,
        }
    }
}

pub fn parse_str(text: &str, format: ConfigFormat) -> Result<LoggingConfig> {
    let parsed = match format {
        ConfigFormat::Json => serde_json::from_str(text).map_err(LoggerError::from),
        ConfigFormat::Toml => toml::from_str(text).map_err(LoggerError::from),
    };
    parsed.map_err(|e| LoggerError::Configuration(vec![e]))
}

pub fn read_config(path: &Path) -> Result<LoggingConfig> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        LoggerError::config(
            "config file",
            format!("cannot tell format of '{}' (expected .json or .toml)", path.display()),
        )
    })?;
    let text = fs::read_to_string(path).map_err(|e| {
        LoggerError::io_operation("reading logging config", path.display().to_string(), e)
    })?;
    parse_str(&text, format)
}

/// Build an engine from a configuration, failing on the first load with every problem found.
///
/// # Example
/// ```
/// use rust_log_router::config::{load, parse_str, ConfigFormat};
///
/// let config = parse_str(
///     r#"{
///         "version": 1,
///         "formatters": {"brief": {"format": "%message%"}},
///         "handlers": {"console": {"class": "Stream", "formatter": "brief", "stream": "stdout"}},
///         "root": {"handlers": ["console"]}
///     }"#,
///     ConfigFormat::Json,
/// )
/// .unwrap();
///
/// let engine = load(&config).unwrap();
/// assert_eq!(engine.effective_sinks("any.name").len(), 1);
/// ```
pub fn load(config: &LoggingConfig) -> Result<Engine> {
    builder(config).build()
}

pub fn load_str(text: &str, format: ConfigFormat) -> Result<Engine> {
    load(&parse_str(text, format)?)
}

pub fn load_path(path: &Path) -> Result<Engine> {
    load(&read_config(path)?)
}

/// Translate a configuration into builder calls, in registration order:
/// formatters, handlers, loggers, root.
///
/// Problems are recorded on the returned builder, so callers may still add
/// their own sinks or fallback before calling `build`.
pub fn builder(config: &LoggingConfig) -> EngineBuilder {
    let mut builder = Engine::builder();

    if config.version != SUPPORTED_VERSION {
        builder = builder.problem(LoggerError::config(
            "version",
            format!(
                "unsupported configuration version {} (expected {})",
                config.version, SUPPORTED_VERSION
            ),
        ));
    }
    if config.incremental {
        builder = builder.problem(LoggerError::config(
            "incremental",
            "an incremental configuration must be merged over a base before loading",
        ));
    }

    for (name, section) in &config.formatters {
        builder = builder.formatter(name, &section.format, section.datefmt.as_deref());
    }

    // Handlers that failed their own checks are left out of logger lists so
    // each mistake is reported once
    let mut rejected: HashSet<&str> = HashSet::new();
    for (name, section) in &config.handlers {
        match handler_destination(name, section) {
            Ok((level, destination)) => {
                builder = builder.sink(name, &section.formatter, level, destination);
            }
            Err(problems) => {
                rejected.insert(name.as_str());
                for problem in problems {
                    builder = builder.problem(problem);
                }
            }
        }
    }

    let usable = |handlers: &[String]| -> Vec<String> {
        handlers
            .iter()
            .filter(|h| !rejected.contains(h.as_str()))
            .cloned()
            .collect()
    };

    for (name, section) in &config.loggers {
        builder = builder.logger(name, usable(&section.handlers), section.propagate);
        if let Some(ref level) = section.level {
            builder = match parse_level(&format!("logger '{}'", name), level) {
                Ok(level) => builder.level(name, level),
                Err(e) => builder.problem(e),
            };
        }
    }

    if let Some(ref root) = config.root {
        let handlers = usable(&root.handlers);
        // Keep the emptiness check honest when every root handler was rejected
        if handlers.is_empty() && !root.handlers.is_empty() {
            builder = builder.problem(LoggerError::config(
                "root",
                "no usable handler left after rejecting invalid handlers",
            ));
        } else {
            builder = builder.root(handlers);
        }
        if let Some(ref level) = root.level {
            builder = match parse_level("root", level) {
                Ok(level) => builder.level("", level),
                Err(e) => builder.problem(e),
            };
        }
    }

    builder
}

fn parse_level(component: &str, value: &str) -> Result<LogLevel> {
    value
        .parse()
        .map_err(|_| LoggerError::invalid_level(component, value))
}

fn handler_destination(
    name: &str,
    section: &HandlerSection,
) -> std::result::Result<(LogLevel, Destination), Vec<LoggerError>> {
    let component = format!("handler '{}'", name);
    let mut problems = Vec::new();

    let level = match section.level.as_deref() {
        Some(value) => parse_level(&component, value).map_err(|e| problems.push(e)).ok(),
        None => Some(LogLevel::Debug),
    };

    let destination = match HandlerClass::resolve(&section.class) {
        Some(HandlerClass::Stream) => {
            let target = match section.stream.as_deref() {
                Some(stream) => stream
                    .parse::<StreamTarget>()
                    .map_err(|e| problems.push(LoggerError::config(&component, e)))
                    .ok(),
                None => Some(StreamTarget::default()),
            };
            target.map(|target| Destination::Stream {
                target,
                colors: section.colors,
            })
        }
        Some(HandlerClass::File) => {
            let mode = match section.mode.as_deref() {
                Some(mode) => mode
                    .parse::<FileMode>()
                    .map_err(|e| problems.push(LoggerError::config(&component, e)))
                    .ok(),
                None => Some(FileMode::default()),
            };
            if section.filename.is_none() {
                problems.push(LoggerError::config(&component, "file handler requires 'filename'"));
            }
            match (section.filename.as_ref(), mode) {
                (Some(path), Some(mode)) => Some(Destination::file(path, mode)),
                _ => None,
            }
        }
        None => {
            problems.push(LoggerError::config(
                &component,
                format!("unknown handler class '{}' (expected Stream or File)", section.class),
            ));
            None
        }
    };

    match (level, destination) {
        (Some(level), Some(destination)) if problems.is_empty() => Ok((level, destination)),
        _ => Err(problems),
    }
}
