//! Declarative configuration.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader::read_config (parse & deserialize)
//!     → LoggingConfig (ordered named sections)
//!     → loader::builder (formatters → handlers → loggers → root)
//!     → EngineBuilder::build (all problems, or a complete Engine)
//! ```
//!
//! Syntax errors come from serde; dangling references, duplicate names and
//! malformed values are found while registering and reported together.

pub mod loader;
pub mod schema;

pub use loader::{
    builder, load, load_path, load_str, parse_str, read_config, ConfigFormat, HandlerClass,
    SUPPORTED_VERSION,
};
pub use schema::{
    Entries, FormatterSection, HandlerSection, LoggerSection, LoggingConfig, RootSection,
};
