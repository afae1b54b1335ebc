//! Appender implementations

pub mod console;
pub mod file;
pub mod memory;

pub use console::{StreamAppender, StreamTarget};
pub use file::{FileAppender, FileMode};
pub use memory::MemoryAppender;

pub use crate::core::Appender;
