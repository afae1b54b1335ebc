//! Serde model of the declarative logging configuration.
//!
//! ```text
//! version = 1
//!
//! [formatters.brief]
//! format = "%message%"
//!
//! [handlers.console]
//! class = "Stream"
//! formatter = "brief"
//! level = "DEBUG"
//! stream = "stdout"
//!
//! [loggers."ubii.framework"]
//! propagate = "no"
//! handlers = ["console"]
//!
//! [root]
//! handlers = ["console"]
//! ```
//!
//! Named sections are kept as ordered `(name, section)` lists instead of maps:
//! declaration order drives registration order, and a name declared twice
//! reaches the loader as two entries, where it becomes a duplicate-name error
//! instead of the parser silently keeping the last one.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type Entries<T> = Vec<(String, T)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub version: u32,

    /// Merge over the currently applied configuration instead of replacing it
    #[serde(default)]
    pub incremental: bool,

    #[serde(default, with = "entries")]
    pub formatters: Entries<FormatterSection>,

    #[serde(default, with = "entries")]
    pub handlers: Entries<HandlerSection>,

    #[serde(default, with = "entries")]
    pub loggers: Entries<LoggerSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RootSection>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            version: 1,
            incremental: false,
            formatters: Vec::new(),
            handlers: Vec::new(),
            loggers: Vec::new(),
            root: None,
        }
    }
}

impl LoggingConfig {
    /// Lay `overlay` over this configuration.
    ///
    /// Same-named entries are replaced in place, new entries are appended and
    /// an overlay `root` replaces the current one. The result is never
    /// incremental itself.
    #[must_use]
    pub fn merged(&self, overlay: &LoggingConfig) -> LoggingConfig {
        LoggingConfig {
            version: self.version,
            incremental: false,
            formatters: merge_entries(&self.formatters, &overlay.formatters),
            handlers: merge_entries(&self.handlers, &overlay.handlers),
            loggers: merge_entries(&self.loggers, &overlay.loggers),
            root: overlay.root.clone().or_else(|| self.root.clone()),
        }
    }
}

fn merge_entries<T: Clone>(base: &Entries<T>, overlay: &Entries<T>) -> Entries<T> {
    let mut merged = base.clone();
    for (name, section) in overlay {
        match merged.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = section.clone(),
            None => merged.push((name.clone(), section.clone())),
        }
    }
    merged
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatterSection {
    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datefmt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerSection {
    /// `Stream` or `File`; `StreamHandler` / `logging.FileHandler` also resolve
    pub class: String,

    pub formatter: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default)]
    pub colors: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerSection {
    #[serde(default = "default_true", deserialize_with = "yes_no")]
    pub propagate: bool,

    #[serde(default)]
    pub handlers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl Default for LoggerSection {
    fn default() -> Self {
        Self {
            propagate: true,
            handlers: Vec::new(),
            level: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootSection {
    #[serde(default)]
    pub handlers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Accept `true`/`false` as well as `yes`/`no` (any case)
fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Word(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Word(word) => match word.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" => Ok(true),
            "no" | "false" | "off" => Ok(false),
            _ => Err(serde::de::Error::custom(format!(
                "expected yes/no for propagate, got '{}'",
                word
            ))),
        },
    }
}

/// Map <-> ordered `(key, value)` list, keeping duplicate keys
mod entries {
    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, T>(entries: &[(String, T)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Vec<(String, T)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of named sections")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
