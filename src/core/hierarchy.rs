//! Dot-path logger hierarchy
//!
//! Parents are never stored. A node's parent is the longest registered
//! proper dot-prefix of its name (`a.b` for `a.b.c`, never `a.bc`), or the
//! root when no prefix is registered. Since the name map is frozen after
//! load, the graph cannot contain cycles.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::sink::Sink;
use std::collections::HashMap;
use std::sync::Arc;

/// Level the root starts with, so an unconfigured hierarchy filters nothing
pub const DEFAULT_ROOT_LEVEL: LogLevel = LogLevel::Debug;

#[derive(Debug, Clone)]
pub struct LoggerNode {
    name: String,
    sinks: Vec<Arc<Sink>>,
    propagate: bool,
    level: Option<LogLevel>,
}

impl LoggerNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sinks: Vec::new(),
            propagate: true,
            level: None,
        }
    }

    #[must_use]
    pub fn with_sinks(mut self, sinks: Vec<Arc<Sink>>) -> Self {
        self.sinks = sinks;
        self
    }

    #[must_use]
    pub fn with_propagate(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self {
        self.level = level;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sinks(&self) -> &[Arc<Sink>] {
        &self.sinks
    }

    pub fn propagate(&self) -> bool {
        self.propagate
    }

    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }
}

#[derive(Debug)]
pub struct LoggerHierarchy {
    nodes: HashMap<String, LoggerNode>,
    root: LoggerNode,
}

impl LoggerHierarchy {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            root: LoggerNode::new("")
                .with_propagate(false)
                .with_level(Some(DEFAULT_ROOT_LEVEL)),
        }
    }

    pub fn register(&mut self, node: LoggerNode) -> Result<()> {
        if node.name.is_empty() {
            return Err(LoggerError::config(
                "logger",
                "logger name must be non-empty (use the root section for the root logger)",
            ));
        }
        if self.nodes.contains_key(&node.name) {
            return Err(LoggerError::duplicate("logger", &node.name));
        }
        self.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    pub fn register_root(&mut self, sinks: Vec<Arc<Sink>>) -> Result<()> {
        if sinks.is_empty() {
            return Err(LoggerError::EmptyRoot);
        }
        self.root.sinks = sinks;
        Ok(())
    }

    pub fn set_root_level(&mut self, level: LogLevel) {
        self.root.level = Some(level);
    }

    /// Set the threshold on `name`, registering a sink-less node if needed.
    pub fn set_level(&mut self, name: &str, level: LogLevel) {
        if name.is_empty() {
            self.set_root_level(level);
            return;
        }
        self.nodes
            .entry(name.to_string())
            .or_insert_with(|| LoggerNode::new(name))
            .level = Some(level);
    }

    pub fn root(&self) -> &LoggerNode {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&LoggerNode> {
        if name.is_empty() {
            Some(&self.root)
        } else {
            self.nodes.get(name)
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Logical parent of `name`: the longest registered proper dot-prefix, else root.
    pub fn parent(&self, name: &str) -> &LoggerNode {
        let mut prefix = name;
        while let Some(dot) = prefix.rfind('.') {
            prefix = &prefix[..dot];
            if let Some(node) = self.nodes.get(prefix) {
                return node;
            }
        }
        &self.root
    }

    /// Sinks a record emitted on `name` reaches, in discovery order, each at most once.
    pub fn effective_sinks(&self, name: &str) -> Vec<Arc<Sink>> {
        let mut found = Vec::new();

        if name.is_empty() {
            collect_unique(&mut found, &self.root.sinks);
            return found;
        }

        // An unregistered name behaves as a sink-less, propagating leaf
        let mut current = match self.nodes.get(name) {
            Some(node) => {
                collect_unique(&mut found, &node.sinks);
                if !node.propagate {
                    return found;
                }
                node.name.as_str()
            }
            None => name,
        };

        loop {
            let parent = self.parent(current);
            collect_unique(&mut found, &parent.sinks);
            if parent.name.is_empty() || !parent.propagate {
                break;
            }
            current = parent.name.as_str();
        }

        found
    }

    /// First explicit level from `name` upward; propagation flags don't apply.
    pub fn effective_level(&self, name: &str) -> LogLevel {
        let mut current = name;
        if let Some(level) = self.get(current).and_then(LoggerNode::level) {
            return level;
        }
        while !current.is_empty() {
            let parent = self.parent(current);
            if let Some(level) = parent.level {
                return level;
            }
            current = parent.name.as_str();
        }
        self.root.level.unwrap_or(DEFAULT_ROOT_LEVEL)
    }
}

fn collect_unique(found: &mut Vec<Arc<Sink>>, sinks: &[Arc<Sink>]) {
    for sink in sinks {
        if !found.iter().any(|seen| Arc::ptr_eq(seen, sink)) {
            found.push(Arc::clone(sink));
        }
    }
}

impl Default for LoggerHierarchy {
    fn default() -> Self {
        Self::new()
    }
}
