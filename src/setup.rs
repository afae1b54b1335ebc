//! Layered logging setup with atomic engine swaps.
//!
//! [`LoggingSetup`] keeps a stack of applied configurations. The bottom layer
//! is the base the setup was created with; [`LoggingSetup::change`] pushes a
//! layer, [`LoggingSetup::scoped`] pushes one for the lifetime of a guard and
//! [`LoggingSetup::reset`] drops back to the base.
//!
//! Every layer change builds a complete new [`Engine`] first and only swaps it
//! in once it loaded cleanly. Destinations are opened only after validation,
//! so a bad configuration leaves the running one and its files untouched.
//! Threads that already hold the previous engine finish their calls on it;
//! its sinks close when the last reference goes away.

use crate::config::{self, LoggingConfig};
use crate::core::{Engine, LogLevel, LoggerError, Result};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Layer {
    config: LoggingConfig,
    verbosity: LogLevel,
}

impl Layer {
    /// Build the engine for this layer; the verbosity overrides any root level
    fn build(&self) -> Result<Engine> {
        config::builder(&self.config)
            .level("", self.verbosity)
            .build()
    }
}

pub struct LoggingSetup {
    layers: Mutex<Vec<Layer>>,
    engine: ArcSwap<Engine>,
}

impl LoggingSetup {
    pub fn new(base: LoggingConfig, verbosity: LogLevel) -> Result<Self> {
        let base = Layer {
            config: base,
            verbosity,
        };
        let engine = base.build()?;
        Ok(Self {
            layers: Mutex::new(vec![base]),
            engine: ArcSwap::from_pointee(engine),
        })
    }

    /// The engine of the top layer
    pub fn engine(&self) -> Arc<Engine> {
        self.engine.load_full()
    }

    pub fn effective_config(&self) -> LoggingConfig {
        self.top().config
    }

    pub fn verbosity(&self) -> LogLevel {
        self.top().verbosity
    }

    /// Number of layers above the base
    pub fn depth(&self) -> usize {
        self.layers.lock().len() - 1
    }

    /// Push a layer with a new configuration and/or verbosity.
    ///
    /// Missing parts are taken from the current layer. An incremental
    /// configuration is merged over the current one.
    pub fn change(
        &self,
        config: Option<LoggingConfig>,
        verbosity: Option<LogLevel>,
    ) -> Result<()> {
        if config.is_none() && verbosity.is_none() {
            return Err(LoggerError::config(
                "logging setup",
                "change needs a configuration, a verbosity, or both",
            ));
        }

        let mut layers = self.layers.lock();
        let current = layers.last().cloned().ok_or_else(|| {
            LoggerError::other("logging setup has no base layer")
        })?;

        let config = match config {
            Some(config) if config.incremental => current.config.merged(&config),
            Some(config) => config,
            None => current.config,
        };
        let layer = Layer {
            config,
            verbosity: verbosity.unwrap_or(current.verbosity),
        };

        let engine = layer.build()?;
        layers.push(layer);
        self.engine.store(Arc::new(engine));
        Ok(())
    }

    /// Like [`change`](Self::change), undone when the guard drops.
    ///
    /// # Example
    /// ```
    /// use rust_log_router::{LogLevel, LoggingConfig, LoggingSetup};
    ///
    /// let setup = LoggingSetup::new(LoggingConfig::default(), LogLevel::Info).unwrap();
    /// {
    ///     let _debug = setup.scoped(None, Some(LogLevel::Debug)).unwrap();
    ///     assert_eq!(setup.verbosity(), LogLevel::Debug);
    /// }
    /// assert_eq!(setup.verbosity(), LogLevel::Info);
    /// ```
    pub fn scoped(
        &self,
        config: Option<LoggingConfig>,
        verbosity: Option<LogLevel>,
    ) -> Result<ScopedOverride<'_>> {
        self.change(config, verbosity)?;
        Ok(ScopedOverride { setup: self })
    }

    /// Drop every layer above the base and reinstall the base engine
    pub fn reset(&self) -> Result<()> {
        let mut layers = self.layers.lock();
        layers.truncate(1);
        self.install(&layers)
    }

    /// Remove the top layer. The base layer is never popped.
    pub fn pop(&self) -> Result<()> {
        let mut layers = self.layers.lock();
        if layers.len() > 1 {
            layers.pop();
        }
        self.install(&layers)
    }

    fn install(&self, layers: &[Layer]) -> Result<()> {
        let top = layers
            .last()
            .ok_or_else(|| LoggerError::other("logging setup has no base layer"))?;
        self.engine.store(Arc::new(top.build()?));
        Ok(())
    }

    fn top(&self) -> Layer {
        let layers = self.layers.lock();
        // The base layer is never removed
        layers[layers.len() - 1].clone()
    }
}

impl std::fmt::Debug for LoggingSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingSetup")
            .field("depth", &self.depth())
            .field("engine", &self.engine.load_full())
            .finish()
    }
}

/// Guard returned by [`LoggingSetup::scoped`].
///
/// Dropping it pops its layer. When dropped while unwinding from a panic the
/// setup is reset to its base instead.
#[must_use = "the override is undone as soon as the guard is dropped"]
pub struct ScopedOverride<'a> {
    setup: &'a LoggingSetup,
}

impl Drop for ScopedOverride<'_> {
    fn drop(&mut self) {
        let restored = if std::thread::panicking() {
            self.setup.reset()
        } else {
            self.setup.pop()
        };
        if let Err(e) = restored {
            self.setup.engine().log(
                "",
                LogLevel::Error,
                format!("[LOGGER ERROR] failed to restore logging configuration: {}", e),
            );
        }
    }
}
