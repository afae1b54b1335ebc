//! Dispatch engine
//!
//! The [`Engine`] owns the three registries built at load time and routes
//! every record through the logger hierarchy to its sinks. It never returns
//! runtime failures to the caller: a sink that fails or panics is reported
//! once per failure on the fallback stream and the remaining sinks still
//! receive the record.

use super::{
    appender::Appender,
    error::{LoggerError, Result},
    formatter::{Formatter, FormatterRegistry},
    hierarchy::{LoggerHierarchy, LoggerNode},
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::DispatchMetrics,
    sink::{Destination, Sink, SinkRegistry},
};
use crate::appenders::{StreamAppender, StreamTarget};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Template of the stderr sink installed when no root handlers are configured
pub const DEFAULT_TEMPLATE: &str = "[%timestamp%] [%level%] %name% - %message%";

/// Name of the stderr sink installed when no root handlers are configured
pub const DEFAULT_SINK_NAME: &str = "<stderr>";

/// Upper bound on cached routes and on names tracked for no-sink warnings.
/// Names past the bound are resolved on every call and not reported.
pub const MAX_CACHED_ROUTES: usize = 4096;

/// Resolved threshold and sinks for one logger name
#[derive(Debug)]
struct Route {
    level: LogLevel,
    sinks: Vec<Arc<Sink>>,
}

pub struct Engine {
    formatters: FormatterRegistry,
    sinks: SinkRegistry,
    hierarchy: LoggerHierarchy,
    routes: RwLock<HashMap<String, Arc<Route>>>,
    fallback: Mutex<Box<dyn Appender>>,
    unrouted_reported: Mutex<HashSet<String>>,
    metrics: DispatchMetrics,
    closed: AtomicBool,
}

impl Engine {
    /// Create a builder for Engine
    ///
    /// # Example
    /// ```
    /// use rust_log_router::prelude::*;
    ///
    /// let engine = Engine::builder()
    ///     .formatter("brief", "%message%", None)
    ///     .sink("console", "brief", LogLevel::Debug, Destination::stream(StreamTarget::Stdout))
    ///     .root(["console"])
    ///     .build()
    ///     .unwrap();
    ///
    /// engine.log("app.db", LogLevel::Info, "connected");
    /// ```
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn log(&self, logger_name: &str, level: LogLevel, message: impl Into<String>) {
        if let Some(route) = self.enabled_route(logger_name, level) {
            let record = LogRecord::new(logger_name, level, message);
            self.emit_all(&route, &record);
        }
    }

    /// Log with an explicit record time instead of now
    pub fn log_at(
        &self,
        logger_name: &str,
        level: LogLevel,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) {
        if let Some(route) = self.enabled_route(logger_name, level) {
            let record = LogRecord::new(logger_name, level, message).with_timestamp(timestamp);
            self.emit_all(&route, &record);
        }
    }

    /// Route a record that was built by the caller
    pub fn dispatch(&self, record: &LogRecord) {
        if let Some(route) = self.enabled_route(&record.logger_name, record.level) {
            self.emit_all(&route, record);
        }
    }

    /// Handle bound to one logger name
    ///
    /// Routes are cached per distinct name, up to [`MAX_CACHED_ROUTES`];
    /// beyond that names still work but are resolved on every call. Prefer
    /// names from a bounded set (modules, components) over per-request data
    /// such as connection ids.
    pub fn logger(&self, name: impl Into<String>) -> Logger<'_> {
        Logger {
            engine: self,
            name: name.into(),
        }
    }

    pub fn effective_sinks(&self, logger_name: &str) -> Vec<Arc<Sink>> {
        self.route(logger_name).sinks.clone()
    }

    pub fn effective_level(&self, logger_name: &str) -> LogLevel {
        self.route(logger_name).level
    }

    pub fn is_enabled_for(&self, logger_name: &str, level: LogLevel) -> bool {
        level >= self.effective_level(logger_name)
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn sinks(&self) -> &SinkRegistry {
        &self.sinks
    }

    pub fn hierarchy(&self) -> &LoggerHierarchy {
        &self.hierarchy
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Flush every sink.
    ///
    /// A failing sink does not stop the others; each failure is reported on
    /// the fallback stream and the first one is returned.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for sink in self.owned_sinks() {
            if let Err(e) = sink.flush() {
                self.report(&format!("[LOGGER ERROR] {}", e));
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Close every sink and stop dispatching.
    ///
    /// Returns `false` if any sink failed to close cleanly; the failures are
    /// reported on the fallback stream. Calling close twice is a no-op.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return true;
        }

        let mut clean = true;
        for sink in self.owned_sinks() {
            if let Err(e) = sink.close() {
                self.report(&format!("[LOGGER ERROR] {}", e));
                clean = false;
            }
        }
        clean
    }

    fn enabled_route(&self, logger_name: &str, level: LogLevel) -> Option<Arc<Route>> {
        if self.is_closed() {
            return None;
        }
        let route = self.route(logger_name);
        if level < route.level {
            self.metrics.record_filtered();
            return None;
        }
        Some(route)
    }

    fn route(&self, logger_name: &str) -> Arc<Route> {
        if let Some(route) = self.routes.read().get(logger_name) {
            return Arc::clone(route);
        }

        let route = Arc::new(Route {
            level: self.hierarchy.effective_level(logger_name),
            sinks: self.hierarchy.effective_sinks(logger_name),
        });
        let mut routes = self.routes.write();
        if routes.len() >= MAX_CACHED_ROUTES {
            return route;
        }
        Arc::clone(routes.entry(logger_name.to_string()).or_insert(route))
    }

    #[cfg(test)]
    fn cached_routes(&self) -> usize {
        self.routes.read().len()
    }

    fn emit_all(&self, route: &Route, record: &LogRecord) {
        self.metrics.record_dispatched();

        if route.sinks.is_empty() {
            self.metrics.record_unrouted();
            let first_time = {
                let mut reported = self.unrouted_reported.lock();
                reported.len() < MAX_CACHED_ROUTES
                    && reported.insert(record.logger_name.clone())
            };
            if first_time {
                let err = LoggerError::NoSink {
                    logger: record.logger_name.clone(),
                };
                self.report(&format!("[LOGGER WARNING] {}", err));
            }
            return;
        }

        // Per-sink panic isolation: one broken destination can't starve the rest
        for sink in &route.sinks {
            let result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.emit(record)));

            match result {
                Ok(Ok(true)) => {
                    self.metrics.record_emitted();
                }
                Ok(Ok(false)) => {
                    // Below the sink threshold
                }
                Ok(Err(e)) => {
                    self.metrics.record_sink_failure();
                    self.report(&format!("[LOGGER ERROR] {}", e));
                }
                Err(panic_info) => {
                    self.metrics.record_sink_failure();
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    self.report(&format!(
                        "[LOGGER CRITICAL] Handler '{}' panicked: {}. \
                         Other handlers continue to function.",
                        sink.name(),
                        panic_msg
                    ));
                }
            }
        }
    }

    /// Single best-effort write to the fallback stream
    fn report(&self, message: &str) {
        let record = LogRecord::new("", LogLevel::Error, message);
        let mut fallback = self.fallback.lock();
        let _ = fallback.append(&record, &record.message);
        let _ = fallback.flush();
    }

    /// Registered sinks plus any root sink that lives outside the registry
    fn owned_sinks(&self) -> Vec<Arc<Sink>> {
        let mut sinks: Vec<Arc<Sink>> = self.sinks.iter().cloned().collect();
        for sink in self.hierarchy.root().sinks() {
            if !sinks.iter().any(|known| Arc::ptr_eq(known, sink)) {
                sinks.push(Arc::clone(sink));
            }
        }
        sinks
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.close();

        let failures = self.metrics.sink_failures();
        if failures > 0 {
            self.report(&format!(
                "[LOGGER WARNING] Engine shutting down after {} failed handler writes \
                 (failure rate: {:.2}%)",
                failures,
                self.metrics.failure_rate()
            ));
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("formatters", &self.formatters.len())
            .field("sinks", &self.sinks.len())
            .field("loggers", &self.hierarchy.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Handle for logging on one named logger
#[derive(Debug, Clone)]
pub struct Logger<'a> {
    engine: &'a Engine,
    name: String,
}

impl<'a> Logger<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle for `<this name>.<suffix>`
    pub fn child(&self, suffix: &str) -> Logger<'a> {
        let name = if self.name.is_empty() {
            suffix.to_string()
        } else {
            format!("{}.{}", self.name, suffix)
        };
        self.engine.logger(name)
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        self.engine.is_enabled_for(&self.name, level)
    }

    #[inline]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.engine.log(&self.name, level, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }
}

/// Builder for constructing an Engine with a fluent API
///
/// Every registration problem is collected; [`EngineBuilder::build`] reports
/// them together as one [`LoggerError::Configuration`] and never hands out a
/// partially configured engine.
///
/// # Example
/// ```
/// use rust_log_router::prelude::*;
///
/// let memory = MemoryAppender::new();
/// let engine = Engine::builder()
///     .formatter("brief", "%level% %message%", None)
///     .appender_sink("memory", "brief", LogLevel::Warning, memory.clone())
///     .logger("app.db", ["memory"], false)
///     .root(["memory"])
///     .build()
///     .unwrap();
///
/// engine.log("app.db", LogLevel::Info, "ignored");
/// engine.log("app.db", LogLevel::Error, "disk full");
/// assert_eq!(memory.lines(), vec!["ERROR disk full"]);
/// ```
pub struct EngineBuilder {
    formatters: FormatterRegistry,
    sinks: SinkRegistry,
    hierarchy: LoggerHierarchy,
    levels: Vec<(String, LogLevel)>,
    root_configured: bool,
    fallback: Option<Box<dyn Appender>>,
    errors: Vec<LoggerError>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            formatters: FormatterRegistry::new(),
            sinks: SinkRegistry::new(),
            hierarchy: LoggerHierarchy::new(),
            levels: Vec::new(),
            root_configured: false,
            fallback: None,
            errors: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, name: &str, template: &str, timestamp_pattern: Option<&str>) -> Self {
        if let Err(e) = self.formatters.register(name, template, timestamp_pattern) {
            self.errors.push(e);
        }
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink(
        mut self,
        name: &str,
        formatter: &str,
        min_level: LogLevel,
        destination: Destination,
    ) -> Self {
        if let Err(e) = self
            .sinks
            .register(name, formatter, min_level, destination, &self.formatters)
        {
            self.errors.push(e);
        }
        self
    }

    /// Add a sink writing through a caller-supplied appender
    #[must_use = "builder methods return a new value"]
    pub fn appender_sink<A: Appender + 'static>(
        mut self,
        name: &str,
        formatter: &str,
        min_level: LogLevel,
        appender: A,
    ) -> Self {
        if let Err(e) = self.sinks.register_appender(
            name,
            formatter,
            min_level,
            Box::new(appender),
            &self.formatters,
        ) {
            self.errors.push(e);
        }
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn logger<I>(mut self, name: &str, handlers: I, propagate: bool) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let sinks = self.resolve_sinks(handlers);
        let node = LoggerNode::new(name)
            .with_sinks(sinks)
            .with_propagate(propagate);
        if let Err(e) = self.hierarchy.register(node) {
            self.errors.push(e);
        }
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn root<I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if self.root_configured {
            self.errors.push(LoggerError::duplicate("logger", "root"));
            return self;
        }
        self.root_configured = true;

        let sinks = self.resolve_sinks(handlers);
        if let Err(e) = self.hierarchy.register_root(sinks) {
            self.errors.push(e);
        }
        self
    }

    /// Threshold for a logger; `""` is the root
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, name: &str, level: LogLevel) -> Self {
        self.levels.push((name.to_string(), level));
        self
    }

    /// Stream for the engine's own diagnostics (stderr by default)
    #[must_use = "builder methods return a new value"]
    pub fn fallback<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.fallback = Some(Box::new(appender));
        self
    }

    /// Record a problem found outside the builder (e.g. while reading a config file)
    #[must_use = "builder methods return a new value"]
    pub fn problem(mut self, error: LoggerError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn build(mut self) -> Result<Engine> {
        if !self.root_configured && self.errors.is_empty() {
            let sink = default_root_sink()?;
            self.hierarchy.register_root(vec![Arc::new(sink)])?;
        }

        if !self.errors.is_empty() {
            return Err(LoggerError::Configuration(self.errors));
        }

        // Validation is complete; only now may destinations be touched
        let open_errors: Vec<LoggerError> = self
            .sinks
            .iter()
            .filter_map(|sink| sink.open().err())
            .collect();
        if !open_errors.is_empty() {
            return Err(LoggerError::Configuration(open_errors));
        }

        // Levels are applied last so they can target loggers declared after them
        for (name, level) in &self.levels {
            self.hierarchy.set_level(name, *level);
        }

        let fallback = self
            .fallback
            .unwrap_or_else(|| Box::new(StreamAppender::stderr()));

        Ok(Engine {
            formatters: self.formatters,
            sinks: self.sinks,
            hierarchy: self.hierarchy,
            routes: RwLock::new(HashMap::new()),
            fallback: Mutex::new(fallback),
            unrouted_reported: Mutex::new(HashSet::new()),
            metrics: DispatchMetrics::new(),
            closed: AtomicBool::new(false),
        })
    }

    fn resolve_sinks<I>(&mut self, handlers: I) -> Vec<Arc<Sink>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut sinks = Vec::new();
        for handler in handlers {
            match self.sinks.resolve(handler.as_ref()) {
                Ok(sink) => sinks.push(sink),
                Err(e) => self.errors.push(e),
            }
        }
        sinks
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_root_sink() -> Result<Sink> {
    let formatter = Formatter::new("default", DEFAULT_TEMPLATE, Some("iso8601"))?;
    Ok(Sink::with_destination(
        DEFAULT_SINK_NAME,
        Arc::new(formatter),
        LogLevel::Debug,
        Destination::stream(StreamTarget::Stderr),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemoryAppender;

    struct FailingAppender;

    impl Appender for FailingAppender {
        fn append(&mut self, _record: &LogRecord, _line: &str) -> Result<()> {
            Err(LoggerError::writer("disk full"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn append(&mut self, _record: &LogRecord, _line: &str) -> Result<()> {
            panic!("appender exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_duplicate_suppressed_by_identity() {
        let console = MemoryAppender::new();
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("console", "brief", LogLevel::Debug, console.clone())
            .root(["console"])
            .logger("x.y", ["console"], false)
            .build()
            .unwrap();

        engine.log("x.y", LogLevel::Info, "hi");
        assert_eq!(console.lines(), vec!["hi"]);
    }

    #[test]
    fn test_default_root_sink_installed() {
        let engine = Engine::builder().build().unwrap();
        let sinks = engine.effective_sinks("anything");
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].name(), DEFAULT_SINK_NAME);
        assert!(engine.sinks().is_empty());
    }

    #[test]
    fn test_build_aggregates_problems() {
        let err = Engine::builder()
            .formatter("brief", "%message%", None)
            .formatter("brief", "%level%", None)
            .appender_sink("a", "missing", LogLevel::Debug, MemoryAppender::new())
            .logger("app", ["nope"], true)
            .root(Vec::<String>::new())
            .build()
            .unwrap_err();

        let problems = err.problems();
        assert_eq!(problems.len(), 4);
        assert!(matches!(problems[0], LoggerError::DuplicateName { .. }));
        assert!(matches!(problems[1], LoggerError::UnknownFormatter { .. }));
        assert!(matches!(problems[2], LoggerError::UnknownSink { .. }));
        assert!(matches!(problems[3], LoggerError::EmptyRoot));
    }

    #[test]
    fn test_no_sink_reported_once() {
        let diagnostics = MemoryAppender::new();
        let root = MemoryAppender::new();
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("root", "brief", LogLevel::Debug, root.clone())
            .root(["root"])
            .logger("silent", Vec::<&str>::new(), false)
            .fallback(diagnostics.clone())
            .build()
            .unwrap();

        engine.log("silent", LogLevel::Error, "one");
        engine.log("silent", LogLevel::Error, "two");
        engine.log("silent.child", LogLevel::Error, "three");

        assert!(root.is_empty());
        assert_eq!(engine.metrics().unrouted(), 3);
        let lines = diagnostics.lines();
        assert_eq!(lines.len(), 2, "one diagnostic per logger name: {:?}", lines);
        assert!(lines[0].contains("'silent'"));
        assert!(lines[1].contains("'silent.child'"));
    }

    #[test]
    fn test_failing_sink_contained() {
        let diagnostics = MemoryAppender::new();
        let healthy = MemoryAppender::new();
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("broken", "brief", LogLevel::Debug, FailingAppender)
            .appender_sink("exploding", "brief", LogLevel::Debug, PanickingAppender)
            .appender_sink("healthy", "brief", LogLevel::Debug, healthy.clone())
            .root(["broken", "exploding", "healthy"])
            .fallback(diagnostics.clone())
            .build()
            .unwrap();

        engine.log("app", LogLevel::Info, "still delivered");

        assert_eq!(healthy.lines(), vec!["still delivered"]);
        assert_eq!(engine.metrics().sink_failures(), 2);
        assert_eq!(engine.metrics().emitted(), 1);
        let lines = diagnostics.lines();
        assert!(lines[0].contains("'broken'") && lines[0].contains("disk full"));
        assert!(lines[1].contains("'exploding'") && lines[1].contains("appender exploded"));
    }

    #[test]
    fn test_logger_level_filters_before_sinks() {
        let memory = MemoryAppender::new();
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("memory", "brief", LogLevel::Debug, memory.clone())
            .root(["memory"])
            .level("", LogLevel::Warning)
            .level("chatty", LogLevel::Debug)
            .build()
            .unwrap();

        engine.log("quiet", LogLevel::Info, "dropped");
        engine.log("chatty.sub", LogLevel::Debug, "kept");
        engine.log("quiet", LogLevel::Error, "kept too");

        assert_eq!(memory.lines(), vec!["kept", "kept too"]);
        assert_eq!(engine.metrics().filtered(), 1);
        assert!(!engine.is_enabled_for("quiet", LogLevel::Info));
    }

    #[test]
    fn test_logger_handle_and_child() {
        let memory = MemoryAppender::new();
        let engine = Engine::builder()
            .formatter("named", "%name%:%level%:%message%", None)
            .appender_sink("memory", "named", LogLevel::Debug, memory.clone())
            .root(["memory"])
            .build()
            .unwrap();

        let log = engine.logger("ubii");
        log.info("up");
        log.child("client").warning("slow");
        engine.logger("").child("top").critical("down");

        assert_eq!(
            memory.lines(),
            vec!["ubii:INFO:up", "ubii.client:WARNING:slow", "top:CRITICAL:down"]
        );
    }

    #[test]
    fn test_log_at_uses_given_timestamp() {
        use chrono::TimeZone;

        let memory = MemoryAppender::new();
        let engine = Engine::builder()
            .formatter("stamped", "%timestamp% %message%", Some("%Y-%m-%d"))
            .appender_sink("memory", "stamped", LogLevel::Debug, memory.clone())
            .root(["memory"])
            .build()
            .unwrap();

        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        engine.log_at("app", LogLevel::Info, "leap", ts);
        assert_eq!(memory.lines(), vec!["2024-02-29 leap"]);
    }

    #[test]
    fn test_close_stops_dispatch() {
        let memory = MemoryAppender::new();
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("memory", "brief", LogLevel::Debug, memory.clone())
            .root(["memory"])
            .build()
            .unwrap();

        engine.log("app", LogLevel::Info, "before");
        assert!(engine.close());
        assert!(engine.close());
        engine.log("app", LogLevel::Info, "after");

        assert_eq!(memory.lines(), vec!["before"]);
        assert_eq!(engine.metrics().sink_failures(), 0);
    }

    #[test]
    fn test_routes_are_cached() {
        let engine = Engine::builder().build().unwrap();
        let first = engine.route("a.b");
        let second = engine.route("a.b");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_route_cache_is_bounded() {
        let diagnostics = MemoryAppender::new();
        let engine = Engine::builder()
            .logger("silent", Vec::<&str>::new(), false)
            .fallback(diagnostics.clone())
            .build()
            .unwrap();

        for i in 0..MAX_CACHED_ROUTES + 100 {
            engine.log(&format!("silent.conn{}", i), LogLevel::Info, "x");
        }

        assert_eq!(engine.cached_routes(), MAX_CACHED_ROUTES);
        assert_eq!(diagnostics.len(), MAX_CACHED_ROUTES);
        assert_eq!(
            engine.metrics().unrouted(),
            (MAX_CACHED_ROUTES + 100) as u64
        );
        // Names past the bound still resolve correctly
        assert!(engine.effective_sinks("silent.conn99999").is_empty());
    }

    /// Records lifecycle calls and fails its flush
    #[derive(Clone, Default)]
    struct Tracking {
        opened: Arc<AtomicBool>,
        flushes: Arc<std::sync::atomic::AtomicUsize>,
        fail_flush: bool,
    }

    impl Appender for Tracking {
        fn append(&mut self, _record: &LogRecord, _line: &str) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            if self.fail_flush {
                Err(LoggerError::writer("flush refused"))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &str {
            "tracking"
        }

        fn open(&mut self) -> Result<()> {
            self.opened.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_rejected_build_never_opens_sinks() {
        let tracking = Tracking::default();
        let err = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("tracked", "brief", LogLevel::Debug, tracking.clone())
            .root(["tracked", "missing"])
            .build()
            .unwrap_err();

        assert!(matches!(err.problems()[0], LoggerError::UnknownSink { .. }));
        assert!(!tracking.opened.load(Ordering::SeqCst));

        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("tracked", "brief", LogLevel::Debug, tracking.clone())
            .root(["tracked"])
            .build()
            .unwrap();
        assert!(tracking.opened.load(Ordering::SeqCst));
        drop(engine);
    }

    #[test]
    fn test_flush_reaches_every_sink() {
        let diagnostics = MemoryAppender::new();
        let failing = Tracking {
            fail_flush: true,
            ..Tracking::default()
        };
        let healthy = Tracking::default();
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("failing", "brief", LogLevel::Debug, failing.clone())
            .appender_sink("healthy", "brief", LogLevel::Debug, healthy.clone())
            .root(["failing", "healthy"])
            .fallback(diagnostics.clone())
            .build()
            .unwrap();

        let err = engine.flush().unwrap_err();
        assert!(matches!(err, LoggerError::SinkWrite { ref sink, .. } if sink == "failing"));
        assert_eq!(healthy.flushes.load(Ordering::SeqCst), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.lines()[0].starts_with("[LOGGER ERROR]"));
    }
}
