//! Property-based tests using proptest
//!
//! These tests verify invariants across randomized inputs:
//! - Level ordering and parsing
//! - Hierarchy resolution for arbitrary dotted names
//! - Sink threshold filtering
//! - Message sanitization

use proptest::prelude::*;
use rust_log_router::appenders::MemoryAppender;
use rust_log_router::core::{Engine, LogLevel, LogRecord};
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warning),
        Just(LogLevel::Error),
        Just(LogLevel::Critical),
    ]
}

/// Dotted logger names like `ab.c.def`
fn logger_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,4}", 1..6).prop_map(|parts| parts.join("."))
}

// ============================================================================
// LogLevel Property Tests
// ============================================================================

proptest! {
    #[test]
    fn test_level_order_matches_numeric_value(a in any_level(), b in any_level()) {
        prop_assert_eq!(a < b, (a as i32) < (b as i32));
        prop_assert_eq!(a == b, (a as i32) == (b as i32));
    }

    #[test]
    fn test_level_str_roundtrip(level in any_level(), lower in any::<bool>()) {
        let text = if lower {
            level.to_str().to_lowercase()
        } else {
            level.to_str().to_string()
        };
        prop_assert_eq!(text.parse::<LogLevel>().unwrap(), level);
    }

    #[test]
    fn test_verbosity_never_above_error(count in any::<u8>()) {
        let level = LogLevel::from_verbosity(count);
        prop_assert!(level <= LogLevel::Error);
        prop_assert!(LogLevel::from_verbosity(count.saturating_add(1)) <= level);
    }
}

// ============================================================================
// Hierarchy Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_unregistered_names_reach_root_only(name in logger_name()) {
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("root", "brief", LogLevel::Debug, MemoryAppender::new())
            .root(["root"])
            .build()
            .unwrap();

        let sinks = engine.effective_sinks(&name);
        let root = engine.hierarchy().root().sinks();
        prop_assert_eq!(sinks.len(), root.len());
        prop_assert!(Arc::ptr_eq(&sinks[0], &root[0]));
    }

    #[test]
    fn test_effective_sinks_have_no_duplicates(
        name in logger_name(),
        propagate in prop::collection::vec(any::<bool>(), 6),
    ) {
        // Register every ancestor of `name`, all pointing at the same sinks
        let parts: Vec<&str> = name.split('.').collect();
        let mut builder = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("a", "brief", LogLevel::Debug, MemoryAppender::new())
            .appender_sink("b", "brief", LogLevel::Debug, MemoryAppender::new())
            .root(["a", "b"]);
        for depth in 1..=parts.len() {
            let logger = parts[..depth].join(".");
            builder = builder.logger(&logger, ["b", "a"], propagate[depth - 1]);
        }
        let engine = builder.build().unwrap();

        let sinks = engine.effective_sinks(&name);
        prop_assert_eq!(sinks.len(), 2);
        prop_assert_eq!(sinks[0].name(), "b");
        prop_assert_eq!(sinks[1].name(), "a");
    }

    #[test]
    fn test_non_propagating_logger_keeps_own_sinks(
        parent in logger_name(),
        leaf in "[a-z]{1,4}",
    ) {
        let child = format!("{}.{}", parent, leaf);
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("own", "brief", LogLevel::Debug, MemoryAppender::new())
            .appender_sink("up", "brief", LogLevel::Debug, MemoryAppender::new())
            .logger(&parent, ["up"], true)
            .logger(&child, ["own"], false)
            .root(["up"])
            .build()
            .unwrap();

        let names: Vec<String> = engine
            .effective_sinks(&child)
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        prop_assert_eq!(names, vec!["own".to_string()]);
    }
}

// ============================================================================
// Sink Threshold Property Tests
// ============================================================================

proptest! {
    #[test]
    fn test_sink_emits_iff_at_or_above_threshold(
        threshold in any_level(),
        level in any_level(),
        message in "[a-zA-Z0-9 ]{0,32}",
    ) {
        let memory = MemoryAppender::new();
        let engine = Engine::builder()
            .formatter("brief", "%message%", None)
            .appender_sink("memory", "brief", threshold, memory.clone())
            .root(["memory"])
            .build()
            .unwrap();

        engine.log("app", level, message.clone());

        if level >= threshold {
            prop_assert_eq!(memory.lines(), vec![message]);
        } else {
            prop_assert!(memory.is_empty());
        }
    }
}

// ============================================================================
// Sanitization Property Tests
// ============================================================================

proptest! {
    #[test]
    fn test_record_message_is_single_line(message in ".*") {
        let record = LogRecord::new("app", LogLevel::Info, message);
        prop_assert!(!record.message.contains('\n'));
        prop_assert!(!record.message.contains('\r'));
        prop_assert!(!record.message.contains('\t'));
    }
}
