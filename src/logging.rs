//! Stderr logger for the `log` facade
//!
//! The library only emits `log` records, under the targets `engine`, `flow`,
//! `resources` and `audio`. This module is the backend the binary installs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Debug log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// All internal state changes
    Trace,
    /// Development debugging information
    Debug,
    /// Important state changes
    Info,
    /// Potential issues
    Warn,
    /// Error situations
    Error,
}

impl LogLevel {
    fn filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// Log category, one per target the library logs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebugCategory {
    /// Instruction dispatch and run lifecycle
    Engine,
    /// Control flow (labels, jumps, choices)
    Flow,
    /// Resource resolution
    Resources,
    /// Music control
    Audio,
}

impl DebugCategory {
    fn from_target(target: &str) -> Option<Self> {
        match target {
            "engine" => Some(DebugCategory::Engine),
            "flow" => Some(DebugCategory::Flow),
            "resources" => Some(DebugCategory::Resources),
            "audio" => Some(DebugCategory::Audio),
            _ => None,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Enable debug logging; when off only warnings and errors are printed
    pub enabled: bool,
    /// Minimum log level
    pub level: LogLevel,
    /// Enabled categories
    pub categories: HashSet<DebugCategory>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        let mut categories = HashSet::new();
        categories.insert(DebugCategory::Engine);
        categories.insert(DebugCategory::Flow);

        Self {
            enabled: std::env::var("TSUZURI_DEBUG").is_ok(),
            level: LogLevel::Debug,
            categories,
        }
    }
}

impl DebugConfig {
    pub fn all_categories(mut self) -> Self {
        self.categories.insert(DebugCategory::Resources);
        self.categories.insert(DebugCategory::Audio);
        self
    }

    fn max_level(&self) -> log::LevelFilter {
        if self.enabled {
            self.level.filter().max(log::LevelFilter::Warn)
        } else {
            log::LevelFilter::Warn
        }
    }

    fn allows(&self, metadata: &log::Metadata<'_>) -> bool {
        if metadata.level() <= log::Level::Warn {
            return true;
        }
        if !self.enabled || metadata.level() > self.level.filter() {
            return false;
        }
        match DebugCategory::from_target(metadata.target()) {
            Some(category) => self.categories.contains(&category),
            None => false,
        }
    }
}

struct StderrLogger {
    config: DebugConfig,
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.config.allows(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!(
            "[{:5}] {:10} {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Install the stderr logger as the global `log` backend
pub fn init(config: DebugConfig) -> Result<(), log::SetLoggerError> {
    let max_level = config.max_level();
    log::set_boxed_logger(Box::new(StderrLogger { config }))?;
    log::set_max_level(max_level);
    Ok(())
}
