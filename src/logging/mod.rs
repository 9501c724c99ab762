//! Logging and output control
//!
//! This module provides the [`Logger`] handed to every component, plus
//! [`init_logging`] which installs the process-wide `tracing` subscriber.
//! All output goes through `tracing`, so spans opened by callers (for example
//! the per-token span in the reconciler) are attached to every line.

use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` directives are applied on top of
/// the requested level.
pub fn init_logging(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Parse a verbosity name (`trace`, `debug`, `info`, `warn`, `error`)
pub fn parse_level(name: &str) -> Option<Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Logger responsible for all operator-visible output
#[derive(Debug, Clone)]
pub struct Logger {
    pub verbose: bool,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Main section heading
    pub fn section(&self, title: &str) {
        tracing::info!("=== {} ===", title);
    }

    /// Information message
    pub fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    /// Success message
    pub fn success(&self, message: &str) {
        tracing::info!(outcome = "success", "{}", message);
    }

    pub fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        if self.verbose {
            tracing::info!("   {}", message);
        } else {
            tracing::debug!("{}", message);
        }
    }

    /// Key-value pair summary display
    pub fn summary_kv(&self, title: &str, items: &[(&str, String)]) {
        tracing::info!("--- {} ---", title);
        for (key, value) in items {
            tracing::info!("  {}: {}", key, value);
        }
    }

    /// Format duration in human-readable format
    pub fn format_duration(&self, duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs < 60 {
            format!("{}.{:03}s", secs, duration.subsec_millis())
        } else if secs < 3600 {
            format!("{}m{}s", secs / 60, secs % 60)
        } else {
            format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }
}
