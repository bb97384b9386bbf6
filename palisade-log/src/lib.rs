//! Palisade Logging
//!
//! Structured logging for the Palisade crates, built on `tracing`.
//!
//! Member crates emit events through the macros re-exported here; the
//! application decides once, at startup, how those events are rendered by
//! calling [`init`] (environment-driven) or [`LogConfig::install`].
//!
//! # Usage
//!
//! ```rust
//! use palisade_log::{debug, info, LogConfig, Format, Level};
//!
//! let config = LogConfig::new().level(Level::Debug).format(Format::Compact);
//! let _ = config.install();
//!
//! info!(port = 8080, "server started");
//! debug!(path = "/form", "issuing token");
//! ```
//!
//! # Environment Variables
//!
//! - `PALISADE_DEBUG=1` - Enable debug mode (verbose logging, verbose CSRF failures)
//! - `PALISADE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PALISADE_LOG_FORMAT=json|pretty|compact` - Set output format
//! - `RUST_LOG` - Overrides the level filter when set

use once_cell::sync::Lazy;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::{debug, error, info, trace, warn};

// ============================================================================
// Levels and formats
// ============================================================================

/// Minimum level of events that are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Directive understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable output
    Pretty,
    /// Single-line human readable output
    Compact,
    /// One JSON object per event
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to install log subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

// ============================================================================
// Configuration
// ============================================================================

static DEBUG_ENABLED: Lazy<AtomicBool> =
    Lazy::new(|| AtomicBool::new(env_flag("PALISADE_DEBUG").unwrap_or(false)));

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

fn env_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether to print event targets (module paths)
    pub targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            targets: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `PALISADE_*` environment variables.
    pub fn from_env() -> Self {
        let debug = env_flag("PALISADE_DEBUG").unwrap_or(false);

        let level = env::var("PALISADE_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("PALISADE_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        Self {
            debug,
            level,
            format,
            targets: true,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enable debug mode. Lowers the level to `Debug` if it was higher.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        if enabled && self.level > Level::Debug {
            self.level = Level::Debug;
        }
        self
    }

    pub fn with_targets(mut self, targets: bool) -> Self {
        self.targets = targets;
        self
    }

    /// Install this configuration as the global `tracing` subscriber.
    ///
    /// Turns process debug mode on when `debug` is set; never turns it off.
    /// Fails if a global subscriber is already installed.
    pub fn install(&self) -> Result<(), LogError> {
        if self.debug {
            set_debug(true);
        }

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            Format::Json => registry
                .with(fmt::layer().json().with_target(self.targets))
                .try_init()?,
            Format::Pretty => registry
                .with(fmt::layer().pretty().with_target(self.targets))
                .try_init()?,
            Format::Compact => registry
                .with(fmt::layer().compact().with_target(self.targets))
                .try_init()?,
        }

        Ok(())
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Install the environment-derived configuration.
pub fn init() -> Result<(), LogError> {
    config().install()
}

/// The environment-derived configuration, read once.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Whether the process runs in debug mode.
#[inline]
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Switch debug mode at runtime.
pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
}
