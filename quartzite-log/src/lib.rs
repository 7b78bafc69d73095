//! Quartzite logging.
//!
//! Small leveled logger used by the Quartzite crates. Output goes to stderr and is
//! controlled through environment variables, read once on first use.
//!
//! # Usage
//!
//! ```rust
//! use quartzite_log::{debug, trace, warn};
//!
//! trace!("scanning field {}", "minute");
//! debug!(target: "quartzite::search", "year cap reached at {}", 2999);
//! warn!("expression exhausted");
//! ```
//!
//! # Environment Variables
//!
//! - `QUARTZITE_DEBUG=1` - Enable debug logging
//! - `QUARTZITE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level (default `warn`)
//! - `QUARTZITE_LOG_FORMAT=compact|json` - Set output format (default `compact`)
//! - `QUARTZITE_LOG_TIMESTAMPS=1|0` - Include timestamps (default on)

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

// ============================================================================
// Levels
// ============================================================================

/// Log level, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Disables all output.
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `2024-01-01T00:00:00.000Z DEBUG [target] message`
    Compact,
    /// One JSON object per line.
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "pretty" | "text" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

const UNSET: u8 = u8::MAX;

/// Active threshold. `UNSET` until the environment is read or `set_level` is called.
static LEVEL: AtomicU8 = AtomicU8::new(UNSET);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    // A level set programmatically before first use wins over the environment.
    let _ = LEVEL.compare_exchange(UNSET, config.level as u8, Ordering::SeqCst, Ordering::SeqCst);
    config
});

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level written
    pub level: Level,
    /// Line format
    pub format: Format,
    /// Prefix lines with a timestamp
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Warn,
            format: Format::Compact,
            timestamps: true,
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    /// Build the configuration from `QUARTZITE_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("QUARTZITE_DEBUG").unwrap_or(false);

        let level = env::var("QUARTZITE_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        let format = env::var("QUARTZITE_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(defaults.format);

        let timestamps = env_flag("QUARTZITE_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps);

        Self {
            level,
            format,
            timestamps,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Read the environment now instead of on the first log call.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// The global configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Current threshold.
pub fn current_level() -> Level {
    let raw = LEVEL.load(Ordering::Relaxed);
    if raw != UNSET {
        return Level::from_u8(raw);
    }
    init();
    Level::from_u8(LEVEL.load(Ordering::Relaxed))
}

/// Whether messages at `level` are written.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level >= current_level()
}

/// Change the threshold at runtime.
pub fn set_level(level: Level) {
    LEVEL.store(level as u8, Ordering::SeqCst);
}

// ============================================================================
// Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    if !is_level_enabled(level) {
        return;
    }

    let config = config();
    match config.format {
        Format::Compact => write_compact(level, target, message, config),
        Format::Json => write_json(level, target, message, config),
    }
}

fn write_compact(level: Level, target: &str, message: &str, config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let now = chrono::Utc::now();
        let _ = write!(stderr, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.3fZ"));
    }

    let _ = write!(stderr, "{:5} ", level.as_str());

    if !target.is_empty() {
        let _ = write!(stderr, "[{}] ", target);
    }

    let _ = writeln!(stderr, "{}", message);
}

#[cfg(feature = "json")]
fn write_json(level: Level, target: &str, message: &str, config: &LogConfig) {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Line<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let line = Line {
        timestamp: config.timestamps.then(|| chrono::Utc::now().to_rfc3339()),
        level: level.as_str(),
        target,
        message,
    };

    if let Ok(json) = serde_json::to_string(&line) {
        let _ = writeln!(std::io::stderr().lock(), "{}", json);
    }
}

#[cfg(not(feature = "json"))]
fn write_json(level: Level, target: &str, message: &str, config: &LogConfig) {
    write_compact(level, target, message, config);
}

// ============================================================================
// Macros
// ============================================================================

/// Log at an explicit level.
#[macro_export]
macro_rules! log_at {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => { $crate::log_at!($crate::Level::Trace, target: $target, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Trace, $($arg)+) };
}

/// Log a debug message.
///
/// Enabled by `QUARTZITE_DEBUG=1` or `QUARTZITE_LOG_LEVEL=debug`.
///
/// ```rust
/// use quartzite_log::debug;
///
/// let expression = "0 0 12 * * ?";
/// debug!("parsed '{}'", expression);
/// debug!(target: "quartzite::parser", "fields: {}", 6);
/// ```
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => { $crate::log_at!($crate::Level::Debug, target: $target, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Debug, $($arg)+) };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => { $crate::log_at!($crate::Level::Info, target: $target, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Info, $($arg)+) };
}

/// Log a warning.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => { $crate::log_at!($crate::Level::Warn, target: $target, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Warn, $($arg)+) };
}

/// Log an error.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => { $crate::log_at!($crate::Level::Error, target: $target, $($arg)+) };
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! A `tracing` subscriber that honours the Quartzite level when `RUST_LOG` is unset.

    use super::*;

    pub fn subscriber() -> impl tracing::Subscriber + Send + Sync {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{fmt, EnvFilter};

        let directive = current_level().as_str().to_ascii_lowercase();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
    }
}
