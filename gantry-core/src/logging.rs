//! Logging for Gantry binaries and test suites.
//!
//! A thin configuration layer over `tracing`: pick a level, a format and a
//! writer, then call [`LogConfig::init`] once from the entry point. When the
//! `RUST_LOG` environment variable is set it overrides the configured level.

use std::io;
use tracing_subscriber::EnvFilter;

// Re-export the tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to string for EnvFilter
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line text output
    Plain,
    /// Multi-line, colored output for development
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Write to STDERR instead of STDOUT
    pub stderr: bool,
    /// Include the target (module path)
    pub targets: bool,
    /// Enable ANSI colors
    pub colors: bool,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn to_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    pub fn with_targets(mut self, enable: bool) -> Self {
        self.targets = enable;
        self
    }

    pub fn with_colors(mut self, enable: bool) -> Self {
        self.colors = enable;
        self
    }

    /// Install the global subscriber.
    ///
    /// A second call in the same process is a no-op, so shared test binaries
    /// can initialize unconditionally.
    pub fn init(self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));

        match (self.format, self.stderr) {
            (LogFormat::Plain, false) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(self.targets)
                    .with_ansi(self.colors)
                    .with_writer(io::stdout)
                    .try_init();
            }
            (LogFormat::Plain, true) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(self.targets)
                    .with_ansi(self.colors)
                    .with_writer(io::stderr)
                    .try_init();
            }
            (LogFormat::Pretty, false) => {
                let _ = tracing_subscriber::fmt()
                    .pretty()
                    .with_env_filter(filter)
                    .with_target(self.targets)
                    .with_ansi(self.colors)
                    .with_writer(io::stdout)
                    .try_init();
            }
            (LogFormat::Pretty, true) => {
                let _ = tracing_subscriber::fmt()
                    .pretty()
                    .with_env_filter(filter)
                    .with_target(self.targets)
                    .with_ansi(self.colors)
                    .with_writer(io::stderr)
                    .try_init();
            }
        }
    }
}

impl Default for LogConfig {
    /// Plain text to STDOUT at INFO level
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Plain,
            stderr: false,
            targets: true,
            colors: false,
        }
    }
}
