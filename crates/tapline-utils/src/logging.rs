//! # Logging Utilities
//!
//! Logging infrastructure for Tapline using `tracing`.
//!
//! Logs always go to stderr so that command output on stdout stays clean.
//! A log file can be added on top.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tapline_utils::{init_logging, LoggingConfig};
//!
//! let config = LoggingConfig::from_env().expect("invalid logging environment");
//! let _guard = init_logging(&config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! Keep the returned [`LoggingGuard`] alive until the program exits; dropping
//! it flushes and closes the log file.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g., `RUST_LOG=debug`, `RUST_LOG=tapline_core=trace`)
//! - `TAPLINE_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `TAPLINE_LOG_FILE`: Optional log file. A directory gets a dated file inside it.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Local;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "TAPLINE_LOG_FORMAT";
/// Environment variable naming the log file.
pub const LOG_FILE_ENV: &str = "TAPLINE_LOG_FILE";

type Subscriber = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Subscriber> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s} (use 'pretty' or 'json')"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s} (use 'error', 'warn', 'info', 'debug' or 'trace')"
            ))),
        }
    }
}

/// How logging should be set up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig
{
    /// Output format for every sink.
    pub format: LogFormat,
    /// Explicit level. When `None`, `RUST_LOG` decides, falling back to `info`.
    pub level: Option<LogLevel>,
    /// Optional log file, written in addition to stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig
{
    /// Read `TAPLINE_LOG_FORMAT` and `TAPLINE_LOG_FILE`.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidFormat` if `TAPLINE_LOG_FORMAT` is set to an unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        let format = match env::var(LOG_FORMAT_ENV) {
            Ok(value) if !value.trim().is_empty() => value.trim().parse()?,
            _ => LogFormat::default(),
        };
        let file = env::var_os(LOG_FILE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            format,
            level: None,
            file,
        })
    }

    /// Use `level` instead of `RUST_LOG`.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self
    {
        self.level = Some(level);
        self
    }

    /// Use `format` for every sink.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }

    /// Also write logs to `file`.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self
    {
        self.file = Some(file.into());
        self
    }

    fn filter(&self) -> EnvFilter
    {
        // An explicit level wins; otherwise RUST_LOG, which may carry
        // per-module directives such as "tapline_core=debug".
        match self.level {
            Some(level) => EnvFilter::new(Level::from(level).to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
        }
    }
}

/// Keeps the log file writer alive. Dropping it flushes pending records.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// ## Errors
///
/// Returns an error if:
/// - A global subscriber is already installed
/// - The log file's directory cannot be created
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = vec![format_layer(config.format, io::stderr, true)];
    let mut file_guard = None;

    if let Some(requested) = &config.file {
        let path = resolve_log_file(requested)?;
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(directory)?;

        let appender = tracing_appender::rolling::never(directory, path.file_name().unwrap_or_default());
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(format_layer(config.format, writer, false));
        file_guard = Some(guard);
    }

    Registry::default()
        .with(config.filter())
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    if let Some(file) = &config.file {
        tracing::debug!(file = %file.display(), "file logging enabled");
    }
    Ok(LoggingGuard { _file: file_guard })
}

/// Path of the log file for `requested`.
///
/// An existing directory (or a path ending in a separator) gets a file named
/// `YYYY-MM-DD-tapline.log` inside it; anything else is used as-is.
///
/// ## Errors
///
/// Returns `FileError` if `requested` has no file name and is not a directory.
pub fn resolve_log_file(requested: &Path) -> Result<PathBuf, LoggingError>
{
    let names_directory = requested.is_dir() || requested.as_os_str().to_string_lossy().ends_with(['/', '\\']);
    if names_directory {
        let today = Local::now().format("%Y-%m-%d");
        return Ok(requested.join(format!("{today}-tapline.log")));
    }
    if requested.file_name().is_none() {
        return Err(LoggingError::FileError(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", requested.display()),
        )));
    }
    Ok(requested.to_path_buf())
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).boxed(),
        LogFormat::Json => layer.json().with_current_span(true).with_span_list(true).boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
