/// Structured logging for the weather risk classifier
///
/// Provides context-rich logging with component and location identifiers,
/// timestamps, and severity levels. Supports both console output and
/// file-based logging for unattended runs.
///
/// Logging never influences classification. When the logger has not been
/// initialised every call is a no-op, which keeps unit tests silent.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    /// Parses `debug`, `info`, `warn`/`warning` or `error`, ignoring case.
    pub fn parse(value: &str) -> Option<LogLevel> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Which part of a run an entry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Forecast,
    Ensemble,
    Advisory,
    Store,
    Run,
    Config,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Forecast => write!(f, "FORECAST"),
            Component::Ensemble => write!(f, "ENSEMBLE"),
            Component::Advisory => write!(f, "ADVISORY"),
            Component::Store => write!(f, "STORE"),
            Component::Run => write!(f, "RUN"),
            Component::Config => write!(f, "CONFIG"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - input simply not provided for this location
    Expected,
    /// Unexpected failure - input present but malformed
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, component: Component, location: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let location_part = location.map(|l| format!(" [{}]", l)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, component, location_part, message
        );

        // Console output. Diagnostics go to stderr so stdout stays clean
        // for the JSON report.
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, location_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, location_part, message),
                LogLevel::Info => eprintln!("   {}{}: {}", component, location_part, message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

fn dispatch(level: LogLevel, component: Component, location: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, location, message);
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(component: Component, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, location, message);
}

/// Log a warning message
pub fn warn(component: Component, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, location, message);
}

/// Log an error message
pub fn error(component: Component, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, location, message);
}

/// Log a debug message
pub fn debug(component: Component, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, location, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an input failure from its error message.
///
/// A missing file means the input was never provided; decode errors mean the
/// input exists but cannot be trusted.
pub fn classify_failure(error_message: &str) -> FailureType {
    if error_message.contains("No such file") || error_message.contains("not found") {
        FailureType::Expected
    } else if error_message.contains("Parse error")
        || error_message.contains("Invalid time")
        || error_message.contains("No hourly block")
    {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log an input failure with automatic classification
pub fn log_input_failure(
    component: Component,
    location: Option<&str>,
    operation: &str,
    err: &dyn std::error::Error,
) {
    let error_msg = err.to_string();
    let failure_type = classify_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(component, location, &message),
        FailureType::Unexpected => error(component, location, &message),
        FailureType::Unknown => warn(component, location, &message),
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one classification run
pub fn log_run_summary(total: usize, processed: usize, skipped: usize) {
    let message = format!(
        "Run complete: {}/{} locations processed, {} skipped",
        processed, total, skipped
    );

    if skipped == 0 {
        info(Component::Run, None, &message);
    } else if processed == 0 {
        error(Component::Run, None, &message);
    } else {
        warn(Component::Run, None, &message);
    }
}
