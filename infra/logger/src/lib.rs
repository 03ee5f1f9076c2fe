//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for the gateway.
//!
//! * Console output is compact and colored, or JSON lines when [`LoggerBuilder::json`] is set.
//! * An optional rolling file appender writes through a non-blocking worker; the returned
//!   [`Logger`] must be kept alive so buffered lines are flushed on shutdown.
//! * The level is an `EnvFilter` directive (`"info"`, `"svcd_services=debug,info"`).
//!   `RUST_LOG` takes precedence when it is set.
//!
//! ## Example
//!
//! ```rust
//! use svcd_logger::Logger;
//!
//! let _logger = Logger::builder().name("svcd-server").level("debug").init().unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// A builder for the global tracing subscriber.
#[must_use = "The builder must be configured before it can be used to initialize the logger."]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    level: String,
    console: bool,
    json: bool,
    directory: Option<PathBuf>,
    rotation: Rotation,
    max_files: usize,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: DEFAULT_LEVEL.to_owned(),
            console: true,
            json: false,
            directory: None,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl LoggerBuilder {
    /// Identifies the process; also the prefix of rolling log files.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Default filter directive used when `RUST_LOG` is unset.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Emits JSON lines instead of the compact human format.
    pub const fn json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    /// Enables the rolling file appender under `directory`.
    pub fn directory(mut self, directory: Option<impl Into<PathBuf>>) -> Self {
        self.directory = directory.map(Into::into);
        self
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub const fn max_files(mut self, max: usize) -> Self {
        self.max_files = max;
        self
    }

    /// Consumes the builder and installs the global subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, a bad filter directive,
    ///   `max_files == 0` or when neither console nor file output is enabled.
    /// * [`LoggerError::Appender`] if the log directory cannot be used.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;
        let env_filter = self.env_filter()?;

        let mut layers = Vec::new();
        if self.console {
            let console = layer().with_target(true);
            layers.push(if self.json {
                console.json().boxed()
            } else {
                console.compact().with_ansi(true).boxed()
            });
        }

        let guard = match &self.directory {
            Some(directory) => {
                fs::create_dir_all(directory).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Creating {}", directory.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(self.rotation.clone())
                    .filename_prefix(&self.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(self.max_files)
                    .build(directory)
                    .context("Building rolling appender")?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file = layer().with_writer(writer).with_ansi(false);
                layers.push(if self.json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            }
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no output enabled; enable the console or set a log directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layers)
            .try_init()
            .context("Installing global subscriber")?;

        Ok(Logger { guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        if self.max_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        if let Ok(from_env) = EnvFilter::try_from_default_env() {
            return Ok(from_env);
        }
        EnvFilter::builder().parse(&self.level).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid level directive '{}': {e}", self.level).into(),
            context: None,
        })
    }
}

/// Handle to the installed logging system.
///
/// Holds the file worker guard, if any. Drop it only at shutdown.
#[must_use = "Dropping this handle stops the background file writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// `true` when a rolling file appender is active.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder();
        assert!(builder.console);
        assert!(!builder.json);
        assert_eq!(builder.level, "info");
        assert!(builder.directory.is_none());
        assert_eq!(builder.max_files, DEFAULT_MAX_FILES);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Logger::builder().name("  ").validate().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn zero_max_files_is_rejected() {
        let err = Logger::builder().name("svcd").max_files(0).validate().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn directory_accepts_none() {
        let builder = Logger::builder().directory(None::<PathBuf>);
        assert!(builder.directory.is_none());
    }
}
