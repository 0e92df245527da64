//! Configuration for the passwd/group proxy daemons.
//!
//! Both daemons take exactly one positional argument, the path of the Unix
//! socket to bind. Logging is tuned through the environment only, so the
//! command line stays a single argument:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `PWGR_LOG` | `tracing` filter expression | `info` |
//! | `PWGR_LOG_FORMAT` | `json` or `compact` | `compact` |
//!
//! [`Config::load`] reads the process arguments and environment.
//! [`Config::load_with_env`] takes both explicitly for embedding and tests.

mod cli;
mod defaults;
mod logging;
mod socket;
mod transport;

use std::env;
use std::ffi::OsString;

use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, LOG_FILTER_ENV, LOG_FORMAT_ENV, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{ChannelEndpoint, EndpointError, MAX_SOCKET_PATH_LEN};
pub use transport::Transport;

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    transport: Transport,
    endpoint: ChannelEndpoint,
    log_filter: String,
    log_format: LogFormat,
}

impl Config {
    /// Builds a configuration with default logging for `endpoint`.
    #[must_use]
    pub fn new(transport: Transport, endpoint: ChannelEndpoint) -> Self {
        Self {
            transport,
            endpoint,
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
        }
    }

    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load_with_env`].
    pub fn load(transport: Transport) -> Result<Self, ConfigError> {
        Self::load_with_env(transport, env::args_os(), |key| env::var(key).ok())
    }

    /// Loads configuration from explicit arguments and an environment lookup.
    ///
    /// The first argument is the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Usage`] when the arguments do not consist of
    /// exactly one socket path (or when help/version output was requested),
    /// and [`ConfigError::LogFormat`] for an unrecognised log format.
    pub fn load_with_env<I, T, F>(transport: Transport, args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        F: Fn(&str) -> Option<String>,
    {
        let parsed = cli::DaemonArgs::parse_for(transport, args).map_err(ConfigError::Usage)?;
        let mut config = Self::new(transport, ChannelEndpoint::new(parsed.socket));

        if let Some(filter) = env(LOG_FILTER_ENV).filter(|value| !value.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(value) = env(LOG_FORMAT_ENV) {
            config.log_format = match value.trim().parse() {
                Ok(format) => format,
                Err(source) => return Err(ConfigError::LogFormat { value, source }),
            };
        }
        Ok(config)
    }

    /// Transport the daemon serves.
    #[must_use]
    pub const fn transport(&self) -> Transport {
        self.transport
    }

    /// Socket the daemon binds.
    #[must_use]
    pub const fn endpoint(&self) -> &ChannelEndpoint {
        &self.endpoint
    }

    /// Filter expression for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for the tracing subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Replaces the log filter expression.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Replaces the log output format.
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Arguments were missing, surplus, or asked for help/version output.
    #[error(transparent)]
    Usage(clap::Error),
    /// `PWGR_LOG_FORMAT` named an unknown format.
    #[error("invalid PWGR_LOG_FORMAT value '{value}': {source}")]
    LogFormat {
        /// Rejected value.
        value: String,
        /// Underlying parse error.
        #[source]
        source: LogFormatParseError,
    },
}

impl ConfigError {
    /// Returns `true` when the error is a help or version request that should
    /// be printed to stdout and end the process successfully.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::Usage(error) if !error.use_stderr())
    }
}
