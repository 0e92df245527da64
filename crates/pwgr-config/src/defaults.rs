/// Environment variable holding the log filter expression.
pub const LOG_FILTER_ENV: &str = "PWGR_LOG";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "PWGR_LOG_FORMAT";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
///
/// The daemons usually run under a supervisor that captures stderr, where a
/// compact line reads better than JSON.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}
