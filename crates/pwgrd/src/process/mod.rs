//! Daemon start-up, exit statuses and teardown.

mod errors;
mod launch;

pub use errors::{
    EXIT_BIND, EXIT_SIGNAL, EXIT_SOCKET, EXIT_TELEMETRY, EXIT_USAGE, EXIT_WAIT, LaunchError,
};
pub use launch::{run_daemon, run_with, serve};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
