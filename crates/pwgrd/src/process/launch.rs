//! Sequences daemon start-up, the event loop and teardown.

use std::io::{self, Write};
use std::process::ExitCode;

use pwgr_config::{Config, ConfigError, Transport};
use tracing::{error, info};

use crate::directory::{IdentityDirectory, SystemDirectory};
use crate::dispatch::{Dispatcher, FrameHandler};
use crate::event_loop::{EventLoop, LoopExit};
use crate::shutdown::{ShutdownSource, SignalPipe};
use crate::telemetry;
use crate::transport::{Channel, DatagramChannel, SeqPacketChannel};

use super::PROCESS_TARGET;
use super::errors::{EXIT_USAGE, LaunchError};

/// Runs the daemon for `transport` with the production collaborators and
/// maps the outcome to a process exit status.
#[must_use]
pub fn run_daemon(transport: Transport) -> ExitCode {
    let config = match Config::load(transport) {
        Ok(config) => config,
        Err(error) => return report_config_error(&error),
    };

    match run_with(&config, SystemDirectory) {
        Ok(_) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(
                target: PROCESS_TARGET,
                error = %failure,
                status = failure.exit_status(),
                "daemon terminated"
            );
            if matches!(failure, LaunchError::Telemetry { .. }) {
                write_stderr(&failure.to_string());
            }
            ExitCode::from(failure.exit_status())
        }
    }
}

/// Initialises telemetry, arms the termination signals and serves until
/// shutdown.
///
/// # Errors
///
/// Returns [`LaunchError`] for any start-up failure or a fatal loop error.
/// Resources acquired before the failure are released before returning.
pub fn run_with<D: IdentityDirectory>(
    config: &Config,
    directory: D,
) -> Result<LoopExit, LaunchError> {
    telemetry::initialise(config)?;
    info!(
        target: PROCESS_TARGET,
        transport = %config.transport(),
        endpoint = %config.endpoint(),
        "starting daemon"
    );
    let shutdown = SignalPipe::arm()?;
    serve(config, directory, shutdown)
}

/// Binds the configured endpoint and runs the event loop with an injected
/// shutdown source.
///
/// The socket file is removed before this returns, whatever the outcome.
///
/// # Errors
///
/// Returns [`LaunchError`] when the endpoint is unusable, binding fails or
/// the readiness wait fails.
pub fn serve<D, S>(config: &Config, directory: D, shutdown: S) -> Result<LoopExit, LaunchError>
where
    D: IdentityDirectory,
    S: ShutdownSource,
{
    config.endpoint().validate()?;
    let dispatcher = Dispatcher::new(config.transport(), directory);
    match config.transport() {
        Transport::Datagram => {
            run_loop(DatagramChannel::bind(config.endpoint())?, shutdown, &dispatcher)
        }
        Transport::SeqPacket => {
            run_loop(SeqPacketChannel::bind(config.endpoint())?, shutdown, &dispatcher)
        }
    }
}

fn run_loop<C, S>(channel: C, shutdown: S, handler: &dyn FrameHandler) -> Result<LoopExit, LaunchError>
where
    C: Channel,
    S: ShutdownSource,
{
    let mut event_loop = EventLoop::new(channel, shutdown);
    let exit = event_loop.run(handler)?;
    info!(
        target: PROCESS_TARGET,
        reason = %exit.reason,
        served = exit.served,
        "daemon stopped"
    );
    Ok(exit)
}

fn report_config_error(error: &ConfigError) -> ExitCode {
    match error {
        ConfigError::Usage(usage) => {
            if let Err(print_error) = usage.print() {
                write_stderr(&print_error.to_string());
            }
            if error.is_informational() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_USAGE)
            }
        }
        ConfigError::LogFormat { .. } => {
            write_stderr(&error.to_string());
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn write_stderr(message: &str) {
    let mut stderr = io::stderr().lock();
    drop(writeln!(stderr, "error: {message}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn load(args: &[&str], format: Option<&str>) -> ConfigError {
        let owned = format.map(str::to_owned);
        Config::load_with_env(Transport::SeqPacket, args.iter().copied(), |key| {
            (key == pwgr_config::LOG_FORMAT_ENV)
                .then(|| owned.clone())
                .flatten()
        })
        .expect_err("configuration must be rejected")
    }

    #[rstest]
    #[case::missing_socket(&["pwgrd"], None, ExitCode::from(EXIT_USAGE))]
    #[case::extra_argument(&["pwgrd", "/a.sock", "/b.sock"], None, ExitCode::from(EXIT_USAGE))]
    #[case::bad_log_format(&["pwgrd", "/a.sock"], Some("xml"), ExitCode::from(EXIT_USAGE))]
    #[case::help(&["pwgrd", "--help"], None, ExitCode::SUCCESS)]
    fn configuration_errors_map_to_usage_status(
        #[case] args: &[&str],
        #[case] format: Option<&str>,
        #[case] expected: ExitCode,
    ) {
        assert_eq!(report_config_error(&load(args, format)), expected);
    }
}
