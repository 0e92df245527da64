//! Defines the unified error surface for daemon launch and supervision.

use pwgr_config::EndpointError;
use thiserror::Error;

use crate::event_loop::LoopError;
use crate::shutdown::ShutdownError;
use crate::telemetry::TelemetryError;
use crate::transport::ChannelError;

/// Status for usage and configuration errors, which are reported before
/// launch begins.
pub const EXIT_USAGE: u8 = 1;
/// Status when the socket cannot be created.
pub const EXIT_SOCKET: u8 = 255;
/// Status when the endpoint cannot be bound or listened on.
pub const EXIT_BIND: u8 = 254;
/// Status when signal handling cannot be set up.
pub const EXIT_SIGNAL: u8 = 253;
/// Status when the readiness wait fails.
pub const EXIT_WAIT: u8 = 252;
/// Status when logging cannot be set up.
pub const EXIT_TELEMETRY: u8 = 251;

/// Errors surfaced while launching or running a daemon.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Logging could not be initialised.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The socket path cannot be bound.
    #[error("unusable socket path: {source}")]
    Endpoint {
        /// Underlying validation error.
        #[source]
        source: EndpointError,
    },
    /// Signal handlers could not be installed.
    #[error("failed to arm shutdown signals: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// Binding the channel failed.
    #[error("failed to open daemon socket: {source}")]
    Channel {
        /// Underlying channel error.
        #[source]
        source: ChannelError,
    },
    /// The event loop failed.
    #[error("event loop failed: {source}")]
    Loop {
        /// Underlying loop error.
        #[source]
        source: LoopError,
    },
}

impl LaunchError {
    /// Process exit status for this failure.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        match self {
            Self::Telemetry { .. } => EXIT_TELEMETRY,
            Self::Endpoint { .. } => EXIT_BIND,
            Self::Shutdown { .. } => EXIT_SIGNAL,
            Self::Channel {
                source: ChannelError::Socket { .. },
            } => EXIT_SOCKET,
            Self::Channel { .. } => EXIT_BIND,
            Self::Loop { .. } => EXIT_WAIT,
        }
    }
}

impl From<TelemetryError> for LaunchError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<EndpointError> for LaunchError {
    fn from(source: EndpointError) -> Self {
        Self::Endpoint { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

impl From<ChannelError> for LaunchError {
    fn from(source: ChannelError) -> Self {
        Self::Channel { source }
    }
}

impl From<LoopError> for LaunchError {
    fn from(source: LoopError) -> Self {
        Self::Loop { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;
    use rstest::rstest;
    use std::io;

    #[rstest]
    #[case(LaunchError::from(EndpointError::Empty), EXIT_BIND)]
    #[case(
        LaunchError::from(ChannelError::Socket { kind: "seqpacket", source: Errno::EMFILE }),
        EXIT_SOCKET
    )]
    #[case(
        LaunchError::from(ChannelError::InUse { path: "/run/pwgr.sock".to_owned() }),
        EXIT_BIND
    )]
    #[case(
        LaunchError::from(ShutdownError::Pipe { source: io::Error::from(io::ErrorKind::Other) }),
        EXIT_SIGNAL
    )]
    #[case(LaunchError::from(LoopError::Wait { source: Errno::EBADF }), EXIT_WAIT)]
    fn exit_status_follows_failure_class(#[case] error: LaunchError, #[case] expected: u8) {
        assert_eq!(error.exit_status(), expected);
    }
}
