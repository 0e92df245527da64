use std::io;

use pwgr_proto::FrameError;
use thiserror::Error;

/// Errors raised by the lookup clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Reaching the daemon's socket failed.
    #[error("failed to reach daemon at {path}: {source}")]
    Connect {
        /// Daemon socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Sending the request or receiving the reply failed.
    #[error("daemon exchange failed: {source}")]
    Io {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// No reply arrived in time.
    #[error("daemon did not reply within the read timeout")]
    Timeout,
    /// The daemon closed the connection without replying, which it does for
    /// requests it could not decode.
    #[error("daemon closed the connection without a reply")]
    NoReply,
    /// The request could not be encoded or the reply could not be decoded.
    #[error(transparent)]
    Protocol(#[from] FrameError),
    /// The reply decoded but answered a different question.
    #[error("daemon reply does not answer the request")]
    UnexpectedAnswer,
}

impl ClientError {
    pub(crate) fn from_read(source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io { source },
        }
    }
}
