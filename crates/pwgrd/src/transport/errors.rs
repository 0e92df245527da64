//! Error types for channel setup and per-request I/O.

use std::io;

use nix::errno::Errno;
use thiserror::Error;

/// Errors raised while binding a channel endpoint.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Creating the socket failed.
    #[error("failed to create {kind} socket: {source}")]
    Socket {
        /// Socket type being created.
        kind: &'static str,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
    /// The path cannot be encoded as a Unix socket address.
    #[error("invalid unix socket address {path}: {source}")]
    Address {
        /// Requested socket path.
        path: String,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
    /// Binding the socket failed.
    #[error("failed to bind unix socket at {path}: {source}")]
    Bind {
        /// Requested socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Marking the socket as listening failed.
    #[error("failed to listen on unix socket {path}: {source}")]
    Listen {
        /// Requested socket path.
        path: String,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
    /// Another process is serving the path.
    #[error("existing unix socket {path} is already in use")]
    InUse {
        /// Requested socket path.
        path: String,
    },
    /// The path exists and is not a socket.
    #[error("unix socket path {path} is not a socket")]
    NotSocket {
        /// Requested socket path.
        path: String,
    },
    /// Reading the metadata of an existing path failed.
    #[error("failed to read metadata for unix socket {path}: {source}")]
    Metadata {
        /// Requested socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Probing an existing socket failed for a reason other than refusal.
    #[error("failed to probe existing unix socket {path}: {source}")]
    Probe {
        /// Requested socket path.
        path: String,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
    /// A stale socket could not be removed.
    #[error("failed to remove stale unix socket {path}: {source}")]
    Cleanup {
        /// Requested socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Errors raised while serving a single request.
///
/// None of these end the event loop; the request is abandoned.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Receiving a datagram failed.
    #[error("failed to receive request: {source}")]
    Receive {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Accepting a connection failed.
    #[error("failed to accept connection: {source}")]
    Accept {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Configuring an accepted connection failed.
    #[error("failed to configure connection: {source}")]
    Configure {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Sending the reply failed.
    #[error("failed to send reply: {source}")]
    Send {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
