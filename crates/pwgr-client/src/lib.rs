//! Client side of the passwd/group lookup protocol.
//!
//! [`ProxyClient`] talks to the seqpacket daemon, opening one connection per
//! question. [`UidClient`] talks to the datagram daemon from a socket bound in
//! a private temporary directory, because the daemon replies to the sender's
//! address. Both wait at most [`DEFAULT_READ_TIMEOUT`] for an answer unless
//! told otherwise.
//!
//! A lookup for a record the host does not have returns `Ok(None)`.

mod datagram;
mod error;
mod seqpacket;

use std::time::Duration;

pub use datagram::UidClient;
pub use error::ClientError;
pub use seqpacket::ProxyClient;

/// How long a client waits for the daemon's reply.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

#[cfg(test)]
mod tests;
