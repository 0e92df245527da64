//! Unix socket channels for the two daemon variants.
//!
//! A channel owns its bound endpoint and serves exactly one unit of work per
//! call: one datagram for [`DatagramChannel`], one accepted connection for
//! [`SeqPacketChannel`]. The event loop only calls [`Channel::serve_one`]
//! after `poll` reported the channel readable, so the receive or accept never
//! waits for a client.

mod datagram;
mod endpoint;
mod errors;
mod seqpacket;

use std::os::fd::AsFd;

pub use self::datagram::DatagramChannel;
pub use self::endpoint::EndpointGuard;
pub use self::errors::{ChannelError, TransportError};
pub use self::seqpacket::{CONNECTION_READ_TIMEOUT, LISTEN_BACKLOG, SeqPacketChannel};

use crate::dispatch::FrameHandler;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// What a call to [`Channel::serve_one`] accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// One unit was received and handled, whether or not a reply was sent.
    Handled,
    /// The channel reported end of input. Only a zero-length datagram does
    /// this; the event loop stops.
    PeerClosed,
}

/// A bound endpoint the event loop can wait on and serve.
pub trait Channel: AsFd {
    /// Receives one unit, hands it to `handler` and sends its reply.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when receiving, accepting or replying
    /// fails. The unit is abandoned; the channel remains usable.
    fn serve_one(&mut self, handler: &dyn FrameHandler) -> Result<Served, TransportError>;
}

#[cfg(test)]
mod tests;
