//! Connectionless channel serving uid lookups.

use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::net::UnixDatagram;
use std::path::Path;

use nix::sys::socket::SockType;
use pwgr_config::ChannelEndpoint;
use pwgr_proto::MAX_FRAME_LEN;
use tracing::{debug, info};

use super::endpoint::{EndpointGuard, clear_stale_socket};
use super::{Channel, ChannelError, Served, TRANSPORT_TARGET, TransportError};
use crate::dispatch::FrameHandler;

/// `SOCK_DGRAM` endpoint. Each datagram is one request; the reply goes to the
/// sender's bound address.
///
/// The socket is non-blocking. A sender whose receive queue is full loses its
/// reply with [`TransportError::Send`] rather than stalling the loop.
#[derive(Debug)]
pub struct DatagramChannel {
    socket: UnixDatagram,
    buffer: Vec<u8>,
    guard: EndpointGuard,
}

impl DatagramChannel {
    /// Binds the endpoint, replacing a stale socket file if one is present.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the path is in use, is not a socket, or
    /// cannot be bound.
    pub fn bind(endpoint: &ChannelEndpoint) -> Result<Self, ChannelError> {
        let path = endpoint.path().as_std_path();
        clear_stale_socket(path, SockType::Datagram)?;
        let socket = UnixDatagram::bind(path).map_err(|source| ChannelError::Bind {
            path: endpoint.path().to_string(),
            source,
        })?;
        let guard = EndpointGuard::new(path);
        socket
            .set_nonblocking(true)
            .map_err(|source| ChannelError::Bind {
                path: endpoint.path().to_string(),
                source,
            })?;
        info!(target: TRANSPORT_TARGET, %endpoint, "datagram endpoint bound");
        Ok(Self {
            socket,
            buffer: vec![0; MAX_FRAME_LEN],
            guard,
        })
    }

    /// Filesystem path of the bound socket.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.guard.path()
    }
}

impl AsFd for DatagramChannel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }
}

impl Channel for DatagramChannel {
    fn serve_one(&mut self, handler: &dyn FrameHandler) -> Result<Served, TransportError> {
        let (len, peer) = self
            .socket
            .recv_from(&mut self.buffer)
            .map_err(|source| TransportError::Receive { source })?;
        if len == 0 {
            info!(target: TRANSPORT_TARGET, "zero-length datagram received");
            return Ok(Served::PeerClosed);
        }

        let frame = self.buffer.get(..len).unwrap_or_default();
        let Some(reply) = handler.handle_frame(frame) else {
            return Ok(Served::Handled);
        };
        if peer.is_unnamed() {
            debug!(target: TRANSPORT_TARGET, "sender is unbound; reply discarded");
            return Ok(Served::Handled);
        }
        self.socket
            .send_to_addr(reply.as_bytes(), &peer)
            .map_err(|source| TransportError::Send { source })?;
        Ok(Served::Handled)
    }
}
