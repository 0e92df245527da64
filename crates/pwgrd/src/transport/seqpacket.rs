//! Connection-oriented channel serving uid lookups and membership checks.

use std::io::{Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::net::UnixListener;
use std::path::Path;
use std::time::Duration;

use nix::sys::socket::{AddressFamily, Backlog, SockFlag, SockType, bind, listen, socket};
use pwgr_config::ChannelEndpoint;
use pwgr_proto::MAX_FRAME_LEN;
use tracing::{debug, info};

use super::endpoint::{EndpointGuard, clear_stale_socket, kind_name, unix_addr};
use super::{Channel, ChannelError, Served, TRANSPORT_TARGET, TransportError};
use crate::dispatch::FrameHandler;

/// Pending connections the kernel queues before refusing new ones.
pub const LISTEN_BACKLOG: i32 = 16;

/// Longest an accepted connection may take to deliver its request.
///
/// The server otherwise only blocks in its readiness wait; a client that
/// connects and stays silent must not stall every other client.
pub const CONNECTION_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// `SOCK_SEQPACKET` endpoint. Each accepted connection carries exactly one
/// request packet and receives at most one reply packet before it is closed.
#[derive(Debug)]
pub struct SeqPacketChannel {
    listener: UnixListener,
    buffer: Vec<u8>,
    guard: EndpointGuard,
}

impl SeqPacketChannel {
    /// Binds and listens on the endpoint, replacing a stale socket file if
    /// one is present.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the socket cannot be created, the path is
    /// in use or is not a socket, or binding or listening fails.
    pub fn bind(endpoint: &ChannelEndpoint) -> Result<Self, ChannelError> {
        let path = endpoint.path().as_std_path();
        clear_stale_socket(path, SockType::SeqPacket)?;
        let address = unix_addr(path)?;
        let fd = socket(
            AddressFamily::Unix,
            SockType::SeqPacket,
            SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(|source| ChannelError::Socket {
            kind: kind_name(SockType::SeqPacket),
            source,
        })?;
        bind(fd.as_raw_fd(), &address).map_err(|source| ChannelError::Bind {
            path: endpoint.path().to_string(),
            source: source.into(),
        })?;
        let guard = EndpointGuard::new(path);

        Backlog::new(LISTEN_BACKLOG)
            .and_then(|backlog| listen(&fd, backlog))
            .map_err(|source| ChannelError::Listen {
                path: endpoint.path().to_string(),
                source,
            })?;
        info!(
            target: TRANSPORT_TARGET,
            %endpoint,
            backlog = LISTEN_BACKLOG,
            "seqpacket endpoint listening"
        );
        Ok(Self {
            listener: UnixListener::from(fd),
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

impl AsFd for SeqPacketChannel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.listener.as_fd()
    }
}

impl Channel for SeqPacketChannel {
    fn serve_one(&mut self, handler: &dyn FrameHandler) -> Result<Served, TransportError> {
        let (mut connection, _) = self
            .listener
            .accept()
            .map_err(|source| TransportError::Accept { source })?;
        connection
            .set_read_timeout(Some(CONNECTION_READ_TIMEOUT))
            .map_err(|source| TransportError::Configure { source })?;

        let len = connection
            .read(&mut self.buffer)
            .map_err(|source| TransportError::Receive { source })?;
        if len == 0 {
            debug!(target: TRANSPORT_TARGET, "connection closed without a request");
            return Ok(Served::Handled);
        }

        let frame = self.buffer.get(..len).unwrap_or_default();
        if let Some(reply) = handler.handle_frame(frame) {
            connection
                .write_all(reply.as_bytes())
                .map_err(|source| TransportError::Send { source })?;
        }
        Ok(Served::Handled)
    }
}
