//! Shared helpers for the daemon's unit and behaviour tests.

use std::os::fd::AsRawFd;
use std::os::unix::net::{UnixDatagram, UnixStream};
use std::path::{Path, PathBuf};

use nix::sys::socket::{AddressFamily, SockFlag, SockType, UnixAddr, connect, socket};
use pwgr_config::ChannelEndpoint;
use tempfile::TempDir;

/// A socket path inside a private temporary directory.
pub(crate) struct TempEndpoint {
    dir: TempDir,
    endpoint: ChannelEndpoint,
}

impl TempEndpoint {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("pwgrd.sock");
        let endpoint = ChannelEndpoint::new(path.to_str().expect("utf8 temp path"));
        Self { dir, endpoint }
    }

    pub(crate) const fn endpoint(&self) -> &ChannelEndpoint {
        &self.endpoint
    }

    pub(crate) fn path(&self) -> &Path {
        self.endpoint.path().as_std_path()
    }

    /// A sibling path for client sockets.
    pub(crate) fn client_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Opens a seqpacket connection to `path`.
pub(crate) fn connect_seqpacket(path: &Path) -> UnixStream {
    let fd = socket(
        AddressFamily::Unix,
        SockType::SeqPacket,
        SockFlag::SOCK_CLOEXEC,
        None,
    )
    .expect("create seqpacket socket");
    let address = UnixAddr::new(path).expect("socket address");
    connect(fd.as_raw_fd(), &address).expect("connect to daemon");
    UnixStream::from(fd)
}

/// Binds a datagram client socket next to the daemon's endpoint.
pub(crate) fn bound_datagram_client(endpoint: &TempEndpoint, name: &str) -> UnixDatagram {
    let client = UnixDatagram::bind(endpoint.client_path(name)).expect("bind client socket");
    client
        .set_read_timeout(Some(std::time::Duration::from_secs(2)))
        .expect("set read timeout");
    client
}
