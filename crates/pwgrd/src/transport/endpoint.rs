//! Socket-file lifecycle shared by both channels.

use std::fs;
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::socket::{AddressFamily, SockFlag, SockType, UnixAddr, connect, socket};
use tracing::{debug, warn};

use super::{ChannelError, TRANSPORT_TARGET};

/// Removes the socket file when dropped.
///
/// Created immediately after a successful bind so that every later exit path,
/// including fatal errors, leaves no socket file behind.
#[derive(Debug)]
pub struct EndpointGuard {
    path: PathBuf,
}

impl EndpointGuard {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Path that will be removed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for EndpointGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(
                target: TRANSPORT_TARGET,
                path = %self.path.display(),
                "removed unix socket file"
            ),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(
                target: TRANSPORT_TARGET,
                error = %error,
                path = %self.path.display(),
                "failed to remove unix socket file"
            ),
        }
    }
}

/// Prepares `path` for binding a socket of type `kind`.
///
/// A missing path is fine. An existing socket that refuses connections is a
/// leftover from a previous run and is removed. A socket that accepts a
/// connection belongs to a live daemon and anything that is not a socket is
/// left alone; both are errors.
pub(crate) fn clear_stale_socket(path: &Path, kind: SockType) -> Result<(), ChannelError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(ChannelError::Metadata {
                path: path.display().to_string(),
                source,
            });
        }
    };
    if !metadata.file_type().is_socket() {
        return Err(ChannelError::NotSocket {
            path: path.display().to_string(),
        });
    }

    match probe(path, kind) {
        Ok(()) => Err(ChannelError::InUse {
            path: path.display().to_string(),
        }),
        Err(Errno::ECONNREFUSED | Errno::ENOENT) => {
            fs::remove_file(path).map_err(|source| ChannelError::Cleanup {
                path: path.display().to_string(),
                source,
            })?;
            debug!(
                target: TRANSPORT_TARGET,
                path = %path.display(),
                "removed stale unix socket"
            );
            Ok(())
        }
        Err(source) => Err(ChannelError::Probe {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Encodes `path` as a Unix socket address.
pub(crate) fn unix_addr(path: &Path) -> Result<UnixAddr, ChannelError> {
    UnixAddr::new(path).map_err(|source| ChannelError::Address {
        path: path.display().to_string(),
        source,
    })
}

fn probe(path: &Path, kind: SockType) -> Result<(), Errno> {
    let address = UnixAddr::new(path)?;
    let client = socket(AddressFamily::Unix, kind, SockFlag::SOCK_CLOEXEC, None)?;
    connect(client.as_raw_fd(), &address)
}

pub(crate) const fn kind_name(kind: SockType) -> &'static str {
    match kind {
        SockType::Datagram => "datagram",
        SockType::SeqPacket => "seqpacket",
        SockType::Stream => "stream",
        _ => "unix",
    }
}
