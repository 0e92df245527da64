use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::time::Duration;

use pwgr_proto::{Answer, MAX_FRAME_LEN, Response, UidRequest};
use tempfile::TempDir;

use crate::{ClientError, DEFAULT_READ_TIMEOUT};

/// Client for the datagram daemon.
///
/// Owns a socket bound inside a private temporary directory; the directory is
/// removed when the client is dropped.
#[derive(Debug)]
pub struct UidClient {
    socket: UnixDatagram,
    _dir: TempDir,
}

impl UidClient {
    /// Binds a reply socket and connects it to the daemon at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] when the reply socket cannot be
    /// bound or the daemon's socket cannot be reached.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let server = path.as_ref();
        let connect_error = |source| ClientError::Connect {
            path: server.display().to_string(),
            source,
        };
        let dir = tempfile::Builder::new()
            .prefix("pwgr-client")
            .tempdir()
            .map_err(connect_error)?;
        let socket = UnixDatagram::bind(dir.path().join("reply.sock")).map_err(connect_error)?;
        socket.connect(server).map_err(connect_error)?;
        socket
            .set_read_timeout(Some(DEFAULT_READ_TIMEOUT))
            .map_err(connect_error)?;
        Ok(Self { socket, _dir: dir })
    }

    /// Replaces the read timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] when the timeout is rejected, for example
    /// because it is zero.
    pub fn set_timeout(&self, timeout: Duration) -> Result<(), ClientError> {
        self.socket
            .set_read_timeout(Some(timeout))
            .map_err(|source| ClientError::Io { source })
    }

    /// Resolves `uid` to a username, `None` when the host has no such user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the reply is
    /// malformed.
    pub fn lookup_uid(&self, uid: u32) -> Result<Option<String>, ClientError> {
        self.socket
            .send(&UidRequest::LookupUserByUid { uid }.encode())
            .map_err(|source| ClientError::Io { source })?;

        let mut reply = vec![0; MAX_FRAME_LEN];
        let len = self
            .socket
            .recv(&mut reply)
            .map_err(ClientError::from_read)?;
        reply.truncate(len);
        match Response::decode_username(&reply)? {
            Response::Ok(Answer::Username(name)) => Ok(Some(name)),
            Response::Err => Ok(None),
            Response::Ok(Answer::Membership(_)) => Err(ClientError::UnexpectedAnswer),
        }
    }
}
