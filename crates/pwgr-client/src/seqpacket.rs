use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::sys::socket::{AddressFamily, SockFlag, SockType, UnixAddr, connect, socket};
use pwgr_proto::{Answer, MAX_FRAME_LEN, Request, Response, UidRequest};

use crate::{ClientError, DEFAULT_READ_TIMEOUT};

/// Client for the seqpacket daemon.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    path: PathBuf,
    timeout: Duration,
}

impl ProxyClient {
    /// Client for the daemon listening at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Replaces the read timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Daemon socket path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves `uid` to a username, `None` when the host has no such user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the reply is
    /// malformed.
    pub fn lookup_uid(&self, uid: u32) -> Result<Option<String>, ClientError> {
        let request = Request::from(UidRequest::LookupUserByUid { uid }).encode()?;
        let reply = self.exchange(request.as_bytes())?;
        match Response::decode_username(&reply)? {
            Response::Ok(Answer::Username(name)) => Ok(Some(name)),
            Response::Err => Ok(None),
            Response::Ok(Answer::Membership(_)) => Err(ClientError::UnexpectedAnswer),
        }
    }

    /// Checks whether `username` is listed in `group`, `None` when the host
    /// has no such group.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when either name contains a NUL, the exchange
    /// fails or the reply is malformed.
    pub fn user_is_member(&self, username: &str, group: &str) -> Result<Option<bool>, ClientError> {
        let request = Request::membership(username, group)?.encode()?;
        let reply = self.exchange(request.as_bytes())?;
        match Response::decode_membership(&reply)? {
            Response::Ok(Answer::Membership(is_member)) => Ok(Some(is_member)),
            Response::Err => Ok(None),
            Response::Ok(Answer::Username(_)) => Err(ClientError::UnexpectedAnswer),
        }
    }

    fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>, ClientError> {
        let mut connection = self.connect()?;
        connection
            .write_all(frame)
            .map_err(|source| ClientError::Io { source })?;
        connection
            .set_read_timeout(Some(self.timeout))
            .map_err(|source| ClientError::Io { source })?;

        let mut reply = vec![0; MAX_FRAME_LEN];
        let len = connection.read(&mut reply).map_err(ClientError::from_read)?;
        if len == 0 {
            return Err(ClientError::NoReply);
        }
        reply.truncate(len);
        Ok(reply)
    }

    fn connect(&self) -> Result<UnixStream, ClientError> {
        let connect_error = |source: io::Error| ClientError::Connect {
            path: self.path.display().to_string(),
            source,
        };
        let fd = socket(
            AddressFamily::Unix,
            SockType::SeqPacket,
            SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(|errno| connect_error(errno.into()))?;
        let address = UnixAddr::new(self.path.as_path()).map_err(|errno| connect_error(errno.into()))?;
        connect(fd.as_raw_fd(), &address).map_err(|errno| connect_error(errno.into()))?;
        Ok(UnixStream::from(fd))
    }
}
