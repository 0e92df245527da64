use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Longest path a Unix socket address can carry, excluding the terminating
/// NUL of `sun_path`.
pub const MAX_SOCKET_PATH_LEN: usize = 107;

/// Filesystem location of a daemon socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEndpoint {
    path: Utf8PathBuf,
}

impl ChannelEndpoint {
    /// Builds an endpoint for `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Socket path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Checks that the path can be bound as a Unix socket address.
    ///
    /// The parent directory must already exist; the daemons never create it
    /// because its ownership and mode are the supervisor's business.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the path is empty, too long for
    /// `sun_path`, or names a missing parent directory.
    pub fn validate(&self) -> Result<(), EndpointError> {
        let len = self.path.as_str().len();
        if len == 0 {
            return Err(EndpointError::Empty);
        }
        if len > MAX_SOCKET_PATH_LEN {
            return Err(EndpointError::PathTooLong {
                path: self.path.clone(),
                len,
                max: MAX_SOCKET_PATH_LEN,
            });
        }

        let parent = match self.path.parent() {
            Some(parent) if parent.as_str().is_empty() => Utf8Path::new("."),
            Some(parent) => parent,
            None => {
                return Err(EndpointError::MissingParent {
                    path: self.path.clone(),
                });
            }
        };
        if !parent.is_dir() {
            return Err(EndpointError::MissingParent {
                path: self.path.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ChannelEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "unix://{}", self.path)
    }
}

/// Reasons a socket path cannot be bound.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The path was empty.
    #[error("socket path is empty")]
    Empty,
    /// The path does not fit in a Unix socket address.
    #[error("socket path '{path}' is {len} bytes long; the limit is {max}")]
    PathTooLong {
        /// Offending path.
        path: Utf8PathBuf,
        /// Its length in bytes.
        len: usize,
        /// Largest accepted length.
        max: usize,
    },
    /// The directory that should contain the socket does not exist.
    #[error("socket path '{path}' has no existing parent directory")]
    MissingParent {
        /// Offending path.
        path: Utf8PathBuf,
    },
}
