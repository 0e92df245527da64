//! Error types for frame decoding and encoding.

use std::fmt;

use thiserror::Error;

/// Errors surfaced while decoding or encoding protocol frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Frame length or layout does not match the shape implied by its tag.
    #[error("malformed frame: {reason}")]
    MalformedFrame {
        /// What was wrong with the frame.
        reason: MalformedReason,
    },
    /// The request tag is not part of the repertoire being decoded.
    #[error("unknown request type {tag}")]
    UnknownRequestType {
        /// Leading byte of the rejected frame.
        tag: u8,
    },
    /// The response status byte is neither OK nor ERR.
    #[error("unknown response status {status}")]
    UnknownResponseStatus {
        /// Leading byte of the rejected frame.
        status: u8,
    },
    /// Encoding would produce a frame larger than the receive buffer.
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    ResponseTooLarge {
        /// Length the frame would have reached.
        len: usize,
        /// Maximum permitted frame length.
        max: usize,
    },
    /// A name destined for a NUL-terminated field contains a NUL byte.
    #[error("{field} contains an interior NUL byte")]
    InteriorNul {
        /// Field holding the offending name.
        field: NameField,
    },
}

impl FrameError {
    pub(crate) const fn malformed(reason: MalformedReason) -> Self {
        Self::MalformedFrame { reason }
    }
}

/// Detail attached to [`FrameError::MalformedFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The frame contained no bytes at all.
    Empty,
    /// A uid request was not exactly five bytes long.
    UidLength {
        /// Received frame length.
        len: usize,
    },
    /// No NUL terminator was found for a name within the frame.
    MissingTerminator {
        /// Field whose terminator is missing.
        field: NameField,
    },
    /// Bytes followed the final terminator of a membership request.
    TrailingBytes {
        /// Number of unexpected bytes.
        count: usize,
    },
    /// A status-only error response carried a payload.
    ErrorPayload {
        /// Received frame length.
        len: usize,
    },
    /// A membership response was not exactly two bytes long.
    MembershipLength {
        /// Received frame length.
        len: usize,
    },
    /// A membership response carried a byte other than `0` or `1`.
    MembershipValue {
        /// Received membership byte.
        value: u8,
    },
    /// A username response was not valid UTF-8.
    NonUtf8Username,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("empty frame"),
            Self::UidLength { len } => {
                write!(formatter, "uid request must be 5 bytes, got {len}")
            }
            Self::MissingTerminator { field } => {
                write!(formatter, "{field} is not NUL-terminated within the frame")
            }
            Self::TrailingBytes { count } => {
                write!(formatter, "{count} trailing bytes after group name")
            }
            Self::ErrorPayload { len } => {
                write!(formatter, "error response must be 1 byte, got {len}")
            }
            Self::MembershipLength { len } => {
                write!(formatter, "membership response must be 2 bytes, got {len}")
            }
            Self::MembershipValue { value } => {
                write!(formatter, "membership byte must be 0 or 1, got {value}")
            }
            Self::NonUtf8Username => formatter.write_str("username is not valid UTF-8"),
        }
    }
}

/// Name fields carried by a membership request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    /// The user whose membership is being checked.
    Username,
    /// The group being searched.
    Group,
}

impl fmt::Display for NameField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Username => "username",
            Self::Group => "group name",
        })
    }
}
