//! Response frames.

use crate::frame::{FrameBuffer, STATUS_ERR, STATUS_OK};
use crate::{FrameError, MalformedReason};

/// Successful answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Username owning the requested uid.
    Username(String),
    /// Whether the user is listed in the group.
    Membership(bool),
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The lookup succeeded.
    Ok(Answer),
    /// The lookup failed or the record does not exist.
    Err,
}

impl Response {
    /// Successful uid lookup.
    #[must_use]
    pub fn username(name: impl Into<String>) -> Self {
        Self::Ok(Answer::Username(name.into()))
    }

    /// Successful membership check.
    #[must_use]
    pub const fn membership(is_member: bool) -> Self {
        Self::Ok(Answer::Membership(is_member))
    }

    /// Encodes the response for transmission.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ResponseTooLarge`] when a username does not fit
    /// in one frame. Nothing partial is returned.
    pub fn encode(&self) -> Result<FrameBuffer, FrameError> {
        let mut frame = FrameBuffer::new();
        match self {
            Self::Ok(Answer::Username(name)) => {
                frame.push(STATUS_OK)?;
                frame.extend(name.as_bytes())?;
            }
            Self::Ok(Answer::Membership(is_member)) => {
                frame.push(STATUS_OK)?;
                frame.push(u8::from(*is_member))?;
            }
            Self::Err => frame.push(STATUS_ERR)?,
        }
        Ok(frame)
    }

    /// The single-byte error frame.
    #[must_use]
    pub fn error_frame() -> FrameBuffer {
        FrameBuffer::single(STATUS_ERR)
    }

    /// Decodes the reply to a uid lookup.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownResponseStatus`] for an unrecognised status
    /// byte and [`FrameError::MalformedFrame`] for an empty frame, an error
    /// frame with a payload, or a username that is not UTF-8.
    pub fn decode_username(frame: &[u8]) -> Result<Self, FrameError> {
        match split_status(frame)? {
            (STATUS_OK, payload) => String::from_utf8(payload.to_vec())
                .map(Self::username)
                .map_err(|_| FrameError::malformed(MalformedReason::NonUtf8Username)),
            (STATUS_ERR, payload) => decode_error(payload, frame.len()),
            (status, _) => Err(FrameError::UnknownResponseStatus { status }),
        }
    }

    /// Decodes the reply to a membership check.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownResponseStatus`] for an unrecognised status
    /// byte and [`FrameError::MalformedFrame`] when the frame is not exactly
    /// two bytes or the membership byte is not `0` or `1`.
    pub fn decode_membership(frame: &[u8]) -> Result<Self, FrameError> {
        match split_status(frame)? {
            (STATUS_OK, &[value]) => match value {
                0 => Ok(Self::membership(false)),
                1 => Ok(Self::membership(true)),
                other => Err(FrameError::malformed(MalformedReason::MembershipValue {
                    value: other,
                })),
            },
            (STATUS_OK, _) => Err(FrameError::malformed(MalformedReason::MembershipLength {
                len: frame.len(),
            })),
            (STATUS_ERR, payload) => decode_error(payload, frame.len()),
            (status, _) => Err(FrameError::UnknownResponseStatus { status }),
        }
    }
}

fn split_status(frame: &[u8]) -> Result<(u8, &[u8]), FrameError> {
    frame
        .split_first()
        .map(|(status, payload)| (*status, payload))
        .ok_or(FrameError::malformed(MalformedReason::Empty))
}

fn decode_error(payload: &[u8], len: usize) -> Result<Response, FrameError> {
    if payload.is_empty() {
        Ok(Response::Err)
    } else {
        Err(FrameError::malformed(MalformedReason::ErrorPayload { len }))
    }
}
