//! Request frames and their decoders.
//!
//! Each transport owns a closed request type: [`UidRequest`] for the datagram
//! daemon and [`Request`] for the seqpacket daemon. Decoding validates the tag
//! first and then insists the frame length matches the payload shape for that
//! tag. Names are located with a bounded scan for their terminator, so a
//! truncated or unterminated frame is rejected instead of over-read.

use crate::frame::{
    FrameBuffer, TAG_CHECK_MEMBERSHIP, TAG_LOOKUP_UID, UID_FRAME_LEN, assemble_u32, split_u32,
};
use crate::{FrameError, MalformedReason, Name, NameField};

/// Requests understood by the seqpacket daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    /// Resolve a numeric user id to its username.
    LookupUserByUid {
        /// User id to resolve.
        uid: u32,
    },
    /// Check whether `username` is listed as a member of `group`.
    CheckGroupMembership {
        /// User to look for.
        username: Name<'a>,
        /// Group whose member list is searched.
        group: Name<'a>,
    },
}

impl<'a> Request<'a> {
    /// Decodes an untrusted frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownRequestType`] for tags outside the table and
    /// [`FrameError::MalformedFrame`] when the length or terminators do not fit
    /// the tag's payload shape.
    pub fn decode(frame: &'a [u8]) -> Result<Self, FrameError> {
        let Some((&tag, payload)) = frame.split_first() else {
            return Err(FrameError::malformed(MalformedReason::Empty));
        };
        match tag {
            TAG_LOOKUP_UID => decode_uid(frame).map(|uid| Self::LookupUserByUid { uid }),
            TAG_CHECK_MEMBERSHIP => decode_membership(payload),
            other => Err(FrameError::UnknownRequestType { tag: other }),
        }
    }

    /// Builds a membership request from text names.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InteriorNul`] when either name contains a NUL.
    pub fn membership(user: &'a str, group_name: &'a str) -> Result<Self, FrameError> {
        let username = Name::new(user.as_bytes()).ok_or(FrameError::InteriorNul {
            field: NameField::Username,
        })?;
        let group = Name::new(group_name.as_bytes()).ok_or(FrameError::InteriorNul {
            field: NameField::Group,
        })?;
        Ok(Self::CheckGroupMembership { username, group })
    }

    /// Leading tag byte for this request.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::LookupUserByUid { .. } => TAG_LOOKUP_UID,
            Self::CheckGroupMembership { .. } => TAG_CHECK_MEMBERSHIP,
        }
    }

    /// Encodes the request as a client would send it.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ResponseTooLarge`] when the names do not fit in a
    /// single frame.
    pub fn encode(&self) -> Result<FrameBuffer, FrameError> {
        let mut frame = FrameBuffer::new();
        frame.push(self.tag())?;
        match self {
            Self::LookupUserByUid { uid } => frame.extend(&split_u32(*uid))?,
            Self::CheckGroupMembership { username, group } => {
                frame.extend(username.as_bytes())?;
                frame.push(0)?;
                frame.extend(group.as_bytes())?;
                frame.push(0)?;
            }
        }
        Ok(frame)
    }
}

/// Requests understood by the datagram daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidRequest {
    /// Resolve a numeric user id to its username.
    LookupUserByUid {
        /// User id to resolve.
        uid: u32,
    },
}

impl UidRequest {
    /// Decodes an untrusted frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownRequestType`] for any tag other than the
    /// uid lookup, including the membership tag, and
    /// [`FrameError::MalformedFrame`] when the frame is not five bytes.
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        match frame.first() {
            None => Err(FrameError::malformed(MalformedReason::Empty)),
            Some(&TAG_LOOKUP_UID) => decode_uid(frame).map(|uid| Self::LookupUserByUid { uid }),
            Some(&other) => Err(FrameError::UnknownRequestType { tag: other }),
        }
    }

    /// Encodes the request as a client would send it.
    #[must_use]
    pub fn encode(&self) -> [u8; UID_FRAME_LEN] {
        let Self::LookupUserByUid { uid } = self;
        let [b0, b1, b2, b3] = split_u32(*uid);
        [TAG_LOOKUP_UID, b0, b1, b2, b3]
    }
}

impl From<UidRequest> for Request<'_> {
    fn from(request: UidRequest) -> Self {
        match request {
            UidRequest::LookupUserByUid { uid } => Self::LookupUserByUid { uid },
        }
    }
}

fn decode_uid(frame: &[u8]) -> Result<u32, FrameError> {
    let Ok([_, b0, b1, b2, b3]) = <[u8; UID_FRAME_LEN]>::try_from(frame) else {
        return Err(FrameError::malformed(MalformedReason::UidLength {
            len: frame.len(),
        }));
    };
    Ok(assemble_u32([b0, b1, b2, b3]))
}

fn decode_membership(payload: &[u8]) -> Result<Request<'_>, FrameError> {
    let (username, rest) = split_terminated(payload, NameField::Username)?;
    let (group, rest) = split_terminated(rest, NameField::Group)?;
    if !rest.is_empty() {
        return Err(FrameError::malformed(MalformedReason::TrailingBytes {
            count: rest.len(),
        }));
    }
    Ok(Request::CheckGroupMembership { username, group })
}

/// Splits a NUL-terminated name off the front of `bytes`.
fn split_terminated(bytes: &[u8], field: NameField) -> Result<(Name<'_>, &[u8]), FrameError> {
    let Some(end) = bytes.iter().position(|byte| *byte == 0) else {
        return Err(FrameError::malformed(MalformedReason::MissingTerminator {
            field,
        }));
    };
    let (name, terminated) = bytes.split_at(end);
    let rest = terminated.get(1..).unwrap_or_default();
    Ok((Name::from_terminated(name), rest))
}
