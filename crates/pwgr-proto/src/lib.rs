//! Wire codec for the passwd/group lookup proxy.
//!
//! Sandboxed clients cannot read the host's user and group databases, so they
//! ask a trusted daemon over a Unix socket. Every exchange is one request frame
//! followed by at most one response frame. Frames never carry an explicit
//! length: the socket types used (`SOCK_DGRAM` and `SOCK_SEQPACKET`) preserve
//! message boundaries, so the length of a frame is the length of the message.
//!
//! ## Requests
//!
//! | Tag | Request | Payload |
//! |-----|---------|---------|
//! | `0` | [`Request::LookupUserByUid`] | 4-byte little-endian uid |
//! | `1` | [`Request::CheckGroupMembership`] | NUL-terminated username, then NUL-terminated group |
//!
//! The datagram daemon only understands tag `0`; its requests decode through
//! [`UidRequest`], which has no membership variant.
//!
//! ## Responses
//!
//! A successful response starts with status byte `0` followed by either the
//! raw username bytes or a single membership byte. A failed lookup is the
//! single byte `1`. Both successful shapes share status `0`, so clients decode
//! with the helper matching the question they asked
//! ([`Response::decode_username`] or [`Response::decode_membership`]).
//!
//! Nothing in this crate performs I/O. Decoding never reads outside the
//! supplied buffer and encoding never grows a frame beyond
//! [`MAX_FRAME_LEN`].

mod error;
mod frame;
mod name;
mod request;
mod response;

pub use error::{FrameError, MalformedReason, NameField};
pub use frame::{FrameBuffer, MAX_FRAME_LEN};
pub use name::Name;
pub use request::{Request, UidRequest};
pub use response::{Answer, Response};
