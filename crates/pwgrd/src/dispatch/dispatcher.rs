//! Frame handling: decode, one directory lookup, encode.

use pwgr_config::Transport;
use pwgr_proto::{FrameBuffer, FrameError, Name, Request, Response, UidRequest};
use tracing::{debug, warn};

use crate::directory::IdentityDirectory;

use super::{DISPATCH_TARGET, DispatchOutcome};

/// Turns one received frame into at most one reply frame.
pub trait FrameHandler {
    /// Handles `frame`, returning the reply or `None` when nothing should be
    /// sent back.
    fn handle_frame(&self, frame: &[u8]) -> Option<FrameBuffer>;
}

/// Frame handler backed by an [`IdentityDirectory`].
#[derive(Debug, Clone)]
pub struct Dispatcher<D> {
    transport: Transport,
    directory: D,
}

impl<D: IdentityDirectory> Dispatcher<D> {
    /// Creates a dispatcher decoding requests for `transport`.
    #[must_use]
    pub const fn new(transport: Transport, directory: D) -> Self {
        Self {
            transport,
            directory,
        }
    }

    /// Transport whose request repertoire this dispatcher accepts.
    #[must_use]
    pub const fn transport(&self) -> Transport {
        self.transport
    }

    /// Decodes `frame` with the decoder of this dispatcher's transport.
    ///
    /// # Errors
    ///
    /// Returns the decoder's [`FrameError`]. The datagram transport rejects
    /// membership requests as an unknown request type.
    pub fn decode<'a>(&self, frame: &'a [u8]) -> Result<Request<'a>, FrameError> {
        match self.transport {
            Transport::Datagram => UidRequest::decode(frame).map(Request::from),
            Transport::SeqPacket => Request::decode(frame),
        }
    }

    /// Answers a decoded request with exactly one directory lookup.
    #[must_use]
    pub fn dispatch(&self, request: &Request<'_>) -> Response {
        let (response, outcome) = match *request {
            Request::LookupUserByUid { uid } => self.lookup_user(uid),
            Request::CheckGroupMembership { username, group } => {
                self.check_membership(username, group)
            }
        };
        debug!(
            target: DISPATCH_TARGET,
            request = ?request,
            outcome = %outcome,
            "request answered"
        );
        response
    }

    fn lookup_user(&self, uid: u32) -> (Response, DispatchOutcome) {
        match self.directory.user_by_uid(uid) {
            Ok(Some(user)) => (Response::username(user.into_name()), DispatchOutcome::Found),
            Ok(None) => (Response::Err, DispatchOutcome::NotFound),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, uid, %error, "user lookup failed");
                (Response::Err, DispatchOutcome::BackendError)
            }
        }
    }

    fn check_membership(&self, username: Name<'_>, group: Name<'_>) -> (Response, DispatchOutcome) {
        let Some(group_name) = group.to_str() else {
            return (Response::Err, DispatchOutcome::InvalidName);
        };
        match self.directory.group_by_name(group_name) {
            Ok(Some(record)) => (
                Response::membership(record.has_member(username.as_bytes())),
                DispatchOutcome::Found,
            ),
            Ok(None) => (Response::Err, DispatchOutcome::NotFound),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, group = group_name, %error, "group lookup failed");
                (Response::Err, DispatchOutcome::BackendError)
            }
        }
    }
}

impl<D: IdentityDirectory> FrameHandler for Dispatcher<D> {
    fn handle_frame(&self, frame: &[u8]) -> Option<FrameBuffer> {
        let request = match self.decode(frame) {
            Ok(request) => request,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    transport = %self.transport,
                    len = frame.len(),
                    %error,
                    "dropping undecodable request"
                );
                return None;
            }
        };

        match self.dispatch(&request).encode() {
            Ok(reply) => Some(reply),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "response does not fit in one frame");
                Some(Response::error_frame())
            }
        }
    }
}
