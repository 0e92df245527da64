//! Request dispatch for both daemon variants.
//!
//! A channel hands every received frame to a [`FrameHandler`]. The production
//! handler is [`Dispatcher`], which decodes the frame with the decoder of its
//! transport, performs exactly one directory lookup and encodes exactly one
//! response:
//!
//! | Request | Lookup | Response |
//! |---|---|---|
//! | uid lookup, user exists | `user_by_uid` | `0` + username |
//! | uid lookup, no user | `user_by_uid` | `1` |
//! | membership, group exists | `group_by_name` | `0` + `0`/`1` |
//! | membership, no group | `group_by_name` | `1` |
//! | undecodable frame | none | nothing is sent |
//!
//! Backend failures are logged and answered like a missing record.

mod dispatcher;
mod outcome;

pub use self::dispatcher::{Dispatcher, FrameHandler};
pub use self::outcome::DispatchOutcome;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
