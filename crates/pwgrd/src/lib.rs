//! Daemons answering passwd and group questions for sandboxed clients.
//!
//! A sandboxed process cannot read the host's user and group databases. It
//! sends a small binary request over a Unix socket to one of two trusted
//! daemons, which answers from the host's identity directory:
//!
//! - `pwgrd-uid` binds a `SOCK_DGRAM` socket and answers uid-to-username
//!   lookups, replying to the sender's address.
//! - `pwgrd` binds a `SOCK_SEQPACKET` socket and additionally answers "is this
//!   user a member of this group", one request per connection.
//!
//! Both run the same single-threaded [`EventLoop`]: `poll` waits on the socket
//! and on a [`SignalPipe`] fed by `SIGINT`/`SIGTERM`. Each readiness event
//! serves one request to completion through the [`Dispatcher`], and a
//! termination signal stops the loop after the current request. The socket
//! file is removed on every exit path once it has been bound.
//!
//! Access control is the socket file's permissions; peers are not
//! authenticated otherwise. Frame layouts live in [`pwgr_proto`].

mod directory;
mod dispatch;
mod event_loop;
mod process;
mod shutdown;
mod telemetry;
mod transport;

pub use directory::{
    GroupRecord, IdentityDirectory, LookupError, MemoryDirectory, SystemDirectory, UserRecord,
};
pub use dispatch::{DispatchOutcome, Dispatcher, FrameHandler};
pub use event_loop::{EventLoop, LoopError, LoopExit, LoopState, StopReason};
pub use process::{
    EXIT_BIND, EXIT_SIGNAL, EXIT_SOCKET, EXIT_TELEMETRY, EXIT_USAGE, EXIT_WAIT, LaunchError,
    run_daemon, run_with, serve,
};
pub use shutdown::{
    ManualShutdown, ShutdownError, ShutdownSource, ShutdownTrigger, SignalPipe,
    TERMINATION_SIGNALS,
};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};
pub use transport::{
    CONNECTION_READ_TIMEOUT, Channel, ChannelError, DatagramChannel, EndpointGuard,
    LISTEN_BACKLOG, SeqPacketChannel, Served, TransportError,
};

#[cfg(test)]
mod tests;
