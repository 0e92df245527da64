//! Single-threaded readiness loop over a channel and a shutdown source.

use std::fmt;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatch::FrameHandler;
use crate::shutdown::ShutdownSource;
use crate::transport::{Channel, Served};

const LOOP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::event_loop");

/// Lifecycle of an [`EventLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for and serving requests.
    Running,
    /// A shutdown request was observed; the current iteration finishes.
    Draining,
    /// The loop has finished.
    Stopped,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown source fired, carrying the signal number when known.
    Shutdown {
        /// Signal that requested shutdown.
        signal: Option<i32>,
    },
    /// The channel reported end of input.
    EndOfInput,
}

impl fmt::Display for StopReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown {
                signal: Some(signal),
            } => write!(formatter, "signal {signal}"),
            Self::Shutdown { signal: None } => formatter.write_str("shutdown request"),
            Self::EndOfInput => formatter.write_str("end of input"),
        }
    }
}

/// Summary returned when the loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopExit {
    /// Why the loop stopped.
    pub reason: StopReason,
    /// Units served, including ones that got no reply.
    pub served: u64,
}

/// Fatal loop failures.
#[derive(Debug, Error)]
pub enum LoopError {
    /// The readiness wait failed with something other than `EINTR`, or
    /// reported one of its descriptors as invalid.
    #[error("readiness wait failed: {source}")]
    Wait {
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
}

#[derive(Debug, Clone, Copy)]
struct Readiness {
    channel: bool,
    shutdown: bool,
}

/// Waits on a [`Channel`] and a [`ShutdownSource`], serving one unit per
/// readiness event until shutdown.
///
/// When a request and a shutdown arrive in the same wait, the request is
/// served first and the loop then stops.
#[derive(Debug)]
pub struct EventLoop<C, S> {
    channel: C,
    shutdown: S,
    state: LoopState,
    served: u64,
    reason: Option<StopReason>,
}

impl<C: Channel, S: ShutdownSource> EventLoop<C, S> {
    /// Builds a loop in the [`LoopState::Running`] state.
    #[must_use]
    pub const fn new(channel: C, shutdown: S) -> Self {
        Self {
            channel,
            shutdown,
            state: LoopState::Running,
            served: 0,
            reason: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Units served so far.
    #[must_use]
    pub const fn served(&self) -> u64 {
        self.served
    }

    /// Runs until the loop stops.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Wait`] when `poll` fails for a reason other than
    /// interruption or reports an invalid descriptor.
    pub fn run(&mut self, handler: &dyn FrameHandler) -> Result<LoopExit, LoopError> {
        info!(target: LOOP_TARGET, "event loop running");
        while self.state != LoopState::Stopped {
            self.turn(handler)?;
        }
        let exit = LoopExit {
            reason: self.reason.unwrap_or(StopReason::EndOfInput),
            served: self.served,
        };
        info!(
            target: LOOP_TARGET,
            reason = %exit.reason,
            served = exit.served,
            "event loop stopped"
        );
        Ok(exit)
    }

    /// Performs one wait and handles whatever became ready.
    ///
    /// # Errors
    ///
    /// See [`EventLoop::run`].
    pub fn turn(&mut self, handler: &dyn FrameHandler) -> Result<LoopState, LoopError> {
        if self.state == LoopState::Stopped {
            return Ok(self.state);
        }
        let ready = self.wait()?;

        if ready.channel {
            self.serve(handler);
        }
        if ready.shutdown && self.state == LoopState::Running {
            let signal = self.shutdown.acknowledge();
            self.transition(LoopState::Draining, StopReason::Shutdown { signal });
        }
        if self.state == LoopState::Draining {
            self.state = LoopState::Stopped;
            debug!(target: LOOP_TARGET, state = ?self.state, "event loop drained");
        }
        Ok(self.state)
    }

    /// Releases the channel and shutdown source.
    #[must_use]
    pub fn into_parts(self) -> (C, S) {
        (self.channel, self.shutdown)
    }

    fn serve(&mut self, handler: &dyn FrameHandler) {
        match self.channel.serve_one(handler) {
            Ok(Served::Handled) => {
                self.served = self.served.saturating_add(1);
            }
            Ok(Served::PeerClosed) => {
                self.transition(LoopState::Stopped, StopReason::EndOfInput);
            }
            Err(error) => {
                warn!(target: LOOP_TARGET, %error, "request abandoned");
            }
        }
    }

    fn transition(&mut self, state: LoopState, reason: StopReason) {
        info!(
            target: LOOP_TARGET,
            from = ?self.state,
            to = ?state,
            %reason,
            "event loop state change"
        );
        self.state = state;
        self.reason = Some(reason);
    }

    fn wait(&self) -> Result<Readiness, LoopError> {
        loop {
            let mut fds = [
                PollFd::new(self.channel.as_fd(), PollFlags::POLLIN),
                PollFd::new(self.shutdown.as_fd(), PollFlags::POLLIN),
            ];
            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) => {
                    let [channel, shutdown] = &fds;
                    if is_invalid(channel) || is_invalid(shutdown) {
                        return Err(LoopError::Wait {
                            source: Errno::EBADF,
                        });
                    }
                    return Ok(Readiness {
                        channel: is_ready(channel),
                        shutdown: is_ready(shutdown),
                    });
                }
                Err(Errno::EINTR) => {
                    debug!(target: LOOP_TARGET, "readiness wait interrupted; retrying");
                }
                Err(source) => return Err(LoopError::Wait { source }),
            }
        }
    }
}

fn is_invalid(fd: &PollFd<'_>) -> bool {
    fd.revents()
        .is_some_and(|events| events.contains(PollFlags::POLLNVAL))
}

fn is_ready(fd: &PollFd<'_>) -> bool {
    fd.revents().is_some_and(|events| {
        events.intersects(PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR)
    })
}
