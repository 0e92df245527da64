//! Termination signal sources the event loop can wait on.
//!
//! Signals are turned into readable bytes on a socket pair (the self-pipe
//! trick) so that `poll` can wait for a request and for shutdown at the same
//! time.

use std::io::{self, Read, Write};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use signal_hook::SigId;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::{flag, low_level};
use thiserror::Error;
use tracing::{debug, warn};

const SHUTDOWN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::shutdown");

/// Signals that stop the daemons.
pub const TERMINATION_SIGNALS: [i32; 2] = [SIGINT, SIGTERM];

/// Something the event loop can poll for a shutdown request.
pub trait ShutdownSource: AsFd {
    /// Drains pending wake-ups. Returns the signal that caused them when it
    /// is known.
    fn acknowledge(&mut self) -> Option<i32>;
}

/// Errors raised while arming a shutdown source.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Creating or configuring the wake-up socket pair failed.
    #[error("failed to create shutdown wake-up pipe: {source}")]
    Pipe {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Registering a signal handler failed.
    #[error("failed to register handler for signal {signal}: {source}")]
    Register {
        /// Signal being registered.
        signal: i32,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown source fed by `SIGINT` and `SIGTERM`.
///
/// Both handlers for each signal are unregistered when the value is dropped.
#[derive(Debug)]
pub struct SignalPipe {
    reader: UnixStream,
    last_signal: Arc<AtomicUsize>,
    registrations: Vec<SigId>,
}

impl SignalPipe {
    /// Installs handlers for [`TERMINATION_SIGNALS`].
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the socket pair cannot be created or a
    /// handler cannot be registered. Handlers registered before the failure
    /// are removed again.
    pub fn arm() -> Result<Self, ShutdownError> {
        let (reader, writer) = nonblocking_pair()?;
        let mut pipe = Self {
            reader,
            last_signal: Arc::new(AtomicUsize::new(0)),
            registrations: Vec::with_capacity(TERMINATION_SIGNALS.len() * 2),
        };
        for signal in TERMINATION_SIGNALS {
            pipe.register(signal, &writer)?;
        }
        debug!(target: SHUTDOWN_TARGET, signals = ?TERMINATION_SIGNALS, "signal handlers armed");
        Ok(pipe)
    }

    fn register(&mut self, signal: i32, writer: &UnixStream) -> Result<(), ShutdownError> {
        let register_error = |source| ShutdownError::Register { signal, source };
        let marker = usize::try_from(signal).map_err(|_| {
            register_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "negative signal number",
            ))
        })?;
        let recorded = flag::register_usize(signal, Arc::clone(&self.last_signal), marker)
            .map_err(register_error)?;
        self.registrations.push(recorded);

        let wake_end = writer
            .try_clone()
            .map_err(|source| ShutdownError::Pipe { source })?;
        let woken = low_level::pipe::register(signal, wake_end).map_err(register_error)?;
        self.registrations.push(woken);
        Ok(())
    }
}

impl AsFd for SignalPipe {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.reader.as_fd()
    }
}

impl ShutdownSource for SignalPipe {
    fn acknowledge(&mut self) -> Option<i32> {
        drain(&mut self.reader);
        let signal = self.last_signal.swap(0, Ordering::SeqCst);
        i32::try_from(signal).ok().filter(|&number| number != 0)
    }
}

impl Drop for SignalPipe {
    fn drop(&mut self) {
        for id in self.registrations.drain(..) {
            if !low_level::unregister(id) {
                debug!(target: SHUTDOWN_TARGET, "signal handler was already removed");
            }
        }
    }
}

/// In-process shutdown source for embedding and tests.
#[derive(Debug)]
pub struct ManualShutdown {
    reader: UnixStream,
}

/// Fires a [`ManualShutdown`]; may be moved to another thread.
#[derive(Debug)]
pub struct ShutdownTrigger {
    writer: UnixStream,
}

impl ManualShutdown {
    /// Creates a source and the trigger that fires it.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Pipe`] when the socket pair cannot be created.
    pub fn new() -> Result<(Self, ShutdownTrigger), ShutdownError> {
        let (reader, writer) = nonblocking_pair()?;
        Ok((Self { reader }, ShutdownTrigger { writer }))
    }
}

impl AsFd for ManualShutdown {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.reader.as_fd()
    }
}

impl ShutdownSource for ManualShutdown {
    fn acknowledge(&mut self) -> Option<i32> {
        drain(&mut self.reader);
        None
    }
}

impl ShutdownTrigger {
    /// Requests shutdown.
    ///
    /// # Errors
    ///
    /// Returns the write error unless the wake-up is already pending.
    pub fn fire(&self) -> io::Result<()> {
        match (&self.writer).write(&[1]) {
            Ok(_) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(error) => Err(error),
        }
    }
}

fn nonblocking_pair() -> Result<(UnixStream, UnixStream), ShutdownError> {
    let pipe_error = |source| ShutdownError::Pipe { source };
    let (reader, writer) = UnixStream::pair().map_err(pipe_error)?;
    reader.set_nonblocking(true).map_err(pipe_error)?;
    writer.set_nonblocking(true).map_err(pipe_error)?;
    Ok((reader, writer))
}

fn drain(reader: &mut UnixStream) {
    let mut scratch = [0_u8; 32];
    loop {
        match reader.read(&mut scratch) {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => {
                if error.kind() != io::ErrorKind::WouldBlock {
                    warn!(target: SHUTDOWN_TARGET, %error, "failed to drain shutdown pipe");
                }
                break;
            }
        }
    }
}
