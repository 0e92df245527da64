//! Command-line surface shared by both daemons.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::{CommandFactory, FromArgMatches, Parser};

use crate::Transport;

/// Positional arguments accepted by the daemons.
#[derive(Parser, Debug)]
#[command(version)]
pub(crate) struct DaemonArgs {
    /// Filesystem path of the Unix socket to bind.
    #[arg(value_name = "SOCKET")]
    pub(crate) socket: Utf8PathBuf,
}

impl DaemonArgs {
    /// Parses `args` under the binary name and description of `transport`.
    pub(crate) fn parse_for<I, T>(transport: Transport, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command()
            .name(transport.binary_name())
            .bin_name(transport.binary_name())
            .about(transport.about());
        let matches = command.try_get_matches_from_mut(args)?;
        Self::from_arg_matches(&matches).map_err(|error| error.format(&mut command))
    }
}
