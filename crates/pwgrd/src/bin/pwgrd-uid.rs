//! `pwgrd-uid`: uid lookups over `SOCK_DGRAM`.

use std::process::ExitCode;

use pwgr_config::Transport;

fn main() -> ExitCode {
    pwgrd::run_daemon(Transport::Datagram)
}
