//! `pwgrd`: uid lookups and group membership checks over `SOCK_SEQPACKET`.

use std::process::ExitCode;

use pwgr_config::Transport;

fn main() -> ExitCode {
    pwgrd::run_daemon(Transport::SeqPacket)
}
