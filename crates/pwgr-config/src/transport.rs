use strum::{Display, EnumString};

/// Socket type served by a daemon, which also fixes its request repertoire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Transport {
    /// `SOCK_DGRAM`: uid lookups only, replies go to the sender's address.
    Datagram,
    /// `SOCK_SEQPACKET`: uid lookups and membership checks, one request per
    /// connection.
    #[strum(serialize = "seqpacket")]
    SeqPacket,
}

impl Transport {
    /// Name of the binary serving this transport.
    #[must_use]
    pub const fn binary_name(self) -> &'static str {
        match self {
            Self::Datagram => "pwgrd-uid",
            Self::SeqPacket => "pwgrd",
        }
    }

    /// One-line description used in `--help` output.
    #[must_use]
    pub const fn about(self) -> &'static str {
        match self {
            Self::Datagram => "Answers uid-to-username lookups over a Unix datagram socket",
            Self::SeqPacket => {
                "Answers uid-to-username lookups and group membership checks over a Unix seqpacket socket"
            }
        }
    }
}
