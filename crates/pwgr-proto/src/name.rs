//! Borrowed user and group names.

use std::fmt;

/// A NUL-free user or group name borrowed from a frame.
///
/// Names are raw bytes. The identity directory only holds UTF-8 names, but the
/// decoder does not insist on it: a name that is not UTF-8 simply never
/// matches anything.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name<'a> {
    bytes: &'a [u8],
}

impl<'a> Name<'a> {
    /// Wraps `bytes` if they contain no NUL byte.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Option<Self> {
        if bytes.contains(&0) {
            None
        } else {
            Some(Self { bytes })
        }
    }

    /// Wraps bytes already known to be NUL-free.
    pub(crate) const fn from_terminated(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Raw name bytes, without terminator.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The name as text, when it is valid UTF-8.
    #[must_use]
    pub fn to_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }
}

impl fmt::Debug for Name<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:?}", String::from_utf8_lossy(self.bytes))
    }
}

impl fmt::Display for Name<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&String::from_utf8_lossy(self.bytes))
    }
}
