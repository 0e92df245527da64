//! Frame constants, bounded output buffer and integer assembly.

use std::fmt;

use crate::FrameError;

/// Largest frame either side sends or accepts, in bytes.
///
/// The daemons receive into a buffer of exactly this size, so encoders refuse
/// to build anything longer.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

pub(crate) const TAG_LOOKUP_UID: u8 = 0;
pub(crate) const TAG_CHECK_MEMBERSHIP: u8 = 1;

pub(crate) const STATUS_OK: u8 = 0;
pub(crate) const STATUS_ERR: u8 = 1;

pub(crate) const UID_FRAME_LEN: usize = 5;

/// Encoded frame whose length never exceeds [`MAX_FRAME_LEN`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    bytes: Vec<u8>,
}

impl FrameBuffer {
    /// Creates an empty frame.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub(crate) fn single(byte: u8) -> Self {
        Self { bytes: vec![byte] }
    }

    /// Appends one byte.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ResponseTooLarge`] when the frame is already full.
    pub fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        self.extend(&[byte])
    }

    /// Appends `bytes`, leaving the frame untouched if they do not fit.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ResponseTooLarge`] when the result would exceed
    /// [`MAX_FRAME_LEN`].
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        let len = self.bytes.len().saturating_add(bytes.len());
        if len > MAX_FRAME_LEN {
            return Err(FrameError::ResponseTooLarge {
                len,
                max: MAX_FRAME_LEN,
            });
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of encoded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when nothing has been encoded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the frame, returning its bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FrameBuffer")
            .field("len", &self.bytes.len())
            .field("bytes", &self.bytes)
            .finish()
    }
}

/// Builds a `u32` from its little-endian wire bytes.
pub(crate) fn assemble_u32(bytes: [u8; 4]) -> u32 {
    let [b0, b1, b2, b3] = bytes;
    u32::from(b0) | (u32::from(b1) << 8) | (u32::from(b2) << 16) | (u32::from(b3) << 24)
}

/// Splits a `u32` into its little-endian wire bytes.
#[expect(
    clippy::cast_possible_truncation,
    reason = "each value is masked to a single byte before the cast"
)]
pub(crate) const fn split_u32(value: u32) -> [u8; 4] {
    [
        (value & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        ((value >> 16) & 0xff) as u8,
        ((value >> 24) & 0xff) as u8,
    ]
}
