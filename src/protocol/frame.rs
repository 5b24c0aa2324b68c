//! Length-prefixed frame envelope
//!
//! # Wire Format
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Payload Length (4)                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |R|         Key (15)            |          Version (2)          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Record fields ...                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The length excludes itself. `R` is the response flag
//! ([`RESPONSE_FLAG`](super::RESPONSE_FLAG)); the record decoders never
//! interpret it.
//!
//! Reading a frame is two-phase: read [`LENGTH_PREFIX_SIZE`] bytes, pass them
//! to [`FrameConfig::payload_len`], read exactly that many bytes and hand them
//! to [`decode_payload`].

use bytes::{BufMut, Bytes, BytesMut};

use super::codec::{self, Cursor, Decode, Encode};
use super::{Error, Result};

/// Size of the frame length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default frame size limit (1 MiB), the broker's default `frame_max`
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 1_048_576;

/// Frame acceptance limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameConfig {
    /// Largest accepted payload length in bytes; 0 disables the check.
    pub max_frame_size: u32,
}

impl FrameConfig {
    /// Configuration without a size limit.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { max_frame_size: 0 }
    }

    /// Validate a payload length against the limit.
    pub fn check(&self, size: u32) -> Result<()> {
        if self.max_frame_size != 0 && size > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                size,
                max: self.max_frame_size,
            });
        }
        Ok(())
    }

    /// First phase of a frame read: decode and validate the length prefix.
    pub fn payload_len(&self, prefix: [u8; LENGTH_PREFIX_SIZE]) -> Result<usize> {
        let size = read_length(prefix);
        self.check(size)?;
        Ok(usize::try_from(size).unwrap_or(usize::MAX))
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Decode a frame length prefix.
#[must_use]
pub const fn read_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> u32 {
    u32::from_be_bytes(prefix)
}

/// Second phase of a frame read: decode a record that must span the whole
/// payload.
///
/// # Errors
///
/// Returns the record's decode error, or [`Error::TrailingBytes`] if the
/// record ends before the payload does.
pub fn decode_payload<T: Decode>(payload: Bytes) -> Result<T> {
    let delivered = payload.len();
    let (value, consumed) = codec::decode::<T>(payload)?;
    if consumed != delivered {
        return Err(Error::TrailingBytes {
            consumed,
            delivered,
        });
    }
    Ok(value)
}

/// Read the raw key opening a frame payload, response flag included.
pub fn peek_key(payload: &[u8]) -> Result<u16> {
    match payload {
        [high, low, ..] => Ok(u16::from_be_bytes([*high, *low])),
        _ => Err(Error::InsufficientData {
            needed: 2,
            available: payload.len(),
        }),
    }
}

/// Encode `value` with its length prefix.
pub fn encode_frame<T: Encode + ?Sized>(value: &T) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + value.encoded_len());
    write_frame(value, &mut buf)?;
    Ok(buf.freeze())
}

fn write_frame<T: Encode + ?Sized>(value: &T, buf: &mut BytesMut) -> Result<()> {
    let start = buf.len();
    buf.put_u32(0);
    value.encode(buf)?;

    // the prefix covers what was actually written, not the size estimate
    let written = buf.len() - start - LENGTH_PREFIX_SIZE;
    let size = u32::try_from(written).map_err(|_| Error::PayloadTooLarge {
        size: written,
        max: u32::MAX as usize,
    })?;
    buf[start..start + LENGTH_PREFIX_SIZE].copy_from_slice(&size.to_be_bytes());
    Ok(())
}

/// A record wrapped in its length-prefixed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<T> {
    value: T,
}

impl<T> Frame<T> {
    /// Wrap a record
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Borrow the record
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Unwrap the record
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Encode> Frame<T> {
    /// Encode to bytes, length prefix included
    pub fn to_bytes(&self) -> Result<Bytes> {
        encode_frame(&self.value)
    }
}

impl<T: Decode> Frame<T> {
    /// Decode one frame from the start of `bytes`, returning it with the number
    /// of bytes consumed (length prefix included).
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<(Self, usize)> {
        codec::decode(bytes)
    }
}

impl<T: Encode> Encode for Frame<T> {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        write_frame(&self.value, buf)
    }

    fn encoded_len(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.value.encoded_len()
    }
}

impl<T: Decode> Decode for Frame<T> {
    fn decode(cursor: &mut Cursor) -> Result<Self> {
        let size: u32 = cursor.read_int()?;
        let payload = cursor.take(usize::try_from(size).unwrap_or(usize::MAX))?;
        decode_payload(payload).map(Self::new)
    }
}

impl<T> From<T> for Frame<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
