//! Stream protocol codec (encode/decode)
//!
//! Every wire value implements [`Encode`] and [`Decode`]. Encoding appends to a
//! `BytesMut`; decoding reads from a [`Cursor`] over a shared `Bytes` buffer, so
//! opaque payloads come back as zero-copy slices of the input.

use bytes::{Bytes, BytesMut};

use super::primitive::FixedWidth;
use super::{Error, Result};

/// A value with a defined wire encoding.
pub trait Encode {
    /// Append the wire encoding of `self` to `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if a string, blob or sequence is
    /// longer than its length prefix can describe.
    fn encode(&self, buf: &mut BytesMut) -> Result<()>;

    /// Exact number of bytes [`Encode::encode`] will append.
    fn encoded_len(&self) -> usize;
}

/// A value that can be read back from its wire encoding.
pub trait Decode: Sized {
    /// Decode one value starting at the cursor position, advancing the cursor
    /// past the bytes consumed.
    fn decode(cursor: &mut Cursor) -> Result<Self>;
}

/// Read position over an immutable input buffer.
///
/// The cursor never reads past the end of its buffer: every read first checks
/// the remaining length and fails with [`Error::InsufficientData`].
#[derive(Debug, Clone)]
pub struct Cursor {
    bytes: Bytes,
    position: usize,
}

impl Cursor {
    /// Create a cursor at the start of `bytes`.
    #[must_use]
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Whether the input is fully consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn advance(&mut self, len: usize) -> Result<std::ops::Range<usize>> {
        let available = self.remaining();
        if len > available {
            return Err(Error::InsufficientData {
                needed: len,
                available,
            });
        }
        let start = self.position;
        self.position += len;
        Ok(start..self.position)
    }

    /// Take the next `len` bytes as a shared slice of the input.
    pub fn take(&mut self, len: usize) -> Result<Bytes> {
        let range = self.advance(len)?;
        Ok(self.bytes.slice(range))
    }

    /// Read one big-endian fixed-width integer.
    pub fn read_int<T: FixedWidth>(&mut self) -> Result<T> {
        let range = self.advance(T::WIDTH)?;
        let available = range.len();
        T::from_be_slice(&self.bytes[range]).ok_or(Error::InsufficientData {
            needed: T::WIDTH,
            available,
        })
    }

    /// Decode the next value of type `T`.
    pub fn read<T: Decode>(&mut self) -> Result<T> {
        T::decode(self)
    }

    /// Run `read` for the record field `name`, tagging any failure with it.
    pub fn field<T>(
        &mut self,
        name: &'static str,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        read(self).map_err(|err| err.in_field(name))
    }
}

/// Encode a value into a fresh buffer.
///
/// # Format
///
/// The concatenated encodings of the value's fields in declared order; no
/// framing is added (see [`super::Frame`] for the length-prefixed envelope).
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(value.encoded_len());
    value.encode(&mut buf)?;
    Ok(buf.freeze())
}

/// Decode a value from the start of `bytes`.
///
/// Returns the value together with the number of bytes consumed. Trailing
/// bytes are left untouched; use [`super::frame::decode_payload`] when the
/// value must account for the whole input.
///
/// # Errors
///
/// Returns an error if:
/// - The input ends before the value does
/// - A text field is not UTF-8
/// - A sibling count field cannot be used as an element count
pub fn decode<T: Decode>(bytes: impl Into<Bytes>) -> Result<(T, usize)> {
    let mut cursor = Cursor::new(bytes.into());
    let value = T::decode(&mut cursor)?;
    Ok((value, cursor.position()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_checks_bounds() {
        let mut cursor = Cursor::new(Bytes::from_static(&[1, 2, 3]));
        assert_eq!(cursor.take(2).unwrap().as_ref(), &[1, 2]);
        assert_eq!(cursor.position(), 2);

        let err = cursor.take(2).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData {
                needed: 2,
                available: 1
            }
        ));
        // failed reads leave the position alone
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_field_tags_errors() {
        let mut cursor = Cursor::new(Bytes::from_static(&[0]));
        let err = cursor
            .field("credit", |cursor| cursor.read_int::<u16>())
            .unwrap_err();
        assert_eq!(err.path(), "credit");
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_decode_reports_consumed() {
        let (value, consumed) = decode::<u16>(vec![0x00, 0x11, 0xFF]).unwrap();
        assert_eq!(value, 0x11);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_take_is_zero_copy() {
        let input = Bytes::from(vec![9u8; 16]);
        let mut cursor = Cursor::new(input.clone());
        cursor.take(4).unwrap();
        let slice = cursor.take(8).unwrap();
        assert_eq!(slice.as_ptr(), input[4..].as_ptr());
    }
}
