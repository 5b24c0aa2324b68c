//! Primitive wire values
//!
//! - Fixed-width integers: 1, 2, 4 or 8 bytes, big-endian, two's complement
//!   when signed.
//! - Nullable string: `i16` length (−1 for null) followed by UTF-8 bytes.
//! - Opaque bytes: `u32` length followed by raw bytes.

use bytes::{BufMut, Bytes, BytesMut};

use super::codec::{Cursor, Decode, Encode};
use super::record::{TypeTag, WireType};
use super::{Error, Result};

/// Length written for a null string.
pub const NULL_STRING_LENGTH: i16 = -1;

/// Integer with a fixed serialized width.
///
/// One generic codec covers every width and signedness: [`Cursor::read_int`]
/// consumes exactly [`FixedWidth::WIDTH`] bytes and encoding always produces
/// exactly that many.
pub trait FixedWidth: Copy {
    /// Serialized width in bytes.
    const WIDTH: usize;
    /// Two's-complement signed.
    const SIGNED: bool;

    /// Append the big-endian representation.
    fn put_be(self, buf: &mut BytesMut);

    /// Build from big-endian bytes; `None` unless exactly
    /// [`FixedWidth::WIDTH`] bytes are given.
    fn from_be_slice(bytes: &[u8]) -> Option<Self>;
}

macro_rules! fixed_width {
    ($($ty:ty => $put:ident, $signed:expr;)*) => {
        $(
            impl FixedWidth for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();
                const SIGNED: bool = $signed;

                #[inline]
                fn put_be(self, buf: &mut BytesMut) {
                    buf.$put(self);
                }

                #[inline]
                fn from_be_slice(bytes: &[u8]) -> Option<Self> {
                    bytes.try_into().ok().map(<$ty>::from_be_bytes)
                }
            }

            impl Encode for $ty {
                #[inline]
                fn encode(&self, buf: &mut BytesMut) -> Result<()> {
                    self.put_be(buf);
                    Ok(())
                }

                #[inline]
                fn encoded_len(&self) -> usize {
                    <$ty as FixedWidth>::WIDTH
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode(cursor: &mut Cursor) -> Result<Self> {
                    cursor.read_int()
                }
            }

            impl WireType for $ty {
                const TAG: &'static TypeTag = &TypeTag::Int {
                    width: <$ty as FixedWidth>::WIDTH,
                    signed: $signed,
                };
            }
        )*
    };
}

fixed_width! {
    u8 => put_u8, false;
    u16 => put_u16, false;
    u32 => put_u32, false;
    u64 => put_u64, false;
    i8 => put_i8, true;
    i16 => put_i16, true;
    i32 => put_i32, true;
    i64 => put_i64, true;
}

impl Encode for Option<String> {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            None => buf.put_i16(NULL_STRING_LENGTH),
            Some(text) => {
                let len = i16::try_from(text.len()).map_err(|_| Error::PayloadTooLarge {
                    size: text.len(),
                    max: i16::MAX as usize,
                })?;
                buf.put_i16(len);
                buf.put_slice(text.as_bytes());
            }
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        2 + self.as_ref().map_or(0, String::len)
    }
}

impl Decode for Option<String> {
    fn decode(cursor: &mut Cursor) -> Result<Self> {
        let len: i16 = cursor.read_int()?;
        // any negative length is null
        let Ok(len) = usize::try_from(len) else {
            return Ok(None);
        };
        let raw = cursor.take(len)?;
        let text = std::str::from_utf8(&raw)?;
        Ok(Some(text.to_owned()))
    }
}

impl WireType for Option<String> {
    const TAG: &'static TypeTag = &TypeTag::String;
}

impl Encode for Bytes {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        let len = u32::try_from(self.len()).map_err(|_| Error::PayloadTooLarge {
            size: self.len(),
            max: u32::MAX as usize,
        })?;
        buf.put_u32(len);
        buf.put_slice(self);
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        4 + self.len()
    }
}

impl Decode for Bytes {
    fn decode(cursor: &mut Cursor) -> Result<Self> {
        let len: u32 = cursor.read_int()?;
        cursor.take(usize::try_from(len).unwrap_or(usize::MAX))
    }
}

impl WireType for Bytes {
    const TAG: &'static TypeTag = &TypeTag::Bytes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::{decode, encode};

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(encode(&0x0102_u16).unwrap().as_ref(), &[0x01, 0x02]);
        assert_eq!(
            encode(&-2_i32).unwrap().as_ref(),
            &[0xFF, 0xFF, 0xFF, 0xFE]
        );
        assert_eq!(
            encode(&1_u64).unwrap().as_ref(),
            &[0, 0, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(encode(&-1_i8).unwrap().as_ref(), &[0xFF]);
    }

    #[test]
    fn test_truncated_integers_fail() {
        fn assert_short<T: Decode + std::fmt::Debug>(width: usize) {
            for available in 0..width {
                let err = decode::<T>(vec![0xAB; available]).unwrap_err();
                assert!(
                    matches!(err, Error::InsufficientData { needed, available: got }
                        if needed == width && got == available),
                    "width {width}, available {available}: {err:?}"
                );
            }
        }

        assert_short::<u8>(1);
        assert_short::<i16>(2);
        assert_short::<u32>(4);
        assert_short::<i64>(8);
    }

    #[test]
    fn test_null_and_empty_strings_differ() {
        let null: Option<String> = None;
        let empty = Some(String::new());

        assert_eq!(encode(&null).unwrap().as_ref(), &[0xFF, 0xFF]);
        assert_eq!(encode(&empty).unwrap().as_ref(), &[0x00, 0x00]);

        assert_eq!(decode::<Option<String>>(vec![0xFF, 0xFF]).unwrap(), (None, 2));
        assert_eq!(
            decode::<Option<String>>(vec![0x00, 0x00]).unwrap(),
            (Some(String::new()), 2)
        );
    }

    #[test]
    fn test_string_encoding() {
        let hi = Some("hi".to_owned());
        assert_eq!(encode(&hi).unwrap().as_ref(), &[0x00, 0x02, 0x68, 0x69]);
        assert_eq!(hi.encoded_len(), 4);
    }

    #[test]
    fn test_string_rejects_invalid_utf8() {
        let err = decode::<Option<String>>(vec![0x00, 0x02, 0xC3, 0x28]).unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)));
    }

    #[test]
    fn test_string_truncated_payload() {
        let err = decode::<Option<String>>(vec![0x00, 0x05, b'a', b'b']).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData {
                needed: 5,
                available: 2
            }
        ));
    }

    #[test]
    fn test_oversized_string_is_rejected() {
        let long = Some("x".repeat(i16::MAX as usize + 1));
        let err = encode(&long).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { max, .. } if max == i16::MAX as usize));
    }

    #[test]
    fn test_from_be_slice_requires_exact_width() {
        assert_eq!(u16::from_be_slice(&[0x01, 0x02]), Some(0x0102));
        assert_eq!(i32::from_be_slice(&[0xFF; 4]), Some(-1));
        assert_eq!(u32::from_be_slice(&[1, 2, 3]), None);
        assert_eq!(u8::from_be_slice(&[1, 2]), None);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let blob = Bytes::from_static(b"\x00\x01binary\xFF");
        let encoded = encode(&blob).unwrap();
        let len = u32::try_from(blob.len()).unwrap();
        assert_eq!(&encoded[..4], &len.to_be_bytes());
        assert_eq!(len, 9);

        let (decoded, consumed) = decode::<Bytes>(encoded.clone()).unwrap();
        assert_eq!(decoded, blob);
        assert_eq!(consumed, encoded.len());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every integer roundtrips through exactly its width
            #[test]
            fn prop_integers_roundtrip(a in any::<u8>(), b in any::<i16>(), c in any::<u32>(), d in any::<i64>()) {
                prop_assert_eq!(decode::<u8>(encode(&a).unwrap()).unwrap(), (a, 1));
                prop_assert_eq!(decode::<i16>(encode(&b).unwrap()).unwrap(), (b, 2));
                prop_assert_eq!(decode::<u32>(encode(&c).unwrap()).unwrap(), (c, 4));
                prop_assert_eq!(decode::<i64>(encode(&d).unwrap()).unwrap(), (d, 8));
            }

            /// Property: strings roundtrip and consume 2 + byte length
            #[test]
            fn prop_strings_roundtrip(text in proptest::option::of(".{0,64}")) {
                let encoded = encode(&text).unwrap();
                let (decoded, consumed) = decode::<Option<String>>(encoded.clone()).unwrap();
                prop_assert_eq!(consumed, encoded.len());
                prop_assert_eq!(decoded, text);
            }

            /// Property: truncating an encoded string always fails cleanly
            #[test]
            fn prop_truncated_string_fails(text in ".{1,64}", cut in 1usize..64) {
                let encoded = encode(&Some(text)).unwrap();
                let keep = encoded.len().saturating_sub(cut);
                let result = decode::<Option<String>>(encoded.slice(..keep));
                prop_assert!(result.is_err());
            }
        }
    }
}
