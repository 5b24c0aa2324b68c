//! Sequence encoding under the three counting strategies
//!
//! ```text
//! self-prefixed      [COUNT u32] [ELEMENT]...
//! exhaust-remaining  [ELEMENT]...            (until the input ends)
//! sibling-counted    [ELEMENT]...            (count read earlier in the record)
//! ```
//!
//! `Vec<T>` uses the self-prefixed form through its [`Encode`]/[`Decode`]
//! impls; record fields opt into the other two with `= remaining` and
//! `= counted_by(field)`.

use bytes::{BufMut, BytesMut};

use super::codec::{Cursor, Decode, Encode};
use super::record::{TypeTag, WireType};
use super::{Error, Result};

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        encode_prefixed(self, buf)
    }

    fn encoded_len(&self) -> usize {
        4 + unprefixed_len(self)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(cursor: &mut Cursor) -> Result<Self> {
        decode_prefixed(cursor)
    }
}

impl<T: WireType> WireType for Vec<T> {
    const TAG: &'static TypeTag = &TypeTag::Sequence(T::TAG);
}

/// Write a `u32` element count followed by the elements.
pub fn encode_prefixed<T: Encode>(items: &[T], buf: &mut BytesMut) -> Result<()> {
    let count = u32::try_from(items.len()).map_err(|_| Error::PayloadTooLarge {
        size: items.len(),
        max: u32::MAX as usize,
    })?;
    buf.put_u32(count);
    encode_unprefixed(items, buf)
}

/// Write the elements back to back with no count.
pub fn encode_unprefixed<T: Encode>(items: &[T], buf: &mut BytesMut) -> Result<()> {
    for item in items {
        item.encode(buf)?;
    }
    Ok(())
}

/// Write the elements of a sequence sized by the sibling field `field`,
/// which must hold exactly `count`.
pub fn encode_counted<T: Encode>(
    items: &[T],
    count: usize,
    field: &'static str,
    buf: &mut BytesMut,
) -> Result<()> {
    if items.len() != count {
        return Err(Error::CountMismatch {
            field,
            count,
            len: items.len(),
        });
    }
    encode_unprefixed(items, buf)
}

/// Encoded size of the elements alone.
#[must_use]
pub fn unprefixed_len<T: Encode>(items: &[T]) -> usize {
    items.iter().map(Encode::encoded_len).sum()
}

/// Read a `u32` element count, then that many elements.
pub fn decode_prefixed<T: Decode>(cursor: &mut Cursor) -> Result<Vec<T>> {
    let count: u32 = cursor.read_int()?;
    decode_counted(cursor, usize::try_from(count).unwrap_or(usize::MAX))
}

/// Read exactly `count` elements with no count prefix.
pub fn decode_counted<T: Decode>(cursor: &mut Cursor, count: usize) -> Result<Vec<T>> {
    // the count comes off the wire; don't trust it for the allocation
    let mut items = Vec::with_capacity(count.min(cursor.remaining()));
    for index in 0..count {
        let item = T::decode(cursor).map_err(|err| err.at_index(index))?;
        items.push(item);
    }
    Ok(items)
}

/// Read elements until the input is exhausted.
pub fn decode_remaining<T: Decode>(cursor: &mut Cursor) -> Result<Vec<T>> {
    let mut items = Vec::new();
    while !cursor.is_empty() {
        let index = items.len();
        let start = cursor.position();
        let item = T::decode(cursor).map_err(|err| err.at_index(index))?;
        if cursor.position() == start {
            return Err(Error::StalledSequence { index });
        }
        items.push(item);
    }
    Ok(items)
}

/// Convert the value of the sibling field `field` into an element count.
pub fn count_from<C: TryInto<usize>>(value: C, field: &'static str) -> Result<usize> {
    value
        .try_into()
        .map_err(|_| Error::InvalidCount { field })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::protocol::codec::{decode, encode};

    #[test]
    fn test_empty_prefixed_sequence() {
        let empty: Vec<u64> = Vec::new();
        let encoded = encode(&empty).unwrap();
        assert_eq!(encoded.as_ref(), &[0, 0, 0, 0]);
        assert_eq!(decode::<Vec<u64>>(encoded).unwrap(), (Vec::new(), 4));
    }

    #[test]
    fn test_prefixed_sequence_layout() {
        let ids = vec![1_u64, 2];
        let encoded = encode(&ids).unwrap();
        assert_eq!(encoded.len(), 4 + 16);
        assert_eq!(&encoded[..4], &[0, 0, 0, 2]);
        assert_eq!(&encoded[4..12], &[0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_counted_reads_exactly_count() {
        let mut cursor = Cursor::new(Bytes::from_static(&[0, 1, 0, 2, 0, 3]));
        let items: Vec<u16> = decode_counted(&mut cursor, 2).unwrap();
        assert_eq!(items, [1, 2]);
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.remaining(), 2);
    }

    #[test]
    fn test_counted_element_failure_has_index() {
        let mut cursor = Cursor::new(Bytes::from_static(&[0, 1, 0]));
        let err = decode_counted::<u16>(&mut cursor, 2).unwrap_err();
        assert!(matches!(err, Error::ElementDecodeFailed { index: 1, .. }));
        assert_eq!(err.path(), "[1]");
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        let mut cursor = Cursor::new(Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF, 0, 1]));
        let err = decode_prefixed::<u16>(&mut cursor).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_remaining_consumes_everything() {
        let mut cursor = Cursor::new(Bytes::from_static(&[0, 0, 0, 7, 0, 0, 0, 9]));
        let items: Vec<u32> = decode_remaining(&mut cursor).unwrap();
        assert_eq!(items, [7, 9]);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_remaining_partial_element_fails() {
        let mut cursor = Cursor::new(Bytes::from_static(&[0, 0, 0, 7, 0, 0]));
        let err = decode_remaining::<u32>(&mut cursor).unwrap_err();
        assert_eq!(err.path(), "[1]");
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_remaining_on_empty_input() {
        let mut cursor = Cursor::new(Bytes::new());
        let items: Vec<u8> = decode_remaining(&mut cursor).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_unprefixed_encoding() {
        let mut buf = BytesMut::new();
        encode_unprefixed(&[1_u16, 2], &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0, 1, 0, 2]);
        assert_eq!(unprefixed_len(&[1_u16, 2]), 4);
    }

    #[test]
    fn test_counted_encoding_checks_count() {
        let mut buf = BytesMut::new();
        encode_counted(&[7_u16, 9], 2, "total", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0, 7, 0, 9]);

        let err = encode_counted(&[7_u16, 9], 1, "total", &mut BytesMut::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::CountMismatch {
                field: "total",
                count: 1,
                len: 2
            }
        ));
    }

    #[test]
    fn test_count_from_rejects_negative() {
        assert_eq!(count_from(5_u32, "num_records").unwrap(), 5);
        let err = count_from(-1_i16, "num_records").unwrap_err();
        assert!(matches!(err, Error::InvalidCount { field: "num_records" }));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: prefixed sequences roundtrip and consume 4 + 8n bytes
            #[test]
            fn prop_prefixed_roundtrip(items in prop::collection::vec(any::<u64>(), 0..64)) {
                let encoded = encode(&items).unwrap();
                prop_assert_eq!(encoded.len(), 4 + 8 * items.len());
                let (decoded, consumed) = decode::<Vec<u64>>(encoded).unwrap();
                prop_assert_eq!(consumed, 4 + 8 * items.len());
                prop_assert_eq!(decoded, items);
            }

            /// Property: counted and remaining decoders agree on unprefixed input
            #[test]
            fn prop_unprefixed_strategies_agree(items in prop::collection::vec(any::<i32>(), 0..64)) {
                let mut buf = BytesMut::new();
                encode_unprefixed(&items, &mut buf).unwrap();
                let bytes = buf.freeze();

                let mut counted = Cursor::new(bytes.clone());
                let mut remaining = Cursor::new(bytes);
                let by_count: Vec<i32> = decode_counted(&mut counted, items.len()).unwrap();
                let by_exhaustion: Vec<i32> = decode_remaining(&mut remaining).unwrap();

                prop_assert_eq!(&by_count, &items);
                prop_assert_eq!(by_exhaustion, items);
                prop_assert!(counted.is_empty());
            }
        }
    }
}
