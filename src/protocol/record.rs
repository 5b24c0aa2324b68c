//! Composite records and their compile-time schemas
//!
//! A record is declared once with [`wire_record!`](crate::wire_record), which
//! generates the struct, its [`Schema`] and its encoder/decoder. Fields are
//! encoded and decoded strictly in declared order.
//!
//! Each field has a [`FieldReader`]:
//!
//! - `Derived`: chosen from the field type (integers, strings, bytes, nested
//!   records, self-prefixed sequences).
//! - `Remaining`: a sequence with no count that runs to the end of input.
//! - `CountedBy(name)`: a sequence with no count whose length is the value of an
//!   earlier field of the same record.
//!
//! During decoding every decoded field is bound as a local before the next
//! field is read, so a `counted_by` reader can only reach fields declared
//! before it; referring to a later field does not compile. Encoding fails
//! with [`Error::CountMismatch`](super::Error::CountMismatch) when the count
//! field disagrees with the sequence length.

use std::fmt;

use super::codec::{Decode, Encode};

/// Wire shape of a value, as recorded in schema descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// Fixed-width big-endian integer
    Int {
        /// Width in bytes
        width: usize,
        /// Two's-complement signed
        signed: bool,
    },
    /// Nullable `i16`-length-prefixed UTF-8 string
    String,
    /// Opaque `u32`-length-prefixed bytes
    Bytes,
    /// Sequence of the inner type
    Sequence(&'static TypeTag),
    /// Nested record
    Record(&'static Schema),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { width, signed } => {
                let prefix = if *signed { 'i' } else { 'u' };
                write!(f, "{prefix}{}", width * 8)
            }
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Sequence(inner) => write!(f, "[{inner}]"),
            Self::Record(schema) => write!(f, "{}", schema.name),
        }
    }
}

/// How a field's decoder is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldReader {
    /// Reader derived from the field type
    Derived,
    /// Sequence without a count, consuming the rest of the input
    Remaining,
    /// Sequence without a count, sized by an earlier field
    CountedBy(&'static str),
}

/// One field of a record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: &'static str,
    /// Wire shape of the field
    pub ty: &'static TypeTag,
    /// Reader selection
    pub reader: FieldReader,
}

/// Ordered field list of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Record name
    pub name: &'static str,
    /// Fields in wire order
    pub fields: &'static [FieldDescriptor],
}

impl Schema {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Position of a field in wire order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Field names in wire order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|field| field.name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ ", self.name)?;
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field.name, field.ty)?;
            match field.reader {
                FieldReader::Derived => {}
                FieldReader::Remaining => write!(f, " = remaining")?,
                FieldReader::CountedBy(source) => write!(f, " = counted_by({source})")?,
            }
        }
        write!(f, " }}")
    }
}

/// Types with a known wire shape.
pub trait WireType {
    /// Schema tag for the type.
    const TAG: &'static TypeTag;
}

/// A composite record declared with [`wire_record!`](crate::wire_record).
pub trait Record: Encode + Decode + WireType {
    /// Ordered field descriptors.
    const SCHEMA: &'static Schema;

    /// Encode the record without framing.
    fn to_bytes(&self) -> super::Result<bytes::Bytes> {
        super::codec::encode(self)
    }

    /// Decode a record from the start of `bytes`, returning it with the number
    /// of bytes consumed.
    fn from_bytes(bytes: impl Into<bytes::Bytes>) -> super::Result<(Self, usize)> {
        super::codec::decode(bytes)
    }
}

/// Declare a wire record.
///
/// Generates the struct (with `Debug`, `Clone`, `PartialEq`, `Eq`), its
/// [`Record`] schema, [`WireType`] tag, [`Encode`] and [`Decode`] impls.
/// Sequence fields may pick a reader other than the self-prefixed default:
///
/// ```
/// use stream_wire::wire_record;
/// use stream_wire::protocol::{FieldReader, Record};
///
/// wire_record! {
///     /// Batch whose size is carried ahead of the entries
///     pub struct Batch {
///         pub count: u16,
///         pub label: Option<String>,
///         pub entries: Vec<u32> = counted_by(count),
///     }
/// }
///
/// let batch = Batch { count: 2, label: None, entries: vec![7, 9] };
/// let bytes = batch.to_bytes()?;
/// assert_eq!(bytes.as_ref(), &[0, 2, 0xFF, 0xFF, 0, 0, 0, 7, 0, 0, 0, 9]);
/// assert_eq!(Batch::from_bytes(bytes)?, (batch, 12));
/// assert_eq!(Batch::SCHEMA.fields[2].reader, FieldReader::CountedBy("count"));
/// # Ok::<(), stream_wire::Error>(())
/// ```
#[macro_export]
macro_rules! wire_record {
    (@reader) => {
        $crate::protocol::FieldReader::Derived
    };
    (@reader remaining) => {
        $crate::protocol::FieldReader::Remaining
    };
    (@reader counted_by($dep:ident)) => {
        $crate::protocol::FieldReader::CountedBy(stringify!($dep))
    };

    (@encode $buf:ident, $value:expr) => {
        $crate::protocol::Encode::encode(&$value, $buf)?
    };
    (@encode $buf:ident, $value:expr, remaining) => {
        $crate::protocol::sequence::encode_unprefixed(&$value, $buf)?
    };
    (@encode $buf:ident, $value:expr, counted_by($count:expr, $name:expr)) => {
        $crate::protocol::sequence::encode_counted(
            &$value,
            $crate::protocol::sequence::count_from($count, $name)?,
            $name,
            $buf,
        )?
    };

    (@len $value:expr) => {
        $crate::protocol::Encode::encoded_len(&$value)
    };
    (@len $value:expr, $reader:ident) => {
        $crate::protocol::sequence::unprefixed_len(&$value)
    };

    (@decode $cursor:ident) => {
        $crate::protocol::Decode::decode($cursor)
    };
    (@decode $cursor:ident, remaining) => {
        $crate::protocol::sequence::decode_remaining($cursor)
    };
    (@decode $cursor:ident, counted_by($dep:ident)) => {
        $crate::protocol::sequence::decode_counted(
            $cursor,
            $crate::protocol::sequence::count_from($dep, stringify!($dep))?,
        )
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(= $reader:ident $(($dep:ident))?)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::protocol::Record for $name {
            const SCHEMA: &'static $crate::protocol::Schema = &$crate::protocol::Schema {
                name: stringify!($name),
                fields: &[
                    $(
                        $crate::protocol::FieldDescriptor {
                            name: stringify!($field),
                            ty: <$ty as $crate::protocol::WireType>::TAG,
                            reader: $crate::wire_record!(@reader $($reader $(($dep))?)?),
                        },
                    )*
                ],
            };
        }

        impl $crate::protocol::WireType for $name {
            const TAG: &'static $crate::protocol::TypeTag = &$crate::protocol::TypeTag::Record(
                <$name as $crate::protocol::Record>::SCHEMA,
            );
        }

        impl $crate::protocol::Encode for $name {
            fn encode(&self, buf: &mut $crate::BytesMut) -> $crate::protocol::Result<()> {
                $(
                    $crate::wire_record!(
                        @encode buf, self.$field $(, $reader $((self.$dep, stringify!($dep)))?)?
                    );
                )*
                Ok(())
            }

            fn encoded_len(&self) -> usize {
                0 $(+ $crate::wire_record!(@len self.$field $(, $reader)?))*
            }
        }

        impl $crate::protocol::Decode for $name {
            fn decode(cursor: &mut $crate::protocol::Cursor) -> $crate::protocol::Result<Self> {
                $(
                    let $field: $ty = cursor.field(stringify!($field), |cursor| {
                        $crate::wire_record!(@decode cursor $(, $reader $(($dep))?)?)
                    })?;
                )*
                Ok(Self { $($field),* })
            }
        }
    };
}
