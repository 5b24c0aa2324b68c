//! Stream protocol codec error types

use std::fmt::Write as _;

use thiserror::Error;

/// Codec and framing errors
#[derive(Error, Debug)]
pub enum Error {
    /// Fewer bytes remain than the value requires
    #[error("insufficient data: need {needed} bytes, got {available}")]
    InsufficientData {
        /// Bytes required by the value being decoded
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// Text field is not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    /// A sequence element failed to decode
    #[error("element {index}: {source}")]
    ElementDecodeFailed {
        /// Position of the element within the sequence
        index: usize,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A record field failed to decode
    #[error("field `{field}`: {source}")]
    FieldDecodeFailed {
        /// Name of the field as declared in the record schema
        field: &'static str,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// No record schema matches the operation key
    #[error("unknown operation key: {key:#06x}")]
    UnknownOperation {
        /// Raw key as read from the wire, response flag included
        key: u16,
    },

    /// A sibling field used as an element count does not fit a `usize`
    #[error("count field `{field}` holds an unusable element count")]
    InvalidCount {
        /// Name of the counting field
        field: &'static str,
    },

    /// A counted sequence does not hold as many elements as its count field
    #[error("count field `{field}` says {count} but the sequence holds {len}")]
    CountMismatch {
        /// Name of the counting field
        field: &'static str,
        /// Value of the counting field
        count: usize,
        /// Elements actually present
        len: usize,
    },

    /// An exhaust-remaining sequence element consumed no input
    #[error("sequence element {index} consumed no bytes")]
    StalledSequence {
        /// Position of the offending element
        index: usize,
    },

    /// A record did not consume the whole frame payload
    #[error("record consumed {consumed} of {delivered} payload bytes")]
    TrailingBytes {
        /// Bytes consumed by the record decoder
        consumed: usize,
        /// Bytes delivered in the frame
        delivered: usize,
    },

    /// Frame length prefix exceeds the configured maximum
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Announced frame size
        size: u32,
        /// Configured maximum
        max: u32,
    },

    /// Value is longer than its length prefix can describe
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Length of the value
        size: usize,
        /// Largest length the prefix can carry
        max: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap `self` as the failure of the named record field.
    #[must_use]
    pub fn in_field(self, field: &'static str) -> Self {
        Self::FieldDecodeFailed {
            field,
            source: Box::new(self),
        }
    }

    /// Wrap `self` as the failure of the sequence element at `index`.
    #[must_use]
    pub fn at_index(self, index: usize) -> Self {
        Self::ElementDecodeFailed {
            index,
            source: Box::new(self),
        }
    }

    /// Innermost error beneath any field/element context.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::FieldDecodeFailed { source, .. } | Self::ElementDecodeFailed { source, .. } =
            current
        {
            current = source.as_ref();
        }
        current
    }

    /// Dotted path of fields and element indices leading to the failure,
    /// e.g. `osiris_chunk.messages[2]`. Empty when the error has no context.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut current = self;
        loop {
            match current {
                Self::FieldDecodeFailed { field, source } => {
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(field);
                    current = source.as_ref();
                }
                Self::ElementDecodeFailed { index, source } => {
                    let _ = write!(path, "[{index}]");
                    current = source.as_ref();
                }
                _ => return path,
            }
        }
    }

    /// Whether the innermost failure was running out of input.
    #[must_use]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self.root_cause(), Self::InsufficientData { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
