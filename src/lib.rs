//! Wire-format codec for the RabbitMQ stream protocol
//!
//! Messages are declared as records with [`wire_record!`]: an ordered list of
//! typed fields from which the encoder, the decoder and an inspectable
//! [`Schema`](protocol::Schema) are generated. Frames on the socket are a
//! `u32` big-endian length followed by the record.
//!
//! # Quick Start
//!
//! ```rust
//! use stream_wire::protocol::message::{PublishConfirm, PROTOCOL_VERSION};
//! use stream_wire::protocol::Record;
//! use stream_wire::{Frame, Key};
//!
//! let confirm = PublishConfirm {
//!     key: Key::PublishConfirm.as_u16(),
//!     version: PROTOCOL_VERSION,
//!     publisher_id: 1,
//!     publishing_ids: vec![1],
//! };
//!
//! // Record bytes only
//! let bytes = confirm.to_bytes()?;
//! assert_eq!(bytes.len(), 17);
//!
//! // With the length prefix
//! let frame = Frame::new(confirm.clone()).to_bytes()?;
//! let (decoded, consumed) = Frame::<PublishConfirm>::from_bytes(frame)?;
//! assert_eq!(decoded.into_inner(), confirm);
//! assert_eq!(consumed, 21);
//! # Ok::<(), stream_wire::Error>(())
//! ```
//!
//! # Features
//!
//! - **Declarative records** - field order, types and counting strategy in one place
//! - **Zero-copy decoding** - opaque payloads are slices of the input buffer
//! - **Field paths in errors** - failures report e.g. `osiris_chunk.messages[2]`
//! - **Blocking TCP transport** - frame-at-a-time send and receive

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;
pub mod transport;

pub use bytes::{Bytes, BytesMut};
pub use protocol::{
    Decode, Encode, Error, Frame, FrameConfig, Key, PROTOCOL_VERSION, Record, ResponseCode, Result,
    ServerCommand,
};
pub use transport::{FramedTransport, TcpTransport, TransportConfig};

/// Default stream protocol port
pub const DEFAULT_PORT: u16 = 5552;
