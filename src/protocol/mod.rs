//! Stream protocol core implementation
//!
//! This module provides the primitive codecs, record schemas, frame envelope
//! and message catalog.

mod codec;
mod dispatch;
mod error;
pub mod frame;
pub mod message;
mod primitive;
mod record;
pub mod sequence;
mod types;

pub use codec::{Cursor, Decode, Encode, decode, encode};
pub use dispatch::ServerCommand;
pub use error::{Error, Result};
pub use frame::{DEFAULT_MAX_FRAME_SIZE, Frame, FrameConfig, LENGTH_PREFIX_SIZE};
pub use message::{Command, PROTOCOL_VERSION};
pub use primitive::{FixedWidth, NULL_STRING_LENGTH};
pub use record::{FieldDescriptor, FieldReader, Record, Schema, TypeTag, WireType};
pub use types::{Key, RESPONSE_FLAG, ResponseCode};
