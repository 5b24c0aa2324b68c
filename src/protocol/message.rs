//! Stream protocol message catalog
//!
//! Every command and response is a [`wire_record!`](crate::wire_record)
//! declaration opening with `key` and `version`. Shared shapes such as
//! [`Property`] are reused wherever the protocol carries the same layout.

// field names are the protocol's own
#![allow(missing_docs)]

use bytes::Bytes;

use super::Key;
use crate::wire_record;

/// Protocol version written by this crate
pub const PROTOCOL_VERSION: u16 = 1;

/// Binds a record to the key it travels under.
pub trait Command {
    /// Command key
    const KEY: Key;
    /// Whether the broker sends it with the response flag set
    const RESPONSE: bool;
}

macro_rules! commands {
    ($($record:ty => $key:ident, $response:literal;)*) => {
        $(
            impl Command for $record {
                const KEY: Key = Key::$key;
                const RESPONSE: bool = $response;
            }
        )*
    };
}

wire_record! {
    /// Key/value string pair used for peer, connection and subscription
    /// properties and stream creation arguments
    pub struct Property {
        /// Property name
        pub key: Option<String>,
        /// Property value
        pub value: Option<String>,
    }
}

impl Property {
    /// Create a property with both parts present
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

wire_record! {
    /// Generic `key, version, correlation id, response code` reply
    pub struct CommandResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
    }
}

// -- connection ---------------------------------------------------------------

wire_record! {
    /// Client properties sent right after connecting
    pub struct PeerPropertiesRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub peer_properties: Vec<Property>,
    }
}

wire_record! {
    /// Broker properties
    pub struct PeerPropertiesResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
        pub peer_properties: Vec<Property>,
    }
}

wire_record! {
    /// Ask for the SASL mechanisms the broker supports
    pub struct SaslHandshakeRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
    }
}

wire_record! {
    /// Supported SASL mechanisms
    pub struct SaslHandshakeResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
        pub mechanisms: Vec<Option<String>>,
    }
}

wire_record! {
    /// SASL exchange step
    pub struct SaslAuthenticateRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub mechanism: Option<String>,
        /// Mechanism-specific payload (e.g. `\0user\0password` for PLAIN)
        pub sasl_opaque_data: Bytes,
    }
}

wire_record! {
    /// SASL exchange result or challenge
    pub struct SaslAuthenticateResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
        pub sasl_opaque_data: Bytes,
    }
}

wire_record! {
    /// Frame size and heartbeat negotiation, sent by both peers
    pub struct Tune {
        pub key: u16,
        pub version: u16,
        /// Largest frame in bytes, 0 for no limit
        pub frame_max: u32,
        /// Heartbeat interval in seconds, 0 to disable
        pub heartbeat: u32,
    }
}

wire_record! {
    /// Open a virtual host
    pub struct OpenRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub virtual_host: Option<String>,
    }
}

wire_record! {
    /// Result of opening a virtual host
    pub struct OpenResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
        pub connection_properties: Vec<Property>,
    }
}

wire_record! {
    /// Close the connection
    pub struct CloseRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub closing_code: u16,
        pub closing_reason: Option<String>,
    }
}

wire_record! {
    /// Close acknowledgement
    pub struct CloseResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
    }
}

wire_record! {
    /// Keep-alive
    pub struct Heartbeat {
        pub key: u16,
        pub version: u16,
    }
}

// -- publishers ---------------------------------------------------------------

wire_record! {
    /// Register a publisher on a stream
    pub struct DeclarePublisherRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub publisher_id: u8,
        /// Names used for deduplication
        pub publisher_references: Vec<Option<String>>,
        pub stream: Option<String>,
    }
}

wire_record! {
    /// Publisher registration result
    pub struct DeclarePublisherResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
        pub publisher_id: u8,
    }
}

wire_record! {
    /// Ask for the last sequence stored for a publisher reference
    pub struct QueryPublisherRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub publisher_reference: Option<String>,
        pub stream: Option<String>,
    }
}

wire_record! {
    /// Last stored publishing sequence
    pub struct QueryPublisherResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
        pub sequence: u64,
    }
}

wire_record! {
    /// Remove a publisher
    pub struct DeletePublisherRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub publisher_id: u8,
    }
}

wire_record! {
    /// Publisher removal result
    pub struct DeletePublisherResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
    }
}

// -- publishing ---------------------------------------------------------------

wire_record! {
    /// One message of a publish batch
    pub struct PublishedMessage {
        pub publishing_id: u64,
        pub message: Bytes,
    }
}

wire_record! {
    /// Publish a batch of messages
    pub struct Publish {
        pub key: u16,
        pub version: u16,
        pub publisher_id: u8,
        pub published_messages: Vec<PublishedMessage>,
    }
}

wire_record! {
    /// Publishing ids the broker has stored
    pub struct PublishConfirm {
        pub key: u16,
        pub version: u16,
        pub publisher_id: u8,
        pub publishing_ids: Vec<u64>,
    }
}

wire_record! {
    /// A rejected publishing id
    pub struct PublishingError {
        pub publishing_id: u64,
        pub code: u16,
    }
}

wire_record! {
    /// Broker rejected a published message
    pub struct PublishError {
        pub key: u16,
        pub version: u16,
        pub publisher_id: u8,
        pub publishing_error: PublishingError,
    }
}

// -- consumers ----------------------------------------------------------------

wire_record! {
    /// Where a subscription starts reading
    pub struct OffsetSpecification {
        /// One of the `OffsetSpecification::*` type constants
        pub offset_type: u16,
        pub offset: u64,
    }
}

impl OffsetSpecification {
    /// Start at the first available chunk
    pub const FIRST: u16 = 1;
    /// Start at the last chunk
    pub const LAST: u16 = 2;
    /// Start after the last chunk
    pub const NEXT: u16 = 3;
    /// Start at an absolute offset
    pub const OFFSET: u16 = 4;
    /// Start at a timestamp (milliseconds)
    pub const TIMESTAMP: u16 = 5;

    /// Start at an absolute offset
    #[must_use]
    pub const fn offset(offset: u64) -> Self {
        Self {
            offset_type: Self::OFFSET,
            offset,
        }
    }

    /// Start at the first available chunk
    #[must_use]
    pub const fn first() -> Self {
        Self {
            offset_type: Self::FIRST,
            offset: 0,
        }
    }
}

wire_record! {
    /// Start consuming a stream
    pub struct Subscribe {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub subscription_id: u8,
        pub stream: Option<String>,
        pub offset_specification: OffsetSpecification,
        /// Chunks the broker may deliver before more credit is granted
        pub credit: u16,
        pub properties: Vec<Property>,
    }
}

wire_record! {
    /// Stop consuming
    pub struct Unsubscribe {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub subscription_id: u8,
    }
}

wire_record! {
    /// Grant more credit to a subscription
    pub struct CreditRequest {
        pub key: u16,
        pub version: u16,
        pub subscription_id: u8,
        pub credit: u16,
    }
}

wire_record! {
    /// Sent by the broker only when a credit request fails
    pub struct CreditResponse {
        pub key: u16,
        pub version: u16,
        pub response_code: u16,
        pub subscription_id: u8,
    }
}

wire_record! {
    /// Chunk of stream entries
    ///
    /// `messages` carries no count of its own: it holds exactly
    /// `num_records` length-prefixed entries.
    pub struct OsirisChunk {
        pub magic_version: i8,
        pub num_entries: u16,
        pub num_records: u32,
        pub epoch: u64,
        pub chunk_first_offset: u64,
        pub chunk_crc: i32,
        pub data_length: u32,
        pub messages: Vec<Bytes> = counted_by(num_records),
    }
}

wire_record! {
    /// Chunk delivery to a subscription
    pub struct Deliver {
        pub key: u16,
        pub version: u16,
        pub subscription_id: u8,
        pub osiris_chunk: OsirisChunk,
    }
}

// -- offsets ------------------------------------------------------------------

wire_record! {
    /// Store a consumer offset (no response)
    pub struct StoreOffset {
        pub key: u16,
        pub version: u16,
        /// Consumer name
        pub reference: Option<String>,
        pub stream: Option<String>,
        pub offset: u64,
    }
}

wire_record! {
    /// Read back a stored consumer offset
    pub struct QueryOffsetRequest {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub reference: Option<String>,
        pub stream: Option<String>,
    }
}

wire_record! {
    /// Stored consumer offset
    pub struct QueryOffsetResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub response_code: u16,
        pub offset: u64,
    }
}

// -- administration -----------------------------------------------------------

wire_record! {
    /// Create a stream
    pub struct Create {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub stream: Option<String>,
        /// Stream arguments such as `max-length-bytes`
        pub arguments: Vec<Property>,
    }
}

wire_record! {
    /// Delete a stream
    pub struct Delete {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub stream: Option<String>,
    }
}

wire_record! {
    /// Ask for the topology of a stream
    pub struct MetadataQuery {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub stream: Option<String>,
    }
}

wire_record! {
    /// Broker node
    pub struct Broker {
        pub reference: u16,
        pub host: Option<String>,
        pub port: u32,
    }
}

wire_record! {
    /// Leader and replicas of one stream, as broker references
    pub struct StreamMetadata {
        pub stream_name: Option<String>,
        pub response_code: u16,
        pub leader_reference: u16,
        pub replicas_references: Vec<u16>,
    }
}

wire_record! {
    /// Stream topology
    pub struct MetadataResponse {
        pub key: u16,
        pub version: u16,
        pub correlation_id: u32,
        pub brokers: Vec<Broker>,
        pub stream_metadata: Vec<StreamMetadata>,
    }
}

wire_record! {
    /// Change affecting one stream
    pub struct MetadataInfo {
        pub code: u16,
        pub stream: Option<String>,
    }
}

wire_record! {
    /// Topology change notification
    pub struct MetadataUpdate {
        pub key: u16,
        pub version: u16,
        pub metadata_info: MetadataInfo,
    }
}

commands! {
    PeerPropertiesRequest => PeerProperties, false;
    PeerPropertiesResponse => PeerProperties, true;
    SaslHandshakeRequest => SaslHandshake, false;
    SaslHandshakeResponse => SaslHandshake, true;
    SaslAuthenticateRequest => SaslAuthenticate, false;
    SaslAuthenticateResponse => SaslAuthenticate, true;
    Tune => Tune, false;
    OpenRequest => Open, false;
    OpenResponse => Open, true;
    CloseRequest => Close, false;
    CloseResponse => Close, true;
    Heartbeat => Heartbeat, false;
    DeclarePublisherRequest => DeclarePublisher, false;
    DeclarePublisherResponse => DeclarePublisher, true;
    QueryPublisherRequest => QueryPublisherSequence, false;
    QueryPublisherResponse => QueryPublisherSequence, true;
    DeletePublisherRequest => DeletePublisher, false;
    DeletePublisherResponse => DeletePublisher, true;
    Publish => Publish, false;
    PublishConfirm => PublishConfirm, false;
    PublishError => PublishError, false;
    Subscribe => Subscribe, false;
    Unsubscribe => Unsubscribe, false;
    CreditRequest => Credit, false;
    CreditResponse => Credit, true;
    Deliver => Deliver, false;
    StoreOffset => StoreOffset, false;
    QueryOffsetRequest => QueryOffset, false;
    QueryOffsetResponse => QueryOffset, true;
    Create => Create, false;
    Delete => Delete, false;
    MetadataQuery => Metadata, false;
    MetadataResponse => Metadata, true;
    MetadataUpdate => MetadataUpdate, false;
}
