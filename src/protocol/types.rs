//! Stream protocol command keys and response codes

use std::fmt;

/// Bit set by the broker on the key of every response.
pub const RESPONSE_FLAG: u16 = 0x8000;

/// Command keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum Key {
    /// Register a publisher on a stream
    DeclarePublisher = 0x0001,
    /// Publish messages
    Publish = 0x0002,
    /// Broker confirms published messages
    PublishConfirm = 0x0003,
    /// Broker rejects published messages
    PublishError = 0x0004,
    /// Ask for a publisher's last stored sequence
    QueryPublisherSequence = 0x0005,
    /// Remove a publisher
    DeletePublisher = 0x0006,
    /// Start consuming a stream
    Subscribe = 0x0007,
    /// Broker delivers a chunk
    Deliver = 0x0008,
    /// Grant more credit to a subscription
    Credit = 0x0009,
    /// Store a consumer offset (no response)
    StoreOffset = 0x000a,
    /// Read back a stored consumer offset
    QueryOffset = 0x000b,
    /// Stop consuming
    Unsubscribe = 0x000c,
    /// Create a stream
    Create = 0x000d,
    /// Delete a stream
    Delete = 0x000e,
    /// Ask for broker and stream topology
    Metadata = 0x000f,
    /// Broker reports a topology change
    MetadataUpdate = 0x0010,
    /// Exchange client/server properties
    PeerProperties = 0x0011,
    /// List SASL mechanisms
    SaslHandshake = 0x0012,
    /// Authenticate
    SaslAuthenticate = 0x0013,
    /// Negotiate frame size and heartbeat
    Tune = 0x0014,
    /// Open a virtual host
    Open = 0x0015,
    /// Close the connection
    Close = 0x0016,
    /// Keep-alive
    Heartbeat = 0x0017,
}

impl Key {
    /// Every key, in numeric order.
    pub const ALL: [Self; 23] = [
        Self::DeclarePublisher,
        Self::Publish,
        Self::PublishConfirm,
        Self::PublishError,
        Self::QueryPublisherSequence,
        Self::DeletePublisher,
        Self::Subscribe,
        Self::Deliver,
        Self::Credit,
        Self::StoreOffset,
        Self::QueryOffset,
        Self::Unsubscribe,
        Self::Create,
        Self::Delete,
        Self::Metadata,
        Self::MetadataUpdate,
        Self::PeerProperties,
        Self::SaslHandshake,
        Self::SaslAuthenticate,
        Self::Tune,
        Self::Open,
        Self::Close,
        Self::Heartbeat,
    ];

    /// Convert from a key with the response flag already cleared
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_u16() == value)
    }

    /// Split a raw wire key into the command and whether the response flag
    /// was set.
    #[must_use]
    pub fn from_wire(raw: u16) -> Option<(Self, bool)> {
        let is_response = raw & RESPONSE_FLAG != 0;
        Self::from_u16(raw & !RESPONSE_FLAG).map(|key| (key, is_response))
    }

    /// Convert to the request key
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Key as written on a response
    #[must_use]
    pub const fn response_wire(self) -> u16 {
        self.as_u16() | RESPONSE_FLAG
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeclarePublisher => "DeclarePublisher",
            Self::Publish => "Publish",
            Self::PublishConfirm => "PublishConfirm",
            Self::PublishError => "PublishError",
            Self::QueryPublisherSequence => "QueryPublisherSequence",
            Self::DeletePublisher => "DeletePublisher",
            Self::Subscribe => "Subscribe",
            Self::Deliver => "Deliver",
            Self::Credit => "Credit",
            Self::StoreOffset => "StoreOffset",
            Self::QueryOffset => "QueryOffset",
            Self::Unsubscribe => "Unsubscribe",
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Metadata => "Metadata",
            Self::MetadataUpdate => "MetadataUpdate",
            Self::PeerProperties => "PeerProperties",
            Self::SaslHandshake => "SaslHandshake",
            Self::SaslAuthenticate => "SaslAuthenticate",
            Self::Tune => "Tune",
            Self::Open => "Open",
            Self::Close => "Close",
            Self::Heartbeat => "Heartbeat",
        };
        write!(f, "{name}")
    }
}

/// Response code carried by command responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseCode(pub u16);

impl ResponseCode {
    /// Success
    pub const OK: Self = Self(0x01);
    /// Stream does not exist
    pub const STREAM_DOES_NOT_EXIST: Self = Self(0x02);
    /// Subscription id already in use
    pub const SUBSCRIPTION_ID_ALREADY_EXISTS: Self = Self(0x03);
    /// Subscription id unknown
    pub const SUBSCRIPTION_ID_DOES_NOT_EXIST: Self = Self(0x04);
    /// Stream already exists
    pub const STREAM_ALREADY_EXISTS: Self = Self(0x05);
    /// Stream not available
    pub const STREAM_NOT_AVAILABLE: Self = Self(0x06);
    /// SASL mechanism not supported
    pub const SASL_MECHANISM_NOT_SUPPORTED: Self = Self(0x07);
    /// Authentication failure
    pub const AUTHENTICATION_FAILURE: Self = Self(0x08);
    /// SASL error
    pub const SASL_ERROR: Self = Self(0x09);
    /// SASL challenge
    pub const SASL_CHALLENGE: Self = Self(0x0a);
    /// Loopback-only user
    pub const SASL_AUTHENTICATION_FAILURE_LOOPBACK: Self = Self(0x0b);
    /// Virtual host access refused
    pub const VIRTUAL_HOST_ACCESS_FAILURE: Self = Self(0x0c);
    /// Unknown frame
    pub const UNKNOWN_FRAME: Self = Self(0x0d);
    /// Frame too large
    pub const FRAME_TOO_LARGE: Self = Self(0x0e);
    /// Internal error
    pub const INTERNAL_ERROR: Self = Self(0x0f);
    /// Access refused
    pub const ACCESS_REFUSED: Self = Self(0x10);
    /// Precondition failed
    pub const PRECONDITION_FAILED: Self = Self(0x11);
    /// Publisher does not exist
    pub const PUBLISHER_DOES_NOT_EXIST: Self = Self(0x12);
    /// No stored offset
    pub const NO_OFFSET: Self = Self(0x13);

    /// Check if the code reports success
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 == Self::OK.0
    }
}

impl From<u16> for ResponseCode {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
