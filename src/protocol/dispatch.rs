//! Decoding of frames sent by the broker
//!
//! The frame key selects the record. Broker responses carry
//! [`RESPONSE_FLAG`](super::RESPONSE_FLAG); broker-initiated commands
//! (deliveries, confirms, heartbeats, tune, close) do not.

use bytes::Bytes;
use tracing::{debug, trace};

use super::frame::{decode_payload, peek_key};
use super::message::{
    CloseRequest, CloseResponse, CommandResponse, CreditResponse, DeclarePublisherResponse,
    DeletePublisherResponse, Deliver, Heartbeat, MetadataResponse, MetadataUpdate, OpenResponse,
    PeerPropertiesResponse, PublishConfirm, PublishError, QueryOffsetResponse,
    QueryPublisherResponse, SaslAuthenticateResponse, SaslHandshakeResponse, Tune,
};
use super::{Error, Key, Result};

/// A frame received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    /// Broker properties
    PeerProperties(PeerPropertiesResponse),
    /// Supported SASL mechanisms
    SaslHandshake(SaslHandshakeResponse),
    /// Authentication result
    SaslAuthenticate(SaslAuthenticateResponse),
    /// Broker tuning proposal
    Tune(Tune),
    /// Virtual host opened
    Open(OpenResponse),
    /// Broker is closing the connection
    Close(CloseRequest),
    /// Broker acknowledged our close
    CloseResponse(CloseResponse),
    /// Keep-alive
    Heartbeat(Heartbeat),
    /// Publisher declared
    DeclarePublisher(DeclarePublisherResponse),
    /// Last stored publishing sequence
    QueryPublisherSequence(QueryPublisherResponse),
    /// Publisher deleted
    DeletePublisher(DeletePublisherResponse),
    /// Published messages stored
    PublishConfirm(PublishConfirm),
    /// Published message rejected
    PublishError(PublishError),
    /// Chunk delivery
    Deliver(Deliver),
    /// Credit request failed
    Credit(CreditResponse),
    /// Stored consumer offset
    QueryOffset(QueryOffsetResponse),
    /// Stream topology
    Metadata(MetadataResponse),
    /// Topology change
    MetadataUpdate(MetadataUpdate),
    /// Plain response to subscribe, unsubscribe, create or delete
    Response(CommandResponse),
}

impl ServerCommand {
    /// Decode a frame payload (length prefix already stripped).
    ///
    /// # Errors
    ///
    /// [`Error::UnknownOperation`] if the key is not one the broker sends in
    /// that direction, otherwise the record's decode error.
    pub fn decode(payload: Bytes) -> Result<Self> {
        let len = payload.len();
        Self::decode_keyed(payload)
            .inspect_err(|err| debug!(len, error = %err, path = %err.path(), "server frame rejected"))
    }

    fn decode_keyed(payload: Bytes) -> Result<Self> {
        let raw = peek_key(&payload)?;
        let (key, is_response) = Key::from_wire(raw).ok_or(Error::UnknownOperation { key: raw })?;
        trace!(%key, is_response, len = payload.len(), "decoding server frame");

        let command = match (key, is_response) {
            (Key::PeerProperties, true) => Self::PeerProperties(decode_payload(payload)?),
            (Key::SaslHandshake, true) => Self::SaslHandshake(decode_payload(payload)?),
            (Key::SaslAuthenticate, true) => Self::SaslAuthenticate(decode_payload(payload)?),
            (Key::Tune, false) => Self::Tune(decode_payload(payload)?),
            (Key::Open, true) => Self::Open(decode_payload(payload)?),
            (Key::Close, false) => Self::Close(decode_payload(payload)?),
            (Key::Close, true) => Self::CloseResponse(decode_payload(payload)?),
            (Key::Heartbeat, false) => Self::Heartbeat(decode_payload(payload)?),
            (Key::DeclarePublisher, true) => Self::DeclarePublisher(decode_payload(payload)?),
            (Key::QueryPublisherSequence, true) => {
                Self::QueryPublisherSequence(decode_payload(payload)?)
            }
            (Key::DeletePublisher, true) => Self::DeletePublisher(decode_payload(payload)?),
            (Key::PublishConfirm, false) => Self::PublishConfirm(decode_payload(payload)?),
            (Key::PublishError, false) => Self::PublishError(decode_payload(payload)?),
            (Key::Deliver, false) => Self::Deliver(decode_payload(payload)?),
            (Key::Credit, true) => Self::Credit(decode_payload(payload)?),
            (Key::QueryOffset, true) => Self::QueryOffset(decode_payload(payload)?),
            (Key::Metadata, true) => Self::Metadata(decode_payload(payload)?),
            (Key::MetadataUpdate, false) => Self::MetadataUpdate(decode_payload(payload)?),
            (Key::Subscribe | Key::Unsubscribe | Key::Create | Key::Delete, true) => {
                Self::Response(decode_payload(payload)?)
            }
            _ => return Err(Error::UnknownOperation { key: raw }),
        };
        Ok(command)
    }

    /// Command key, response flag cleared
    #[must_use]
    pub fn key(&self) -> Key {
        match self {
            Self::PeerProperties(_) => Key::PeerProperties,
            Self::SaslHandshake(_) => Key::SaslHandshake,
            Self::SaslAuthenticate(_) => Key::SaslAuthenticate,
            Self::Tune(_) => Key::Tune,
            Self::Open(_) => Key::Open,
            Self::Close(_) | Self::CloseResponse(_) => Key::Close,
            Self::Heartbeat(_) => Key::Heartbeat,
            Self::DeclarePublisher(_) => Key::DeclarePublisher,
            Self::QueryPublisherSequence(_) => Key::QueryPublisherSequence,
            Self::DeletePublisher(_) => Key::DeletePublisher,
            Self::PublishConfirm(_) => Key::PublishConfirm,
            Self::PublishError(_) => Key::PublishError,
            Self::Deliver(_) => Key::Deliver,
            Self::Credit(_) => Key::Credit,
            Self::QueryOffset(_) => Key::QueryOffset,
            Self::Metadata(_) => Key::Metadata,
            Self::MetadataUpdate(_) => Key::MetadataUpdate,
            Self::Response(response) => {
                Key::from_wire(response.key).map_or(Key::Subscribe, |(key, _)| key)
            }
        }
    }

    /// Correlation id of a response to one of our requests
    #[must_use]
    pub fn correlation_id(&self) -> Option<u32> {
        match self {
            Self::PeerProperties(r) => Some(r.correlation_id),
            Self::SaslHandshake(r) => Some(r.correlation_id),
            Self::SaslAuthenticate(r) => Some(r.correlation_id),
            Self::Open(r) => Some(r.correlation_id),
            Self::CloseResponse(r) => Some(r.correlation_id),
            Self::DeclarePublisher(r) => Some(r.correlation_id),
            Self::QueryPublisherSequence(r) => Some(r.correlation_id),
            Self::DeletePublisher(r) => Some(r.correlation_id),
            Self::QueryOffset(r) => Some(r.correlation_id),
            Self::Metadata(r) => Some(r.correlation_id),
            Self::Response(r) => Some(r.correlation_id),
            Self::Close(_)
            | Self::Tune(_)
            | Self::Heartbeat(_)
            | Self::PublishConfirm(_)
            | Self::PublishError(_)
            | Self::Deliver(_)
            | Self::Credit(_)
            | Self::MetadataUpdate(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::{PROTOCOL_VERSION, Property, PublishingError};
    use crate::protocol::{Encode, Record, codec};

    fn payload<T: Encode>(value: &T) -> Bytes {
        codec::encode(value).unwrap()
    }

    #[test]
    fn test_peer_properties_response() {
        let response = PeerPropertiesResponse {
            key: Key::PeerProperties.response_wire(),
            version: PROTOCOL_VERSION,
            correlation_id: 1,
            response_code: 1,
            peer_properties: vec![Property::new("product", "RabbitMQ")],
        };
        let command = ServerCommand::decode(payload(&response)).unwrap();
        assert_eq!(command.key(), Key::PeerProperties);
        assert_eq!(command.correlation_id(), Some(1));
        assert_eq!(command, ServerCommand::PeerProperties(response));
    }

    #[test]
    fn test_broker_initiated_commands() {
        let tune = Tune {
            key: Key::Tune.as_u16(),
            version: 1,
            frame_max: 1_048_576,
            heartbeat: 60,
        };
        assert_eq!(
            ServerCommand::decode(payload(&tune)).unwrap(),
            ServerCommand::Tune(tune)
        );

        let error = PublishError {
            key: Key::PublishError.as_u16(),
            version: 1,
            publisher_id: 2,
            publishing_error: PublishingError {
                publishing_id: 10,
                code: 0x12,
            },
        };
        let command = ServerCommand::decode(payload(&error)).unwrap();
        assert_eq!(command.correlation_id(), None);
        assert_eq!(command, ServerCommand::PublishError(error));
    }

    #[test]
    fn test_close_in_both_directions() {
        let close = CloseRequest {
            key: Key::Close.as_u16(),
            version: 1,
            correlation_id: 4,
            closing_code: 1,
            closing_reason: Some("shutdown".into()),
        };
        assert!(matches!(
            ServerCommand::decode(payload(&close)).unwrap(),
            ServerCommand::Close(_)
        ));

        let response = CloseResponse {
            key: Key::Close.response_wire(),
            version: 1,
            correlation_id: 4,
            response_code: 1,
        };
        assert!(matches!(
            ServerCommand::decode(payload(&response)).unwrap(),
            ServerCommand::CloseResponse(_)
        ));
    }

    #[test]
    fn test_generic_response() {
        let response = CommandResponse {
            key: Key::Subscribe.response_wire(),
            version: 1,
            correlation_id: 8,
            response_code: 2,
        };
        let command = ServerCommand::decode(response.to_bytes().unwrap()).unwrap();
        assert_eq!(command.key(), Key::Subscribe);
        assert_eq!(command.correlation_id(), Some(8));
    }

    #[test]
    fn test_unknown_key() {
        let err = ServerCommand::decode(Bytes::from_static(&[0x00, 0x63, 0x00, 0x01])).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation { key: 0x0063 }));
    }

    #[test]
    fn test_client_only_key_rejected() {
        // a publish never comes from the broker
        let err = ServerCommand::decode(Bytes::from_static(&[0x00, 0x02, 0x00, 0x01])).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation { key: 0x0002 }));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = payload(&Heartbeat {
            key: Key::Heartbeat.as_u16(),
            version: 1,
        })
        .to_vec();
        bytes.push(0);
        let err = ServerCommand::decode(Bytes::from(bytes)).unwrap_err();
        assert!(matches!(err, Error::TrailingBytes { consumed: 4, delivered: 5 }));
    }

    #[test]
    fn test_empty_payload() {
        assert!(ServerCommand::decode(Bytes::new()).unwrap_err().is_insufficient_data());
    }
}
