//! Exchange peer properties with a local RabbitMQ stream broker
//!
//! Run against a broker with the stream plugin enabled on port 5552.

use stream_wire::protocol::message::{PROTOCOL_VERSION, PeerPropertiesRequest, Property};
use stream_wire::{DEFAULT_PORT, FramedTransport, Key, ServerCommand, TransportConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Stream peer properties");
    println!("======================\n");

    let config = TransportConfig::default();
    let mut framed = FramedTransport::connect(("localhost", DEFAULT_PORT), &config)?;

    let request = PeerPropertiesRequest {
        key: Key::PeerProperties.as_u16(),
        version: PROTOCOL_VERSION,
        correlation_id: 1,
        peer_properties: vec![
            Property::new("product", "stream-wire"),
            Property::new("platform", "Rust"),
        ],
    };
    framed.send(&request)?;
    println!("Sent peer properties (correlation id {})", request.correlation_id);

    match framed.receive_command()? {
        ServerCommand::PeerProperties(response) => {
            println!("Response code: {:#04x}", response.response_code);
            for property in response.peer_properties {
                println!(
                    "  {} = {}",
                    property.key.as_deref().unwrap_or("<null>"),
                    property.value.as_deref().unwrap_or("<null>")
                );
            }
        }
        other => println!("Unexpected command: {}", other.key()),
    }

    Ok(())
}
