//! Blocking frame transport

mod socket;
mod transport;

pub use socket::TcpTransport;
pub use transport::{FramedTransport, StreamTransport, Transport, TransportConfig};
