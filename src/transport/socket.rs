//! TCP socket wrapper for the stream protocol.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use super::transport::{StreamTransport, Transport, TransportConfig};
use crate::protocol::Result;

/// Blocking TCP connection to a broker.
#[derive(Debug)]
pub struct TcpTransport {
    inner: StreamTransport<TcpStream>,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Connect and apply the socket options from `config`.
    pub fn connect(addr: impl ToSocketAddrs, config: &TransportConfig) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream, config)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream, config: &TransportConfig) -> Result<Self> {
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        stream.set_nodelay(config.nodelay)?;
        let peer = stream.peer_addr()?;
        debug!(%peer, nodelay = config.nodelay, "connected");
        Ok(Self {
            inner: StreamTransport::new(stream),
            peer,
        })
    }

    /// Remote address
    #[must_use]
    pub const fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Set socket read timeout.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }
}

impl Transport for TcpTransport {
    fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        self.inner.read_exact(len)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write(bytes)
    }
}
