//! Frame-level transport over any byte stream.

use std::io::{self, ErrorKind, Read, Write};
use std::net::ToSocketAddrs;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, instrument, trace};

use super::socket::TcpTransport;
use crate::protocol::frame::{self, LENGTH_PREFIX_SIZE};
use crate::protocol::message::Tune;
use crate::protocol::{Decode, Encode, FrameConfig, Result, ServerCommand};

/// Transport configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportConfig {
    /// Optional read timeout for sockets.
    pub read_timeout: Option<Duration>,
    /// Optional write timeout for sockets.
    pub write_timeout: Option<Duration>,
    /// Disable Nagle's algorithm.
    pub nodelay: bool,
    /// Limits applied to inbound frames.
    pub frame: FrameConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            write_timeout: None,
            nodelay: true,
            frame: FrameConfig::default(),
        }
    }
}

/// Initial buffer size for a read; larger reads grow as bytes arrive.
const READ_CHUNK: usize = 64 * 1024;

/// Blocking byte transport.
pub trait Transport {
    /// Read exactly `len` bytes.
    fn read_exact(&mut self, len: usize) -> Result<Bytes>;

    /// Write all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

/// [`Transport`] over any `Read + Write` stream.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
}

impl<S> StreamTransport<S> {
    /// Wrap a stream
    pub const fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Borrow the stream
    pub const fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        // the length comes off the wire; don't allocate it up front
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
        let limit = u64::try_from(len).unwrap_or(u64::MAX);
        (&mut self.stream).take(limit).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(io::Error::from(ErrorKind::UnexpectedEof).into());
        }
        Ok(Bytes::from(buf))
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }
}

/// Sends and receives length-prefixed frames.
#[derive(Debug)]
pub struct FramedTransport<T> {
    transport: T,
    config: FrameConfig,
}

impl FramedTransport<TcpTransport> {
    /// Connect over TCP using `config`.
    #[instrument(level = "info", skip(addr, config))]
    pub fn connect(addr: impl ToSocketAddrs, config: &TransportConfig) -> Result<Self> {
        let transport = TcpTransport::connect(addr, config)?;
        Ok(Self::new(transport, config.frame))
    }
}

impl<T: Transport> FramedTransport<T> {
    /// Wrap a transport
    pub const fn new(transport: T, config: FrameConfig) -> Self {
        Self { transport, config }
    }

    /// Frame limits in force
    #[must_use]
    pub const fn config(&self) -> FrameConfig {
        self.config
    }

    /// Adopt the frame size negotiated through a tune exchange.
    pub fn apply_tune(&mut self, tune: &Tune) {
        debug!(
            frame_max = tune.frame_max,
            heartbeat = tune.heartbeat,
            "applying negotiated frame limit"
        );
        self.config.max_frame_size = tune.frame_max;
    }

    /// Borrow the underlying transport
    pub const fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Unwrap the underlying transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Encode `value` as one frame and write it.
    #[instrument(level = "trace", skip(self, value))]
    pub fn send<R: Encode + ?Sized>(&mut self, value: &R) -> Result<()> {
        let bytes = frame::encode_frame(value)?;
        trace!(len = bytes.len(), "sending frame");
        self.transport.write(&bytes)
    }

    /// Read one frame payload, length prefix stripped.
    #[instrument(level = "trace", skip(self))]
    pub fn receive_frame(&mut self) -> Result<Bytes> {
        let prefix = self.transport.read_exact(LENGTH_PREFIX_SIZE)?;
        let mut raw = [0; LENGTH_PREFIX_SIZE];
        raw.copy_from_slice(&prefix);
        let len = self
            .config
            .payload_len(raw)
            .inspect_err(|err| debug!(error = %err, "frame rejected"))?;
        trace!(len, "receiving frame");
        self.transport.read_exact(len)
    }

    /// Read one frame and decode it as `R`.
    pub fn receive<R: Decode>(&mut self) -> Result<R> {
        let payload = self.receive_frame()?;
        frame::decode_payload(payload)
    }

    /// Read one frame sent by the broker and decode it by key.
    pub fn receive_command(&mut self) -> Result<ServerCommand> {
        let payload = self.receive_frame()?;
        let command = ServerCommand::decode(payload)?;
        debug!(key = %command.key(), correlation_id = ?command.correlation_id(), "received command");
        Ok(command)
    }
}
