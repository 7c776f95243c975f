//! Production transport implementations over std sockets

use super::{ControlLink, Resolver};
use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Default TCP connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// System resolver backed by `ToSocketAddrs`
#[derive(Debug, Default)]
pub struct DnsResolver;

impl Resolver for DnsResolver {
    fn resolve(&mut self, host: &str) -> Result<IpAddr> {
        // Port is irrelevant here, the session picks its own
        let mut addrs = (host, 0u16).to_socket_addrs().map_err(|e| Error::Resolve {
            host: host.to_string(),
            message: e.to_string(),
        })?;
        addrs
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| Error::Resolve {
                host: host.to_string(),
                message: "no addresses returned".to_string(),
            })
    }
}

/// TCP control channel
///
/// Connect blocks up to [`CONNECT_TIMEOUT`], then the stream is switched to
/// non-blocking for the driver's read loop. `TCP_NODELAY` is set: control
/// frames are tiny and latency matters more than throughput.
#[derive(Debug, Default)]
pub struct TcpControlLink {
    stream: Option<TcpStream>,
}

impl TcpControlLink {
    /// Create an unconnected link
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking read of whatever bytes are available
    ///
    /// Returns `Ok(None)` when no data is pending, `Ok(Some(0))` on graceful
    /// remote close, `Ok(Some(n))` otherwise. Driver-side API, not part of
    /// the session-facing trait.
    pub fn recv(&mut self, buffer: &mut [u8]) -> Result<Option<usize>> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        match stream.read(buffer) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => Ok(Some(0)),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl ControlLink for TcpControlLink {
    fn connect(&mut self, addr: SocketAddr) -> Result<()> {
        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?;
        stream.set_nodelay(true)?;
        stream.set_nonblocking(true)?;
        log::info!("Control channel connected to {}", addr);
        self.stream = Some(stream);
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        stream.write_all(bytes)?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            log::info!("Control channel closed");
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

/// Receive-only UDP telemetry socket
pub struct TelemetrySocket {
    socket: UdpSocket,
}

impl TelemetrySocket {
    /// Bind on all interfaces at the given port, non-blocking
    pub fn bind(port: u16) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        socket.set_nonblocking(true)?;
        log::info!("Telemetry socket bound on 0.0.0.0:{}", port);
        Ok(Self { socket })
    }

    /// Receive one datagram if available, `Ok(None)` when none is pending
    pub fn recv_datagram(&self, buffer: &mut [u8]) -> Result<Option<usize>> {
        match self.socket.recv_from(buffer) {
            Ok((n, _peer)) => Ok(Some(n)),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
