//! Transport capabilities consumed by the session
//!
//! The session never owns a socket; it drives these two seams and is fed
//! already-read bytes by whoever runs the I/O loop. Production impls live in
//! [`net`], scripted impls for tests in [`mock`].

use crate::error::Result;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};

pub mod mock;
pub mod net;

pub use mock::{MockLink, MockResolver};
pub use net::{DnsResolver, TcpControlLink, TelemetrySocket};

/// Hostname resolution capability
pub trait Resolver {
    /// Resolve a hostname to one address
    fn resolve(&mut self, host: &str) -> Result<IpAddr>;
}

/// Outbound control channel capability
///
/// Writes are fire-and-forget: no acknowledgement, no retry, no delivery
/// confirmation. Inbound data and lifecycle notifications travel the other
/// way, through the session's `handle_*` entry points.
pub trait ControlLink {
    /// Establish the channel; returning `Ok` is the socket-connected event
    fn connect(&mut self, addr: SocketAddr) -> Result<()>;

    /// Send one encoded frame
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Close the channel, dropping anything in flight
    fn close(&mut self);

    /// Whether the channel is currently open
    fn is_open(&self) -> bool;
}

/// Shared handle over a link, so the I/O driver can keep reading the same
/// channel the session writes to
impl<T: ControlLink> ControlLink for Arc<Mutex<T>> {
    fn connect(&mut self, addr: SocketAddr) -> Result<()> {
        self.lock().unwrap_or_else(|e| e.into_inner()).connect(addr)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.lock().unwrap_or_else(|e| e.into_inner()).send(bytes)
    }

    fn close(&mut self) {
        self.lock().unwrap_or_else(|e| e.into_inner()).close()
    }

    fn is_open(&self) -> bool {
        self.lock().unwrap_or_else(|e| e.into_inner()).is_open()
    }
}
