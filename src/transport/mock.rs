//! Mock transport capabilities for testing

use super::{ControlLink, Resolver};
use crate::error::{Error, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

/// Scripted resolver for unit testing
pub struct MockResolver {
    outcome: std::result::Result<IpAddr, String>,
}

impl MockResolver {
    /// Resolver that always succeeds with a fixed address
    pub fn resolving_to(addr: IpAddr) -> Self {
        Self { outcome: Ok(addr) }
    }

    /// Resolver that always succeeds with 127.0.0.1
    pub fn localhost() -> Self {
        Self::resolving_to(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    /// Resolver that always fails with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

impl Resolver for MockResolver {
    fn resolve(&mut self, host: &str) -> Result<IpAddr> {
        match &self.outcome {
            Ok(addr) => Ok(*addr),
            Err(message) => Err(Error::Resolve {
                host: host.to_string(),
                message: message.clone(),
            }),
        }
    }
}

/// Mock control link for unit testing
///
/// Cloneable handle over shared state, so a test can keep inspecting what
/// the session wrote after handing the link over.
#[derive(Clone, Default)]
pub struct MockLink {
    inner: Arc<Mutex<MockLinkInner>>,
}

#[derive(Default)]
struct MockLinkInner {
    open: bool,
    written: Vec<u8>,
    connect_error: Option<String>,
    connected_to: Option<SocketAddr>,
}

impl MockLink {
    /// Create a closed mock link
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next connect attempt fail with the given message
    pub fn fail_next_connect(&self, message: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.connect_error = Some(message.to_string());
    }

    /// Everything written since the last [`clear_sent`](Self::clear_sent)
    pub fn sent(&self) -> Vec<u8> {
        let inner = self.inner.lock().unwrap();
        inner.written.clone()
    }

    /// Written bytes as a string, for frame-level assertions
    pub fn sent_text(&self) -> String {
        String::from_utf8_lossy(&self.sent()).into_owned()
    }

    /// Forget everything written so far
    pub fn clear_sent(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.written.clear();
    }

    /// Address of the last successful connect
    pub fn connected_to(&self) -> Option<SocketAddr> {
        let inner = self.inner.lock().unwrap();
        inner.connected_to
    }
}

impl ControlLink for MockLink {
    fn connect(&mut self, addr: SocketAddr) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = inner.connect_error.take() {
            return Err(Error::Other(message));
        }
        inner.open = true;
        inner.connected_to = Some(addr);
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.open {
            return Err(Error::NotConnected);
        }
        inner.written.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.open = false;
    }

    fn is_open(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.open
    }
}
