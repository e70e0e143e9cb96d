//! Socket service with an explicit connection state.
//!
//! There is no real server behind the dashboards. A "connection" is an
//! in-process broadcast wire carrying the same `{type, data}` JSON
//! envelope a websocket would. Without a configured endpoint the service
//! stays disconnected and callers take the direct mock path.

use crate::event_bus::CHANNEL_CAPACITY;
use log::{debug, info, warn};
use pulse_bus::Event;
use std::cell::{Cell, RefCell};
use tokio::sync::broadcast::{self, Receiver, Sender};

#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("Socket is not connected")]
    Disconnected,

    #[error("No socket endpoint configured")]
    NoEndpoint,

    #[error("Socket service has been disposed")]
    Disposed,

    #[error("Nobody is listening on the socket wire")]
    NoReceivers,

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Connection state. Emitting is only possible while `Connected`.
#[derive(Debug)]
pub enum SocketState {
    Disconnected,
    Connected { url: String, wire: Sender<String> },
}

impl SocketState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SocketState::Connected { .. })
    }
}

pub struct SocketService {
    endpoint: Option<String>,
    state: RefCell<SocketState>,
    disposed: Cell<bool>,
    sent: Cell<u64>,
}

impl SocketService {
    /// Build a disconnected service. Nothing happens until [`connect`].
    ///
    /// [`connect`]: SocketService::connect
    pub fn create(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            state: RefCell::new(SocketState::Disconnected),
            disposed: Cell::new(false),
            sent: Cell::new(0),
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Envelopes successfully put on the wire.
    pub fn sent(&self) -> u64 {
        self.sent.get()
    }

    /// Open the wire. No-op when already connected.
    pub fn connect(&self) -> Result<(), SocketError> {
        if self.disposed.get() {
            return Err(SocketError::Disposed);
        }
        if self.is_connected() {
            return Ok(());
        }
        let url = self.endpoint.clone().ok_or(SocketError::NoEndpoint)?;

        let (wire, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        info!("Socket connected to {}", url);
        *self.state.borrow_mut() = SocketState::Connected { url, wire };
        Ok(())
    }

    /// Close the wire. Safe to call when already disconnected.
    pub fn disconnect(&self) {
        let previous = self.state.replace(SocketState::Disconnected);
        if let SocketState::Connected { url, .. } = previous {
            info!("Socket disconnected from {}", url);
        }
    }

    /// Disconnect for good. Later `connect` calls fail.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.disconnect();
        debug!("Socket service disposed after {} envelopes", self.sent.get());
    }

    /// Receiver for envelopes emitted from now on.
    pub fn subscribe(&self) -> Result<Receiver<String>, SocketError> {
        match &*self.state.borrow() {
            SocketState::Connected { wire, .. } => Ok(wire.subscribe()),
            SocketState::Disconnected => Err(SocketError::Disconnected),
        }
    }

    /// Serialize `event` and put it on the wire.
    pub fn emit(&self, event: &Event) -> Result<(), SocketError> {
        let state = self.state.borrow();
        let SocketState::Connected { wire, .. } = &*state else {
            return Err(SocketError::Disconnected);
        };

        if wire.receiver_count() == 0 {
            return Err(SocketError::NoReceivers);
        }

        let envelope = serde_json::to_string(event)?;
        wire.send(envelope).map_err(|_| SocketError::NoReceivers)?;
        self.sent.set(self.sent.get() + 1);
        Ok(())
    }
}

impl Drop for SocketService {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Socket service dropped while connected");
        }
        self.dispose();
    }
}
