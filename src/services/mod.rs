//! Feed services for delegate-pulse.
//!
//! Services produce events and hand them to the panels.
//!
//! - `generator` - Timer-driven canned event source
//! - `socket` - Connection-state wrapper around the broadcast wire
//! - `templates` - Per-dashboard template lists

pub mod generator;
pub mod socket;
pub mod templates;

use generator::EventSink;
use log::{debug, info, warn};
use pulse_bus::{Event, EventBus};
use socket::{SocketError, SocketService};
use std::rc::Rc;

/// Routes generated events through the socket when it is connected and
/// straight onto the bus otherwise (the mock path).
pub struct FeedRoute {
    socket: Rc<SocketService>,
    bus: EventBus,
}

impl FeedRoute {
    pub fn new(socket: Rc<SocketService>, bus: EventBus) -> Self {
        Self { socket, bus }
    }

    pub fn uses_socket(&self) -> bool {
        self.socket.is_connected()
    }
}

impl EventSink for FeedRoute {
    fn emit(&self, event: Event) {
        match self.socket.emit(&event) {
            Ok(()) => {}
            Err(SocketError::Disconnected) => {
                self.bus.publish(&event);
            }
            Err(SocketError::NoReceivers) => {
                debug!("No wire listeners, publishing {} directly", event.kind());
                self.bus.publish(&event);
            }
            Err(e) => {
                warn!("Socket emit failed ({}), publishing directly", e);
                self.bus.publish(&event);
            }
        }
    }
}

/// Try to bring the socket up. Returns true when events will go over the
/// wire.
pub fn start_socket(socket: &SocketService) -> bool {
    match socket.connect() {
        Ok(()) => {
            info!("Live feed routed over {}", socket.endpoint().unwrap_or("<unknown>"));
            true
        }
        Err(SocketError::NoEndpoint) => {
            info!("No socket endpoint configured, using direct mock feed");
            false
        }
        Err(e) => {
            warn!("Socket connect failed: {}. Using direct mock feed", e);
            false
        }
    }
}
