//! Glue between the socket wire and the in-process bus.
//!
//! Design principles:
//! - Broadcast wire (tokio) for anything arriving "from the network"
//! - Single polling timer on the UI loop drains the wire
//! - Decoded events are republished on the typed bus in arrival order
//!
//! The typed bus itself lives in the `pulse-bus` crate.

use log::warn;
use pulse_bus::{Event, EventBus};
use tokio::sync::broadcast::{Receiver, error::TryRecvError};

/// Socket wire capacity.
/// 64 is enough for burst handling without memory bloat.
/// Lagging receivers skip old envelopes.
pub const CHANNEL_CAPACITY: usize = 64;

/// Drain every pending envelope from `rx` and publish it on `bus`.
/// Returns how many events were published.
///
/// Lagged receivers keep draining from the oldest retained envelope.
/// Malformed envelopes are logged and dropped.
pub fn drain_wire(rx: &mut Receiver<String>, bus: &EventBus) -> usize {
    let mut published = 0;

    loop {
        match rx.try_recv() {
            Ok(raw) => match serde_json::from_str::<Event>(&raw) {
                Ok(event) => {
                    bus.publish(&event);
                    published += 1;
                }
                Err(e) => warn!("Dropping malformed socket envelope: {}", e),
            },
            Err(TryRecvError::Lagged(n)) => {
                warn!("Socket wire lagged, skipped {} envelopes", n);
                continue;
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    published
}

/// Final drain at shutdown: publish whatever is still on the wire, then
/// drop the receiver. Call before unmounting panels.
pub fn close_wire(wire: &mut Option<Receiver<String>>, bus: &EventBus) -> usize {
    match wire.take() {
        Some(mut rx) => drain_wire(&mut rx, bus),
        None => 0,
    }
}
