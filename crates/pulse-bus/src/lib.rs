//! pulse-bus - Typed in-process event bus
//!
//! Features:
//! - Closed event kind enumeration with typed payloads (no stringly-typed names)
//! - Synchronous delivery in registration order
//! - RAII subscriptions that are safe to drop mid-publish

pub mod bus;
pub mod error;
pub mod types;

pub use bus::{EventBus, Subscription};
pub use error::BusError;
pub use types::{
    AgentActivity, Analysis, Decision, EmailProcessed, Event, EventKind, Intervention,
    MeetingScheduled, Optimization, TaskUpdate,
};
