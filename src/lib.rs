//! delegate-pulse - live event feed and notification queue for the Delegate
//! dashboards.
//!
//! Event generator -> typed bus -> panel feeds -> notification store -> view.

pub mod config;
pub mod event_bus;
pub mod functions;
pub mod logging;
pub mod panel_manager;
pub mod panels;
pub mod services;

pub use config::{Config, ConfigError};
pub use panels::notifications::render::{RenderOptions, RenderedView, UserAction, render};
pub use panels::notifications::store::{
    Notification, NotificationCenter, NotificationStore, StoreCapacity, StoreHandle,
};
pub use services::generator::{EventGenerator, SelectionMode};
pub use services::socket::{SocketError, SocketService};
pub use services::templates::Dashboard;
