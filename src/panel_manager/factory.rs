use crate::panel_manager::{PanelContext, PanelInstance};
use pulse_bus::{BusError, EventKind};

/// Trait that defines a factory for creating a specific type of panel (e.g., activity, insights).
pub trait PanelFactory {
    /// Unique identifier for this panel type.
    fn type_id(&self) -> &str;

    /// Event kinds the panel subscribes to when mounted.
    fn kinds(&self) -> &[EventKind];

    /// Mounts a panel instance against the shared bus and store.
    /// This is where subscriptions are acquired; they are released when the
    /// instance is dropped.
    fn create_instance(&self, ctx: &PanelContext) -> Result<Box<dyn PanelInstance>, BusError>;
}
