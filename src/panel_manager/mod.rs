use crate::panels::notifications::store::StoreHandle;
use log::{debug, info};
use pulse_bus::{BusError, EventBus};
use pulse_clock::Clock;
use std::sync::Arc;

pub mod factory;

pub use factory::PanelFactory;

/// Trait representing a mounted panel (mostly for keeping its subscriptions alive).
pub trait PanelInstance {
    fn name(&self) -> &str;

    /// Events the panel has projected into the store.
    fn delivered(&self) -> u64 {
        0
    }

    fn is_mounted(&self) -> bool {
        true
    }
}

/// Everything a panel needs at mount time.
#[derive(Clone)]
pub struct PanelContext {
    pub bus: EventBus,
    pub store: StoreHandle,
    pub clock: Arc<dyn Clock>,
}

/// The main manager that mounts and unmounts all panels.
#[derive(Default)]
pub struct PanelManager {
    factories: Vec<Box<dyn PanelFactory>>,
    instances: Vec<Box<dyn PanelInstance>>,
}

impl PanelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_factory<F: PanelFactory + 'static>(&mut self, factory: F) {
        self.factories.push(Box::new(factory));
    }

    pub fn register_boxed(&mut self, factory: Box<dyn PanelFactory>) {
        self.factories.push(factory);
    }

    /// Mount one instance per registered factory, in registration order.
    /// On failure, panels mounted so far are unmounted again.
    pub fn start(&mut self, ctx: &PanelContext) -> Result<usize, BusError> {
        for factory in &self.factories {
            match factory.create_instance(ctx) {
                Ok(instance) => {
                    debug!("Mounted panel '{}'", factory.type_id());
                    self.instances.push(instance);
                }
                Err(e) => {
                    self.instances.clear();
                    return Err(e);
                }
            }
        }

        info!("Mounted {} panels", self.instances.len());
        Ok(self.instances.len())
    }

    pub fn instances(&self) -> &[Box<dyn PanelInstance>] {
        &self.instances
    }

    /// Unmount every panel, releasing all subscriptions.
    pub fn shutdown(&mut self) {
        let count = self.instances.len();
        self.instances.clear();
        if count > 0 {
            info!("Unmounted {} panels", count);
        }
    }
}

impl Drop for PanelManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
