//! Notification panels: the live activity list (Delegate) and the
//! insight list (MeetingAssassin). Both share one store and differ only in
//! which event kinds they mount.

pub mod feed;
pub mod priority;
pub mod render;
pub mod store;

use log::info;
use pulse_bus::{BusError, EventKind};

use crate::panel_manager::{PanelContext, PanelFactory, PanelInstance};
use crate::services::templates::Dashboard;
use feed::{MountedFeed, NotificationFeed};

pub struct FeedPanelFactory {
    type_id: &'static str,
    dashboard: Dashboard,
}

impl FeedPanelFactory {
    pub fn activity() -> Self {
        Self {
            type_id: "activity",
            dashboard: Dashboard::Delegate,
        }
    }

    pub fn insights() -> Self {
        Self {
            type_id: "insights",
            dashboard: Dashboard::MeetingAssassin,
        }
    }
}

impl PanelFactory for FeedPanelFactory {
    fn type_id(&self) -> &str {
        self.type_id
    }

    fn kinds(&self) -> &[EventKind] {
        self.dashboard.kinds()
    }

    fn create_instance(&self, ctx: &PanelContext) -> Result<Box<dyn PanelInstance>, BusError> {
        info!("Creating {} panel", self.type_id);
        let feed = NotificationFeed::mount(
            self.type_id,
            &ctx.bus,
            self.kinds(),
            ctx.store.clone(),
            ctx.clock.clone(),
        )?;
        Ok(Box::new(FeedPanel { feed }))
    }
}

struct FeedPanel {
    feed: MountedFeed,
}

impl PanelInstance for FeedPanel {
    fn name(&self) -> &str {
        self.feed.name()
    }

    fn delivered(&self) -> u64 {
        self.feed.delivered()
    }

    fn is_mounted(&self) -> bool {
        self.feed.is_mounted()
    }
}
