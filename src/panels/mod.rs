//! Dashboard panels.
//!
//! Each panel owns a mounted notification feed bound to the shared store.

pub mod notifications;

use crate::panel_manager::PanelFactory;
use crate::services::templates::Dashboard;
use notifications::FeedPanelFactory;

/// Factories for the panels a dashboard shows.
pub fn factories_for(dashboard: Dashboard) -> Vec<Box<dyn PanelFactory>> {
    match dashboard {
        Dashboard::Delegate => vec![Box::new(FeedPanelFactory::activity())],
        Dashboard::MeetingAssassin => vec![Box::new(FeedPanelFactory::insights())],
    }
}
