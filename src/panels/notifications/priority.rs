//! Urgent/important placement for task updates.

use pulse_bus::Event;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    /// Urgent and important.
    DoFirst,
    /// Important, not urgent.
    Schedule,
    /// Urgent, not important.
    Delegate,
    /// Neither.
    Eliminate,
}

impl Quadrant {
    pub fn classify(urgent: bool, important: bool) -> Self {
        match (urgent, important) {
            (true, true) => Quadrant::DoFirst,
            (false, true) => Quadrant::Schedule,
            (true, false) => Quadrant::Delegate,
            (false, false) => Quadrant::Eliminate,
        }
    }

    /// Only task updates carry the flags.
    pub fn for_event(event: &Event) -> Option<Self> {
        match event {
            Event::TaskUpdate(task) => Some(Self::classify(task.urgent, task.important)),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::DoFirst => "do first",
            Quadrant::Schedule => "schedule",
            Quadrant::Delegate => "delegate",
            Quadrant::Eliminate => "eliminate",
        }
    }
}
