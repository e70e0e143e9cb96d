//! Core types for pulse-bus

use crate::error::BusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of event kinds the dashboards know about.
///
/// The first four feed the Delegate activity views, the last four the
/// MeetingAssassin insight views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AgentActivity,
    TaskUpdate,
    MeetingScheduled,
    EmailProcessed,
    Decision,
    Optimization,
    Analysis,
    Intervention,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 8] = [
        EventKind::AgentActivity,
        EventKind::TaskUpdate,
        EventKind::MeetingScheduled,
        EventKind::EmailProcessed,
        EventKind::Decision,
        EventKind::Optimization,
        EventKind::Analysis,
        EventKind::Intervention,
    ];

    /// Stable wire name, e.g. `agent_activity`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AgentActivity => "agent_activity",
            EventKind::TaskUpdate => "task_update",
            EventKind::MeetingScheduled => "meeting_scheduled",
            EventKind::EmailProcessed => "email_processed",
            EventKind::Decision => "decision",
            EventKind::Optimization => "optimization",
            EventKind::Analysis => "analysis",
            EventKind::Intervention => "intervention",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BusError::UnknownKind(s.to_string()))
    }
}

/// An agent started, progressed or finished a piece of work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentActivity {
    pub agent: String,
    pub action: String,
    /// 0-100
    pub progress: u8,
}

/// A delegated task changed state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub task: String,
    pub status: String,
    /// 0-100
    pub progress: u8,
    pub urgent: bool,
    pub important: bool,
}

/// A meeting landed on the calendar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingScheduled {
    pub title: String,
    pub starts_at: String,
    pub attendees: u32,
}

/// An inbound email was triaged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailProcessed {
    pub sender: String,
    pub subject: String,
    pub action: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub meeting: String,
    pub decision: String,
    /// 0-100
    pub confidence: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimization {
    pub target: String,
    pub generation: u32,
    /// Improvement over the previous schedule, in percent.
    pub improvement: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub meeting: String,
    pub insight: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub meeting: String,
    pub reason: String,
    pub suggestion: String,
}

/// A simulated occurrence broadcast on the bus.
///
/// Serializes as `{"type": "<kind>", "data": {...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    AgentActivity(AgentActivity),
    TaskUpdate(TaskUpdate),
    MeetingScheduled(MeetingScheduled),
    EmailProcessed(EmailProcessed),
    Decision(Decision),
    Optimization(Optimization),
    Analysis(Analysis),
    Intervention(Intervention),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::AgentActivity(_) => EventKind::AgentActivity,
            Event::TaskUpdate(_) => EventKind::TaskUpdate,
            Event::MeetingScheduled(_) => EventKind::MeetingScheduled,
            Event::EmailProcessed(_) => EventKind::EmailProcessed,
            Event::Decision(_) => EventKind::Decision,
            Event::Optimization(_) => EventKind::Optimization,
            Event::Analysis(_) => EventKind::Analysis,
            Event::Intervention(_) => EventKind::Intervention,
        }
    }

    /// Short title and body line for user-facing projections.
    pub fn summary(&self) -> (String, String) {
        match self {
            Event::AgentActivity(a) => (
                a.agent.clone(),
                format!("{} ({}%)", a.action, a.progress.min(100)),
            ),
            Event::TaskUpdate(t) => (
                format!("Task: {}", t.task),
                format!("{} ({}%)", t.status, t.progress.min(100)),
            ),
            Event::MeetingScheduled(m) => (
                "Meeting scheduled".to_string(),
                format!("{} at {} with {} attendees", m.title, m.starts_at, m.attendees),
            ),
            Event::EmailProcessed(e) => (
                format!("Email from {}", e.sender),
                format!("{}: {}", e.action, e.subject),
            ),
            Event::Decision(d) => (
                format!("Decision in {}", d.meeting),
                format!("{} ({}% confidence)", d.decision, d.confidence.min(100)),
            ),
            Event::Optimization(o) => (
                format!("Optimized {}", o.target),
                format!("Generation {}: +{}% efficiency", o.generation, o.improvement),
            ),
            Event::Analysis(a) => (format!("Analysis of {}", a.meeting), a.insight.clone()),
            Event::Intervention(i) => (
                format!("Intervention in {}", i.meeting),
                format!("{} Suggestion: {}", i.reason, i.suggestion),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names_parse_back() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
        assert!(matches!(
            "genetic_algorithm".parse::<EventKind>(),
            Err(BusError::UnknownKind(name)) if name == "genetic_algorithm"
        ));
    }

    #[test]
    fn test_event_envelope_shape() {
        let event = Event::AgentActivity(AgentActivity {
            agent: "Scheduler".to_string(),
            action: "Rescheduled standup".to_string(),
            progress: 100,
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "agent_activity");
        assert_eq!(value["data"]["agent"], "Scheduler");
        assert_eq!(value["data"]["progress"], 100);
    }

    #[test]
    fn test_summary_clamps_percentages() {
        let event = Event::Decision(Decision {
            meeting: "Q3 Planning".to_string(),
            decision: "Ship beta".to_string(),
            confidence: 250,
        });
        let (title, body) = event.summary();
        assert_eq!(title, "Decision in Q3 Planning");
        assert_eq!(body, "Ship beta (100% confidence)");
    }
}
