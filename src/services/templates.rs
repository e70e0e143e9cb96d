//! Canned event templates for the two dashboards.

use pulse_bus::{
    AgentActivity, Analysis, Decision, EmailProcessed, Event, EventKind, Intervention,
    MeetingScheduled, Optimization, TaskUpdate,
};
use serde::{Deserialize, Serialize};

const DELEGATE_KINDS: &[EventKind] = &[
    EventKind::AgentActivity,
    EventKind::TaskUpdate,
    EventKind::MeetingScheduled,
    EventKind::EmailProcessed,
];

const MEETING_ASSASSIN_KINDS: &[EventKind] = &[
    EventKind::Decision,
    EventKind::Optimization,
    EventKind::Analysis,
    EventKind::Intervention,
];

/// Which dashboard the feed simulates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dashboard {
    #[default]
    Delegate,
    MeetingAssassin,
}

impl Dashboard {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dashboard::Delegate => "delegate",
            Dashboard::MeetingAssassin => "meeting_assassin",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "delegate" => Some(Dashboard::Delegate),
            "meeting_assassin" | "meetingassassin" => Some(Dashboard::MeetingAssassin),
            _ => None,
        }
    }

    /// Kinds the dashboard's panels listen to.
    pub fn kinds(&self) -> &'static [EventKind] {
        match self {
            Dashboard::Delegate => DELEGATE_KINDS,
            Dashboard::MeetingAssassin => MEETING_ASSASSIN_KINDS,
        }
    }

    /// Ordered template list the generator cycles through.
    pub fn templates(&self) -> Vec<Event> {
        match self {
            Dashboard::Delegate => delegate_templates(),
            Dashboard::MeetingAssassin => meeting_assassin_templates(),
        }
    }
}

fn delegate_templates() -> Vec<Event> {
    vec![
        Event::AgentActivity(AgentActivity {
            agent: "Scheduling Agent".to_string(),
            action: "Found a slot for the design review".to_string(),
            progress: 75,
        }),
        Event::TaskUpdate(TaskUpdate {
            task: "Prepare Q3 board deck".to_string(),
            status: "In progress".to_string(),
            progress: 60,
            urgent: true,
            important: true,
        }),
        Event::MeetingScheduled(MeetingScheduled {
            title: "Vendor sync".to_string(),
            starts_at: "Tomorrow 10:00".to_string(),
            attendees: 4,
        }),
        Event::EmailProcessed(EmailProcessed {
            sender: "sarah@acme.io".to_string(),
            subject: "Contract renewal".to_string(),
            action: "Drafted reply".to_string(),
        }),
    ]
}

fn meeting_assassin_templates() -> Vec<Event> {
    vec![
        Event::Decision(Decision {
            meeting: "Weekly standup".to_string(),
            decision: "Cancel: status covered async".to_string(),
            confidence: 92,
        }),
        Event::Optimization(Optimization {
            target: "Team calendar".to_string(),
            generation: 42,
            improvement: 18,
        }),
        Event::Analysis(Analysis {
            meeting: "Roadmap review".to_string(),
            insight: "Three attendees have not spoken in the last four sessions".to_string(),
        }),
        Event::Intervention(Intervention {
            meeting: "Budget planning".to_string(),
            reason: "Running 20 minutes over.".to_string(),
            suggestion: "Move remaining items to a doc".to_string(),
        }),
    ]
}
