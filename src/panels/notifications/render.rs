//! Render layer: derives the toast stack and the panel list from a store
//! snapshot, and routes user clicks back into the store.
//!
//! Holds no state of its own.

use chrono::{DateTime, Utc};
use log::debug;

use super::store::{Notification, StoreHandle, StoreSnapshot};
use crate::functions::formatting::{relative_age, truncate};

/// Shown in place of the panel list when the store is empty.
pub const EMPTY_PLACEHOLDER: &str = "No notifications";

/// Characters of the id shown (and accepted) in the terminal view.
const SHORT_ID_LEN: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Newest unread entries shown as toasts.
    pub toast_limit: usize,
    /// Entries shown in the panel list; older ones are counted as hidden.
    pub panel_window: usize,
    pub body_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            toast_limit: 3,
            panel_window: 20,
            body_width: 72,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub badge: &'static str,
    pub quadrant: Option<&'static str>,
    pub title: String,
    pub body: String,
    pub age: String,
    pub read: bool,
}

impl Row {
    fn from_notification(n: &Notification, now: DateTime<Utc>, body_width: usize) -> Self {
        Self {
            id: n.id.clone(),
            badge: n.kind.as_str(),
            quadrant: n.quadrant.map(|q| q.label()),
            title: n.title.clone(),
            body: truncate(&n.body, body_width),
            age: relative_age(n.created_at, now),
            read: n.read,
        }
    }

    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(SHORT_ID_LEN)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }

    fn line(&self) -> String {
        let marker = if self.read { ' ' } else { '*' };
        let quadrant = self
            .quadrant
            .map(|q| format!(" [{q}]"))
            .unwrap_or_default();
        format!(
            "{marker} {:<8} {:<17}{} {} - {} ({})",
            self.short_id(),
            self.badge,
            quadrant,
            self.title,
            self.body,
            self.age
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelBody {
    Empty { placeholder: &'static str },
    Rows(Vec<Row>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedView {
    pub toasts: Vec<Row>,
    pub panel: PanelBody,
    pub unread: usize,
    pub total: usize,
    /// Entries beyond `panel_window`.
    pub hidden: usize,
}

impl RenderedView {
    /// Plain-text form for the terminal demo.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        for toast in &self.toasts {
            lines.push(format!("[toast] {}: {}", toast.title, toast.body));
        }

        lines.push(format!(
            "== Notifications ({} unread / {}) ==",
            self.unread, self.total
        ));
        match &self.panel {
            PanelBody::Empty { placeholder } => lines.push(format!("  {placeholder}")),
            PanelBody::Rows(rows) => lines.extend(rows.iter().map(Row::line)),
        }
        if self.hidden > 0 {
            lines.push(format!("  ... {} older", self.hidden));
        }

        lines
    }
}

pub fn render(snapshot: &StoreSnapshot, now: DateTime<Utc>, options: &RenderOptions) -> RenderedView {
    let total = snapshot.entries.len();

    let toasts = snapshot
        .entries
        .iter()
        .filter(|n| !n.read)
        .take(options.toast_limit)
        .map(|n| Row::from_notification(n, now, options.body_width))
        .collect();

    let panel = if snapshot.entries.is_empty() {
        PanelBody::Empty {
            placeholder: EMPTY_PLACEHOLDER,
        }
    } else {
        PanelBody::Rows(
            snapshot
                .entries
                .iter()
                .take(options.panel_window)
                .map(|n| Row::from_notification(n, now, options.body_width))
                .collect(),
        )
    };

    RenderedView {
        toasts,
        panel,
        unread: snapshot.unread,
        total,
        hidden: total.saturating_sub(options.panel_window),
    }
}

/// Interaction coming back from the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    /// Click a row or toast: marks it read.
    Open(String),
    /// Close button: removes it.
    Dismiss(String),
    MarkAllRead,
    ClearAll,
}

impl UserAction {
    /// Parse a terminal command (`open <id>`, `dismiss <id>`, `read-all`,
    /// `clear`).
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?;
        let arg = parts.next();

        match (command, arg) {
            ("open" | "read", Some(id)) => Some(UserAction::Open(id.to_string())),
            ("dismiss" | "rm", Some(id)) => Some(UserAction::Dismiss(id.to_string())),
            ("read-all", None) => Some(UserAction::MarkAllRead),
            ("clear", None) => Some(UserAction::ClearAll),
            _ => None,
        }
    }
}

/// Apply `action` to the store. Unknown ids are silent no-ops.
/// Returns whether the store changed.
pub fn dispatch(store: &StoreHandle, action: UserAction) -> bool {
    debug!("User action: {:?}", action);
    match action {
        UserAction::Open(id) => store.mark_read(&resolve_id(store, &id)),
        UserAction::Dismiss(id) => store.remove(&resolve_id(store, &id)),
        UserAction::MarkAllRead => store.mark_all_read() > 0,
        UserAction::ClearAll => {
            let had_entries = store.with(|s| !s.is_empty());
            store.clear();
            had_entries
        }
    }
}

/// Expand a displayed short id to the full id when exactly one entry
/// matches; otherwise the input is returned unchanged.
fn resolve_id(store: &StoreHandle, id: &str) -> String {
    store.with(|s| {
        if s.get(id).is_some() {
            return id.to_string();
        }
        let mut matches = s.iter().filter(|n| n.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(only), None) if !id.is_empty() => only.id.clone(),
            _ => id.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::notifications::store::{NotificationCenter, StoreCapacity};
    use chrono::TimeZone;
    use pulse_bus::EventKind;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn note(id: &str, secs: i64) -> Notification {
        Notification::new(id, EventKind::Decision, format!("title {id}"), "body", at(secs))
    }

    fn center_with(ids: &[&str]) -> NotificationCenter {
        let center = NotificationCenter::new(StoreCapacity::Unbounded);
        let handle = center.handle();
        for (i, id) in ids.iter().enumerate() {
            handle.insert(note(id, i as i64));
        }
        center
    }

    #[test]
    fn test_empty_store_renders_placeholder() {
        let center = center_with(&[]);
        let view = render(&center.snapshot(), at(0), &RenderOptions::default());

        assert_eq!(
            view.panel,
            PanelBody::Empty {
                placeholder: EMPTY_PLACEHOLDER
            }
        );
        assert!(view.toasts.is_empty());
        assert!(view.to_lines().iter().any(|l| l.contains(EMPTY_PLACEHOLDER)));
    }

    #[test]
    fn test_toasts_are_newest_unread() {
        let center = center_with(&["a", "b", "c", "d"]);
        center.handle().mark_read("d");

        let view = render(&center.snapshot(), at(10), &RenderOptions::default());
        let toast_ids: Vec<&str> = view.toasts.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(toast_ids, vec!["c", "b", "a"]);
        assert_eq!(view.unread, 3);
    }

    #[test]
    fn test_panel_window_hides_older_entries() {
        let center = center_with(&["a", "b", "c", "d", "e"]);
        let options = RenderOptions {
            panel_window: 2,
            ..RenderOptions::default()
        };

        let view = render(&center.snapshot(), at(10), &options);
        let PanelBody::Rows(rows) = &view.panel else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "e");
        assert_eq!(view.hidden, 3);
        assert_eq!(view.total, 5);
    }

    #[test]
    fn test_rows_show_relative_age() {
        let center = center_with(&["a"]);
        let view = render(&center.snapshot(), at(120), &RenderOptions::default());
        let PanelBody::Rows(rows) = &view.panel else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].age, "2m ago");
    }

    #[test]
    fn test_dispatch_open_and_dismiss() {
        let center = center_with(&["alpha-123", "beta-456"]);
        let store = center.handle();

        assert!(dispatch(&store, UserAction::Open("alpha".to_string())));
        assert!(store.with(|s| s.get("alpha-123").unwrap().read));

        assert!(dispatch(&store, UserAction::Dismiss("beta-456".to_string())));
        assert!(!dispatch(&store, UserAction::Dismiss("beta-456".to_string())));
        assert_eq!(store.with(|s| s.len()), 1);
    }

    #[test]
    fn test_dispatch_unknown_id_is_noop() {
        let center = center_with(&["a"]);
        let store = center.handle();
        assert!(!dispatch(&store, UserAction::Open("x".to_string())));
        assert!(!dispatch(&store, UserAction::Dismiss("x".to_string())));
        assert_eq!(store.with(|s| s.len()), 1);
    }

    #[test]
    fn test_dispatch_bulk_actions() {
        let center = center_with(&["a", "b"]);
        let store = center.handle();

        assert!(dispatch(&store, UserAction::MarkAllRead));
        assert!(!dispatch(&store, UserAction::MarkAllRead));
        assert!(dispatch(&store, UserAction::ClearAll));
        assert!(!dispatch(&store, UserAction::ClearAll));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            UserAction::parse("open 1a2b"),
            Some(UserAction::Open("1a2b".to_string()))
        );
        assert_eq!(
            UserAction::parse("dismiss 1a2b"),
            Some(UserAction::Dismiss("1a2b".to_string()))
        );
        assert_eq!(UserAction::parse("read-all"), Some(UserAction::MarkAllRead));
        assert_eq!(UserAction::parse("clear"), Some(UserAction::ClearAll));
        assert_eq!(UserAction::parse("open"), None);
        assert_eq!(UserAction::parse(""), None);
    }
}
