//! Error types for pulse-bus

/// Event bus errors
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Unknown event kind: {0}")]
    UnknownKind(String),

    #[error("Event bus has been disposed")]
    Disposed,
}
