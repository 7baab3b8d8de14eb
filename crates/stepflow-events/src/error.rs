use crate::types::EventKind;
use thiserror::Error;

pub type EventResult<T> = Result<T, EventError>;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("unknown verification status: {0}")]
    UnknownStatus(String),
    #[error("unknown action name: {0}")]
    UnknownAction(String),
    #[error("unknown event type: {0}")]
    UnknownKind(String),
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: EventKind, reason: String },
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(String),
}

impl EventError {
    pub(crate) fn invalid(kind: EventKind, reason: impl Into<String>) -> Self {
        EventError::InvalidPayload {
            kind,
            reason: reason.into(),
        }
    }
}
