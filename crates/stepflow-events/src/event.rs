use crate::types::{ButtonClick, DocumentVerificationResponse, EventKind, FlowExit, NavigationUpdate};
use std::time::{SystemTime, UNIX_EPOCH};

/// Channel identifier stamped on every event at the transport boundary.
/// Hosts match on it to tell flow events apart from unrelated traffic.
pub const EVENT_CHANNEL: &str = "stepflow_event";

/// One variant per kind, so a payload can never disagree with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    VerificationUpdate(DocumentVerificationResponse),
    FlowComplete,
    NavigationUpdate(NavigationUpdate),
    ButtonClick(ButtonClick),
    FlowExit(FlowExit),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::VerificationUpdate(_) => EventKind::VerificationUpdate,
            EventPayload::FlowComplete => EventKind::FlowComplete,
            EventPayload::NavigationUpdate(_) => EventKind::NavigationUpdate,
            EventPayload::ButtonClick(_) => EventKind::ButtonClick,
            EventPayload::FlowExit(_) => EventKind::FlowExit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEvent {
    payload: EventPayload,
    timestamp_ms: u64,
}

impl FlowEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self::at(payload, now_ms())
    }

    pub(crate) fn at(payload: EventPayload, timestamp_ms: u64) -> Self {
        Self {
            payload,
            timestamp_ms,
        }
    }

    pub fn verification_update(response: DocumentVerificationResponse) -> Self {
        Self::new(EventPayload::VerificationUpdate(response))
    }

    pub fn flow_complete() -> Self {
        Self::new(EventPayload::FlowComplete)
    }

    pub fn navigation_update(update: NavigationUpdate) -> Self {
        Self::new(EventPayload::NavigationUpdate(update))
    }

    pub fn button_click(click: ButtonClick) -> Self {
        Self::new(EventPayload::ButtonClick(click))
    }

    pub fn flow_exit(exit: FlowExit) -> Self {
        Self::new(EventPayload::FlowExit(exit))
    }

    pub fn name(&self) -> &'static str {
        EVENT_CHANNEL
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
