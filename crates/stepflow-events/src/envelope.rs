use crate::error::{EventError, EventResult};
use crate::event::{EventPayload, FlowEvent, EVENT_CHANNEL};
use crate::types::EventKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON form of an event as it crosses into the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub event_name: String,
    pub event_type: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Envelope {
    pub fn from_event(event: &FlowEvent) -> EventResult<Self> {
        let details = match event.payload() {
            EventPayload::VerificationUpdate(resp) => Some(serde_json::to_value(resp)?),
            EventPayload::FlowComplete => None,
            EventPayload::NavigationUpdate(nav) => Some(serde_json::to_value(nav)?),
            EventPayload::ButtonClick(click) => Some(serde_json::to_value(click)?),
            EventPayload::FlowExit(exit) => Some(serde_json::to_value(exit)?),
        };
        Ok(Self {
            event_name: event.name().to_string(),
            event_type: event.kind().as_str().to_string(),
            timestamp: event.timestamp_ms(),
            details,
        })
    }

    pub fn to_json(&self) -> EventResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn into_event(self) -> EventResult<FlowEvent> {
        if self.event_name != EVENT_CHANNEL {
            return Err(EventError::Transport(format!(
                "envelope is on channel {}, expected {}",
                self.event_name, EVENT_CHANNEL
            )));
        }
        let kind: EventKind = self.event_type.parse()?;
        let payload = match kind {
            EventKind::VerificationUpdate => {
                EventPayload::VerificationUpdate(required_details(kind, self.details)?)
            }
            EventKind::FlowComplete => EventPayload::FlowComplete,
            EventKind::NavigationUpdate => {
                EventPayload::NavigationUpdate(required_details(kind, self.details)?)
            }
            EventKind::ButtonClick => EventPayload::ButtonClick(required_details(kind, self.details)?),
            EventKind::FlowExit => match self.details {
                Some(details) => EventPayload::FlowExit(typed_details(kind, details)?),
                None => EventPayload::FlowExit(Default::default()),
            },
        };
        Ok(FlowEvent::at(payload, self.timestamp))
    }
}

fn required_details<T: DeserializeOwned>(kind: EventKind, details: Option<Value>) -> EventResult<T> {
    let details = details.ok_or_else(|| EventError::invalid(kind, "missing details"))?;
    typed_details(kind, details)
}

fn typed_details<T: DeserializeOwned>(kind: EventKind, details: Value) -> EventResult<T> {
    serde_json::from_value(details).map_err(|e| EventError::invalid(kind, e.to_string()))
}

/// Host-side decoding of a raw message.
///
/// Messages that are not JSON objects, or carry another `eventName`, are
/// somebody else's traffic and yield `Ok(None)`. A message on our channel
/// with a bad type or details is an error.
pub fn decode_message(message: &str) -> EventResult<Option<FlowEvent>> {
    let Ok(value) = serde_json::from_str::<Value>(message) else {
        return Ok(None);
    };
    match value.get("eventName").and_then(Value::as_str) {
        Some(name) if name == EVENT_CHANNEL => {}
        _ => return Ok(None),
    }
    let envelope: Envelope = serde_json::from_value(value)?;
    envelope.into_event().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ActionName, ButtonClick, DocumentVerificationResponse, FlowExit, NavigationUpdate,
        VerificationStatus,
    };
    use stepflow_core::{ComponentRef, StepDescriptor, StepName};

    #[test]
    fn verification_update_wire_shape() {
        let resp = DocumentVerificationResponse::new(VerificationStatus::Approved, ActionName::ManualReview)
            .with_verification_id("idv_42");
        let env = Envelope::from_event(&FlowEvent::verification_update(resp)).unwrap();
        let json: Value = serde_json::from_str(&env.to_json().unwrap()).unwrap();

        assert_eq!(json["eventName"], EVENT_CHANNEL);
        assert_eq!(json["eventType"], "verification_update");
        assert_eq!(json["details"]["status"], "approved");
        assert_eq!(json["details"]["action"], "manual_review");
        assert_eq!(json["details"]["idVerificationId"], "idv_42");
    }

    #[test]
    fn flow_complete_has_no_details() {
        let env = Envelope::from_event(&FlowEvent::flow_complete()).unwrap();
        let json: Value = serde_json::from_str(&env.to_json().unwrap()).unwrap();
        assert_eq!(json["eventType"], "flow_complete");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn decode_returns_what_was_encoded() {
        let step = StepDescriptor::new(StepName::Selfie, ComponentRef::new("Selfie"));
        let events = vec![
            FlowEvent::navigation_update(NavigationUpdate::from_step(&step)),
            FlowEvent::button_click(ButtonClick::new("take-photo").unwrap().on_step(StepName::Selfie)),
            FlowEvent::flow_exit(FlowExit::with_reason("timeout").unwrap()),
            FlowEvent::flow_complete(),
        ];
        for event in events {
            let message = Envelope::from_event(&event).unwrap().to_json().unwrap();
            let decoded = decode_message(&message).unwrap().expect("our channel");
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn foreign_traffic_is_ignored() {
        assert!(decode_message("not json at all").unwrap().is_none());
        assert!(decode_message("[1, 2, 3]").unwrap().is_none());
        assert!(decode_message(r#"{ "eventName": "other_app", "eventType": "flow_complete" }"#)
            .unwrap()
            .is_none());
        assert!(decode_message(r#"{ "type": "resize", "height": 300 }"#).unwrap().is_none());
    }

    #[test]
    fn malformed_messages_on_our_channel_are_errors() {
        let unknown_kind = format!(r#"{{ "eventName": "{}", "eventType": "page_view" }}"#, EVENT_CHANNEL);
        assert!(matches!(decode_message(&unknown_kind), Err(EventError::UnknownKind(_))));

        let bad_status = format!(
            r#"{{ "eventName": "{}", "eventType": "verification_update", "details": {{ "status": "maybe", "action": "close" }} }}"#,
            EVENT_CHANNEL
        );
        assert!(matches!(
            decode_message(&bad_status),
            Err(EventError::InvalidPayload { kind: EventKind::VerificationUpdate, .. })
        ));

        let missing = format!(r#"{{ "eventName": "{}", "eventType": "button_click" }}"#, EVENT_CHANNEL);
        assert!(matches!(
            decode_message(&missing),
            Err(EventError::InvalidPayload { kind: EventKind::ButtonClick, .. })
        ));
    }

    #[test]
    fn into_event_checks_channel() {
        let env = Envelope {
            event_name: "other_app".to_string(),
            event_type: "flow_complete".to_string(),
            timestamp: 0,
            details: None,
        };
        assert!(matches!(env.into_event(), Err(EventError::Transport(_))));
    }
}
