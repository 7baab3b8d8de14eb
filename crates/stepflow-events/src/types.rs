use crate::error::{EventError, EventResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stepflow_core::{StepDescriptor, StepName};

/// Closed set of event categories. External consumers discriminate on the
/// wire tag without looking at the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    VerificationUpdate,
    FlowComplete,
    NavigationUpdate,
    ButtonClick,
    FlowExit,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::VerificationUpdate,
        EventKind::FlowComplete,
        EventKind::NavigationUpdate,
        EventKind::ButtonClick,
        EventKind::FlowExit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::VerificationUpdate => "verification_update",
            EventKind::FlowComplete => "flow_complete",
            EventKind::NavigationUpdate => "navigation_update",
            EventKind::ButtonClick => "button_click",
            EventKind::FlowExit => "flow_exit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EventError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
    Error,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
            VerificationStatus::Error => "error",
        }
    }
}

impl FromStr for VerificationStatus {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VerificationStatus::Pending),
            "approved" => Ok(VerificationStatus::Approved),
            "rejected" => Ok(VerificationStatus::Rejected),
            "error" => Ok(VerificationStatus::Error),
            other => Err(EventError::UnknownStatus(other.to_string())),
        }
    }
}

/// What triggered a verification update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    Close,
    ManualReview,
    AutoReview,
    Resubmit,
    Decline,
}

impl ActionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::Close => "close",
            ActionName::ManualReview => "manual_review",
            ActionName::AutoReview => "auto_review",
            ActionName::Resubmit => "resubmit",
            ActionName::Decline => "decline",
        }
    }
}

impl FromStr for ActionName {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close" => Ok(ActionName::Close),
            "manual_review" => Ok(ActionName::ManualReview),
            "auto_review" => Ok(ActionName::AutoReview),
            "resubmit" => Ok(ActionName::Resubmit),
            "decline" => Ok(ActionName::Decline),
            other => Err(EventError::UnknownAction(other.to_string())),
        }
    }
}

/// Outcome of a document verification, as reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVerificationResponse {
    status: VerificationStatus,
    action: ActionName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_verification_id: Option<String>,
}

impl DocumentVerificationResponse {
    pub fn new(status: VerificationStatus, action: ActionName) -> Self {
        Self {
            status,
            action,
            id_verification_id: None,
        }
    }

    /// Builds a response from raw tags, rejecting anything outside the
    /// known status and action sets.
    pub fn parse(status: &str, action: &str) -> EventResult<Self> {
        Ok(Self::new(status.parse()?, action.parse()?))
    }

    pub fn with_verification_id(mut self, id: impl Into<String>) -> Self {
        self.id_verification_id = Some(id.into());
        self
    }

    pub fn status(&self) -> VerificationStatus {
        self.status
    }

    pub fn action(&self) -> ActionName {
        self.action
    }

    pub fn verification_id(&self) -> Option<&str> {
        self.id_verification_id.as_deref()
    }
}

/// Step transition. Carries step identity only; the rendering handle of
/// the descriptor stays behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationUpdate {
    pub current: StepName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<StepName>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
}

impl NavigationUpdate {
    pub fn from_step(step: &StepDescriptor) -> Self {
        Self {
            current: step.name,
            previous: None,
            step_type: step.step_type.clone(),
        }
    }

    pub fn transition(current: &StepDescriptor, previous: Option<&StepDescriptor>) -> Self {
        Self {
            previous: previous.map(|step| step.name),
            ..Self::from_step(current)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ButtonClickFields")]
pub struct ButtonClick {
    button_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<StepName>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ButtonClickFields {
    button_id: String,
    #[serde(default)]
    step: Option<StepName>,
}

impl ButtonClick {
    pub fn new(button_id: impl Into<String>) -> EventResult<Self> {
        let button_id = button_id.into();
        if button_id.trim().is_empty() {
            return Err(EventError::invalid(
                EventKind::ButtonClick,
                "button id must not be empty",
            ));
        }
        Ok(Self {
            button_id,
            step: None,
        })
    }

    pub fn on_step(mut self, step: StepName) -> Self {
        self.step = Some(step);
        self
    }

    pub fn button_id(&self) -> &str {
        &self.button_id
    }

    pub fn step(&self) -> Option<StepName> {
        self.step
    }
}

impl TryFrom<ButtonClickFields> for ButtonClick {
    type Error = EventError;

    fn try_from(fields: ButtonClickFields) -> Result<Self, Self::Error> {
        let click = ButtonClick::new(fields.button_id)?;
        Ok(match fields.step {
            Some(step) => click.on_step(step),
            None => click,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "FlowExitFields")]
pub struct FlowExit {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct FlowExitFields {
    #[serde(default)]
    reason: Option<String>,
}

impl FlowExit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reason(reason: impl Into<String>) -> EventResult<Self> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(EventError::invalid(
                EventKind::FlowExit,
                "reason code must not be blank",
            ));
        }
        Ok(Self {
            reason: Some(reason),
        })
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl TryFrom<FlowExitFields> for FlowExit {
    type Error = EventError;

    fn try_from(fields: FlowExitFields) -> Result<Self, Self::Error> {
        match fields.reason {
            Some(reason) => FlowExit::with_reason(reason),
            None => Ok(FlowExit::new()),
        }
    }
}
