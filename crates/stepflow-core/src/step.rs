use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifiers of the stages a verification flow can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepName {
    Welcome,
    DocumentSelection,
    DocumentStart,
    DocumentPhoto,
    CheckDocument,
    DocumentPhotoBackStart,
    DocumentPhotoBack,
    CheckDocumentPhotoBack,
    SelfieStart,
    Selfie,
    CheckSelfie,
    Loading,
    Final,
    Resubmission,
    Decline,
    Error,
}

impl StepName {
    pub const ALL: [StepName; 16] = [
        StepName::Welcome,
        StepName::DocumentSelection,
        StepName::DocumentStart,
        StepName::DocumentPhoto,
        StepName::CheckDocument,
        StepName::DocumentPhotoBackStart,
        StepName::DocumentPhotoBack,
        StepName::CheckDocumentPhotoBack,
        StepName::SelfieStart,
        StepName::Selfie,
        StepName::CheckSelfie,
        StepName::Loading,
        StepName::Final,
        StepName::Resubmission,
        StepName::Decline,
        StepName::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Welcome => "welcome",
            StepName::DocumentSelection => "document-selection",
            StepName::DocumentStart => "document-start",
            StepName::DocumentPhoto => "document-photo",
            StepName::CheckDocument => "check-document",
            StepName::DocumentPhotoBackStart => "document-photo-back-start",
            StepName::DocumentPhotoBack => "document-photo-back",
            StepName::CheckDocumentPhotoBack => "check-document-photo-back",
            StepName::SelfieStart => "selfie-start",
            StepName::Selfie => "selfie",
            StepName::CheckSelfie => "check-selfie",
            StepName::Loading => "loading",
            StepName::Final => "final",
            StepName::Resubmission => "resubmission",
            StepName::Decline => "decline",
            StepName::Error => "error",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown step: {0}")]
pub struct UnknownStep(pub String);

impl FromStr for StepName {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepName::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| UnknownStep(s.to_string()))
    }
}

/// Handle to whatever renders a step. Opaque to everything outside the
/// navigation subsystem that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRef(String);

impl ComponentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub name: StepName,
    pub component: ComponentRef,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
}

impl StepDescriptor {
    pub fn new(name: StepName, component: ComponentRef) -> Self {
        Self {
            name,
            component,
            step_type: None,
        }
    }

    pub fn with_type(mut self, step_type: impl Into<String>) -> Self {
        self.step_type = Some(step_type.into());
        self
    }
}
