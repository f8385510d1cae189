//! # Routing Steps
//!
//! A routing step exists in up to three shapes:
//!
//! - [`StepDraft`] - what the user typed into the step form
//! - [`RoutingStep`] - an entry of the sequencer's in-memory list
//! - [`PersistedStep`] - a step as the routing store knows it
//!
//! Every in-memory step carries a [`StepKey`] generated on the client when the
//! entry is created. Remote responses are matched back to entries through that
//! key, so an entry keeps its identity while the list is reordered under it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::operation::OperationStatus;
use super::{OperationTemplateId, StepId};

/// Client-generated identity of an in-memory routing step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepKey(Uuid);

impl StepKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StepKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-entered definition of a step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepDraft {
    pub operation_template_id: Option<OperationTemplateId>,
    pub operation_name: Option<String>,
    pub operation_type: Option<String>,
    pub operation_code: Option<String>,
    #[serde(default)]
    pub parallel_allowed: bool,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub produces_output_batch: bool,
    #[serde(default)]
    pub allows_split: bool,
    #[serde(default)]
    pub allows_merge: bool,
    pub estimated_duration_minutes: Option<u32>,
    pub description: Option<String>,
}

impl StepDraft {
    /// Draft for an ad-hoc operation without a template
    pub fn operation(name: impl Into<String>, operation_type: impl Into<String>) -> Self {
        Self {
            operation_name: Some(name.into()),
            operation_type: Some(operation_type.into()),
            ..Self::default()
        }
    }

    /// Draft referencing a reusable operation template
    pub fn from_template(template_id: OperationTemplateId) -> Self {
        Self {
            operation_template_id: Some(template_id),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.operation_code = Some(code.into());
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn with_parallel_allowed(mut self, allowed: bool) -> Self {
        self.parallel_allowed = allowed;
        self
    }

    pub fn with_output_batch(mut self, produces: bool) -> Self {
        self.produces_output_batch = produces;
        self
    }

    pub fn with_split_and_merge(mut self, allows_split: bool, allows_merge: bool) -> Self {
        self.allows_split = allows_split;
        self.allows_merge = allows_merge;
        self
    }

    pub fn with_estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = Some(minutes);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name shown in lists and logs
    pub fn display_name(&self) -> String {
        match (&self.operation_name, self.operation_template_id) {
            (Some(name), _) if !name.trim().is_empty() => name.clone(),
            (_, Some(template_id)) => format!("template #{template_id}"),
            _ => "unnamed operation".to_string(),
        }
    }
}

/// One entry of a routing's ordered step list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingStep {
    pub key: StepKey,
    pub remote_id: Option<StepId>,
    pub sequence_number: i32,
    #[serde(flatten)]
    pub draft: StepDraft,
    pub execution_status: Option<OperationStatus>,
}

impl RoutingStep {
    /// A new, not yet persisted step
    pub fn new(draft: StepDraft, sequence_number: i32) -> Self {
        Self {
            key: StepKey::new(),
            remote_id: None,
            sequence_number,
            draft,
            execution_status: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.remote_id.is_some()
    }

    pub fn is_mandatory(&self) -> bool {
        self.draft.mandatory
    }

    /// Body sent to the routing store for create and update calls
    pub fn to_payload(&self) -> StepPayload {
        StepPayload {
            sequence_number: self.sequence_number,
            draft: self.draft.clone(),
        }
    }
}

impl From<PersistedStep> for RoutingStep {
    fn from(step: PersistedStep) -> Self {
        Self {
            key: StepKey::new(),
            remote_id: Some(step.id),
            sequence_number: step.sequence_number,
            draft: step.draft,
            execution_status: step.execution_status,
        }
    }
}

/// Step body for create and update calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPayload {
    pub sequence_number: i32,
    #[serde(flatten)]
    pub draft: StepDraft,
}

/// A step as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedStep {
    pub id: StepId,
    pub sequence_number: i32,
    #[serde(flatten)]
    pub draft: StepDraft,
    #[serde(default)]
    pub execution_status: Option<OperationStatus>,
}
