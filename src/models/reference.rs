use serde::{Deserialize, Serialize};

use super::routing_step::StepDraft;
use super::{OperationTemplateId, ProcessId};

/// A process definition a routing can belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

/// Summary of a reusable operation template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTemplateSummary {
    pub id: OperationTemplateId,
    pub name: String,
    pub operation_type: String,
    #[serde(default)]
    pub operation_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
}

impl OperationTemplateSummary {
    /// Step draft referencing this template, with its descriptive fields copied in
    pub fn to_draft(&self) -> StepDraft {
        StepDraft {
            operation_template_id: Some(self.id),
            operation_name: Some(self.name.clone()),
            operation_type: Some(self.operation_type.clone()),
            operation_code: self.operation_code.clone(),
            estimated_duration_minutes: self.estimated_duration_minutes,
            description: self.description.clone(),
            ..StepDraft::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_draft_keeps_reference_and_descriptive_fields() {
        let template = OperationTemplateSummary {
            id: 12,
            name: "Heat treat".to_string(),
            operation_type: "THERMAL".to_string(),
            operation_code: Some("HT-1".to_string()),
            description: None,
            estimated_duration_minutes: Some(90),
        };
        let draft = template.to_draft();
        assert_eq!(draft.operation_template_id, Some(12));
        assert_eq!(draft.operation_name.as_deref(), Some("Heat treat"));
        assert_eq!(draft.estimated_duration_minutes, Some(90));
        assert!(!draft.mandatory);
    }
}
