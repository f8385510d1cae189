//! Input validation for routing headers and step drafts
//!
//! Validation runs before any mutation and before any remote call. Blank
//! strings count as missing.

use crate::error::{Result, RoutingError};
use crate::models::{RoutingHeader, StepDraft};

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Validates a step draft
///
/// A draft referencing an operation template needs nothing else. Without a
/// template both the operation name and the operation type are required.
pub fn validate_step_draft(draft: &StepDraft) -> Result<()> {
    if draft.operation_template_id.is_some() {
        return Ok(());
    }

    let mut missing = Vec::new();
    if is_blank(&draft.operation_name) {
        missing.push("operation_name");
    }
    if is_blank(&draft.operation_type) {
        missing.push("operation_type");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RoutingError::validation(missing))
    }
}

/// Validates the routing header before it is saved
pub fn validate_routing_header(header: &RoutingHeader) -> Result<()> {
    let missing = header.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RoutingError::validation(missing))
    }
}
