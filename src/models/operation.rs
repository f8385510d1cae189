use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LineItemId, OperationId, OrderId, ProcessId};

/// Runtime status of a production operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// Created with the order, prerequisites not met
    #[default]
    NotStarted,
    /// All prerequisites met, can be started
    Ready,
    /// Being worked on
    InProgress,
    /// Some quantity confirmed, remainder still open
    PartiallyConfirmed,
    /// Full quantity confirmed
    Confirmed,
    /// Closed out
    Completed,
    /// Held by quality or planning
    OnHold,
    /// Cannot proceed until an upstream problem is resolved
    Blocked,
    /// Any status value this crate does not know about
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    /// Every known status, in lifecycle order
    pub const ALL: [OperationStatus; 8] = [
        Self::NotStarted,
        Self::Ready,
        Self::InProgress,
        Self::PartiallyConfirmed,
        Self::Confirmed,
        Self::Completed,
        Self::OnHold,
        Self::Blocked,
    ];

    /// Check if the operation has finished its work
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }

    /// Check if the operation is currently being worked on
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::PartiallyConfirmed)
    }

    /// Check if the operation is stopped by a hold or block
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::OnHold | Self::Blocked)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Ready => "READY",
            Self::InProgress => "IN_PROGRESS",
            Self::PartiallyConfirmed => "PARTIALLY_CONFIRMED",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::OnHold => "ON_HOLD",
            Self::Blocked => "BLOCKED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid operation status: {s}"))
    }
}

/// A production operation of an order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(default)]
    pub process_id: Option<ProcessId>,
    #[serde(default)]
    pub process_name: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<i32>,
}

impl Operation {
    pub fn new(id: OperationId, name: impl Into<String>, status: OperationStatus) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            operation_type: None,
            status,
            process_id: None,
            process_name: None,
            sequence_number: None,
        }
    }

    pub fn in_process(mut self, process_id: ProcessId, process_name: impl Into<String>) -> Self {
        self.process_id = Some(process_id);
        self.process_name = Some(process_name.into());
        self
    }

    pub fn with_sequence(mut self, sequence_number: i32) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// An order line item and its operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Production order as the order source supplies it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Order {
    pub fn operation_count(&self) -> usize {
        self.line_items.iter().map(|item| item.operations.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_display() {
        for status in OperationStatus::ALL {
            assert_eq!(status.to_string().parse::<OperationStatus>(), Ok(status));
        }
        assert!("DONE".parse::<OperationStatus>().is_err());
    }

    #[test]
    fn unknown_wire_status_deserializes_as_unknown() {
        let op: Operation = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Paint",
            "status": "SCRAPPED"
        }))
        .unwrap();
        assert_eq!(op.status, OperationStatus::Unknown);
        assert_eq!(op.process_id, None);
        assert_eq!(op.sequence_number, None);
    }

    #[test]
    fn status_predicates() {
        assert!(OperationStatus::Completed.is_done());
        assert!(OperationStatus::PartiallyConfirmed.is_active());
        assert!(OperationStatus::Blocked.is_stopped());
        assert!(!OperationStatus::Ready.is_active());
    }
}
