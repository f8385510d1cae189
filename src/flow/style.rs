//! Status-keyed styling shared by nodes and edges
//!
//! | Status                           | Family  |
//! |----------------------------------|---------|
//! | Confirmed, Completed             | green   |
//! | InProgress, PartiallyConfirmed   | blue    |
//! | Ready                            | amber   |
//! | OnHold                           | orange  |
//! | Blocked                          | red     |
//! | NotStarted, unknown, none        | neutral |
//!
//! An operation node's fill and border and the color of the sequential edge
//! pointing at it come from the same [`StatusStyle`].

use crate::models::{NodeStyle, OperationStatus};

/// Colors of one status family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub fill: &'static str,
    pub border: &'static str,
}

impl StatusStyle {
    /// Color of an edge leading into a node of this style
    pub fn edge_color(&self) -> &'static str {
        self.border
    }
}

pub const GREEN: StatusStyle = StatusStyle {
    fill: "#d4edda",
    border: "#28a745",
};
pub const BLUE: StatusStyle = StatusStyle {
    fill: "#cce5ff",
    border: "#007bff",
};
pub const AMBER: StatusStyle = StatusStyle {
    fill: "#fff3cd",
    border: "#ffc107",
};
pub const ORANGE: StatusStyle = StatusStyle {
    fill: "#ffe5d0",
    border: "#fd7e14",
};
pub const RED: StatusStyle = StatusStyle {
    fill: "#f8d7da",
    border: "#dc3545",
};
/// Default for statuses without a family of their own
pub const NEUTRAL: StatusStyle = StatusStyle {
    fill: "#e9ecef",
    border: "#6c757d",
};

const HEADER_FILL: &str = "#f8f9fa";
const HEADER_BORDER: &str = "#343a40";

/// Style family of a status
pub fn status_style(status: Option<OperationStatus>) -> StatusStyle {
    match status {
        Some(OperationStatus::Confirmed | OperationStatus::Completed) => GREEN,
        Some(OperationStatus::InProgress | OperationStatus::PartiallyConfirmed) => BLUE,
        Some(OperationStatus::Ready) => AMBER,
        Some(OperationStatus::OnHold) => ORANGE,
        Some(OperationStatus::Blocked) => RED,
        Some(OperationStatus::NotStarted | OperationStatus::Unknown) | None => NEUTRAL,
    }
}

/// Node style of an operation
pub fn operation_node_style(status: OperationStatus) -> NodeStyle {
    let colors = status_style(Some(status));
    NodeStyle {
        fill: colors.fill.to_string(),
        border: colors.border.to_string(),
        border_width: if status.is_active() { 2.0 } else { 1.0 },
        shadow: false,
    }
}

/// Node style of a process header
pub fn header_node_style() -> NodeStyle {
    NodeStyle {
        fill: HEADER_FILL.to_string(),
        border: HEADER_BORDER.to_string(),
        border_width: 2.0,
        shadow: true,
    }
}

/// Color of header links and process links
pub fn neutral_edge_color() -> &'static str {
    NEUTRAL.edge_color()
}
