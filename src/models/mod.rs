//! # Models
//!
//! Data carried between the remote collaborators, the routing sequencer and the
//! flow layout engine. None of these types talk to a store themselves.
//!
//! - [`routing`] - routing header, execution type and lifecycle status
//! - [`routing_step`] - in-memory steps, drafts and their remote payloads
//! - [`operation`] - runtime operations, orders and operation status
//! - [`reference`] - processes and operation templates used by the editor
//! - [`flow_diagram`] - positioned nodes and edges produced by the layout engine

pub mod flow_diagram;
pub mod operation;
pub mod reference;
pub mod routing;
pub mod routing_step;

pub use flow_diagram::{
    ArrowHead, EdgeLine, FlowDiagramStats, FlowLayout, GraphEdge, GraphNode, NodeKind, NodeShape,
    NodeStyle, Position, Size,
};
pub use operation::{LineItem, Operation, OperationStatus, Order};
pub use reference::{OperationTemplateSummary, Process};
pub use routing::{ExecutionType, Routing, RoutingHeader, RoutingRecord, RoutingStatus};
pub use routing_step::{PersistedStep, RoutingStep, StepDraft, StepKey, StepPayload};

/// Remote identity of a routing
pub type RoutingId = i64;
/// Remote identity of a routing step
pub type StepId = i64;
/// Identity of a process definition
pub type ProcessId = i64;
/// Identity of a reusable operation template
pub type OperationTemplateId = i64;
/// Identity of a runtime operation
pub type OperationId = i64;
/// Identity of an order line item
pub type LineItemId = i64;
/// Identity of an order
pub type OrderId = i64;
