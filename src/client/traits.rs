//! # Remote Collaborator Traits
//!
//! Abstract contracts for the services the routing editor and the flow diagram
//! service talk to. Implementations own transport concerns, including
//! timeouts; every failure comes back as a [`RemoteOperationError`].

use async_trait::async_trait;

use crate::error::{RemoteOperationError, RemoteResult};
use crate::models::{
    OperationTemplateSummary, Order, OrderId, PersistedStep, Process, Routing, RoutingHeader,
    RoutingId, RoutingRecord, StepId, StepPayload,
};

/// Persistence for routing headers and their ordered steps
#[async_trait]
pub trait RoutingStore: Send + Sync {
    /// Load a routing with all of its persisted steps
    async fn load_routing(&self, routing_id: RoutingId) -> RemoteResult<RoutingRecord>;

    /// Create a routing header and return it with its new identity
    async fn create_routing(&self, header: &RoutingHeader) -> RemoteResult<Routing>;

    /// Replace the header fields of an existing routing
    async fn update_routing(&self, routing_id: RoutingId, header: &RoutingHeader) -> RemoteResult<Routing>;

    /// Create a step under a routing and return it with its new identity
    async fn create_step(&self, routing_id: RoutingId, step: &StepPayload) -> RemoteResult<PersistedStep>;

    /// Replace the fields of an existing step
    async fn update_step(&self, step_id: StepId, step: &StepPayload) -> RemoteResult<PersistedStep>;

    async fn delete_step(&self, step_id: StepId) -> RemoteResult<()>;

    /// Persist a new step order
    ///
    /// `ordered_step_ids` lists every step of the routing in its new order.
    async fn reorder_steps(&self, routing_id: RoutingId, ordered_step_ids: &[StepId]) -> RemoteResult<()>;
}

/// Reference data shown by the routing editor
#[async_trait]
pub trait ReferenceDataSource: Send + Sync {
    async fn list_processes(&self) -> RemoteResult<Vec<Process>>;

    async fn list_operation_templates(&self) -> RemoteResult<Vec<OperationTemplateSummary>>;
}

/// Source of orders for the flow diagram
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn load_order(&self, order_id: OrderId) -> RemoteResult<Order>;
}

/// Reference data source with nothing to offer
///
/// Useful for editors that only work with ad-hoc operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferenceData;

#[async_trait]
impl ReferenceDataSource for NoReferenceData {
    async fn list_processes(&self) -> RemoteResult<Vec<Process>> {
        Ok(Vec::new())
    }

    async fn list_operation_templates(&self) -> RemoteResult<Vec<OperationTemplateSummary>> {
        Ok(Vec::new())
    }
}

/// Convert any displayable transport error into a [`RemoteOperationError`]
pub fn remote_error<E: std::fmt::Display>(operation: &str) -> impl FnOnce(E) -> RemoteOperationError + '_ {
    move |error| RemoteOperationError::new(operation, error.to_string())
}
