//! # In-Memory Collaborators
//!
//! [`InMemoryRoutingStore`] implements every remote contract on top of plain
//! collections. It records each call when it is issued and again when it
//! resolves, can fail the next call of a given operation and can delay calls to
//! reproduce out-of-order responses.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;
use tracing::debug;

use super::traits::{OrderSource, ReferenceDataSource, RoutingStore};
use crate::error::{operations, RemoteOperationError, RemoteResult};
use crate::models::{
    OperationTemplateSummary, Order, OrderId, PersistedStep, Process, Routing, RoutingHeader,
    RoutingId, RoutingRecord, StepId, StepPayload,
};

/// Kind of remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    LoadRouting,
    CreateRouting,
    UpdateRouting,
    CreateStep,
    UpdateStep,
    DeleteStep,
    ReorderSteps,
    ListProcesses,
    ListOperationTemplates,
    LoadOrder,
}

impl StoreOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadRouting => operations::LOAD_ROUTING,
            Self::CreateRouting => operations::CREATE_ROUTING,
            Self::UpdateRouting => operations::UPDATE_ROUTING,
            Self::CreateStep => operations::CREATE_STEP,
            Self::UpdateStep => operations::UPDATE_STEP,
            Self::DeleteStep => operations::DELETE_STEP,
            Self::ReorderSteps => operations::REORDER_STEPS,
            Self::ListProcesses => operations::LIST_PROCESSES,
            Self::ListOperationTemplates => operations::LIST_OPERATION_TEMPLATES,
            Self::LoadOrder => operations::LOAD_ORDER,
        }
    }
}

/// A recorded remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    LoadRouting { routing_id: RoutingId },
    CreateRouting { name: String },
    UpdateRouting { routing_id: RoutingId, name: String },
    CreateStep {
        routing_id: RoutingId,
        sequence_number: i32,
        operation: String,
    },
    UpdateStep { step_id: StepId, sequence_number: i32 },
    DeleteStep { step_id: StepId },
    ReorderSteps {
        routing_id: RoutingId,
        ordered_step_ids: Vec<StepId>,
    },
    ListProcesses,
    ListOperationTemplates,
    LoadOrder { order_id: OrderId },
}

impl StoreCall {
    pub fn operation(&self) -> StoreOperation {
        match self {
            Self::LoadRouting { .. } => StoreOperation::LoadRouting,
            Self::CreateRouting { .. } => StoreOperation::CreateRouting,
            Self::UpdateRouting { .. } => StoreOperation::UpdateRouting,
            Self::CreateStep { .. } => StoreOperation::CreateStep,
            Self::UpdateStep { .. } => StoreOperation::UpdateStep,
            Self::DeleteStep { .. } => StoreOperation::DeleteStep,
            Self::ReorderSteps { .. } => StoreOperation::ReorderSteps,
            Self::ListProcesses => StoreOperation::ListProcesses,
            Self::ListOperationTemplates => StoreOperation::ListOperationTemplates,
            Self::LoadOrder { .. } => StoreOperation::LoadOrder,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    next_routing_id: RoutingId,
    next_step_id: StepId,
    routings: BTreeMap<RoutingId, Routing>,
    steps: BTreeMap<RoutingId, Vec<PersistedStep>>,
    processes: Vec<Process>,
    templates: Vec<OperationTemplateSummary>,
    orders: HashMap<OrderId, Order>,
    issued: Vec<StoreCall>,
    resolved: Vec<StoreCall>,
    failures: HashMap<StoreOperation, VecDeque<Option<String>>>,
    latencies: HashMap<StoreOperation, VecDeque<Duration>>,
}

impl StoreState {
    fn routing_of_step(&self, step_id: StepId) -> Option<RoutingId> {
        self.steps
            .iter()
            .find(|(_, steps)| steps.iter().any(|step| step.id == step_id))
            .map(|(routing_id, _)| *routing_id)
    }
}

/// In-memory implementation of the routing store, reference data and order source
#[derive(Debug)]
pub struct InMemoryRoutingStore {
    state: Mutex<StoreState>,
}

impl Default for InMemoryRoutingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoutingStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                next_routing_id: 1,
                next_step_id: 100,
                ..StoreState::default()
            }),
        }
    }

    pub fn with_processes(self, processes: Vec<Process>) -> Self {
        self.state.lock().processes = processes;
        self
    }

    pub fn with_templates(self, templates: Vec<OperationTemplateSummary>) -> Self {
        self.state.lock().templates = templates;
        self
    }

    pub fn insert_order(&self, order: Order) {
        self.state.lock().orders.insert(order.id, order);
    }

    /// Store a routing and its steps exactly as given, without renumbering
    pub fn seed_routing(&self, header: RoutingHeader, steps: Vec<PersistedStep>) -> RoutingId {
        let mut state = self.state.lock();
        let routing_id = state.next_routing_id;
        state.next_routing_id += 1;
        if let Some(max_id) = steps.iter().map(|step| step.id).max() {
            state.next_step_id = state.next_step_id.max(max_id + 1);
        }
        state.routings.insert(
            routing_id,
            Routing {
                id: routing_id,
                header,
            },
        );
        state.steps.insert(routing_id, steps);
        routing_id
    }

    /// Fail the next call of `operation`, optionally with a message
    pub fn fail_next(&self, operation: StoreOperation, message: Option<&str>) {
        self.state
            .lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(message.map(str::to_string));
    }

    /// Delay the next call of `operation` before it resolves
    pub fn delay_next(&self, operation: StoreOperation, delay: Duration) {
        self.state
            .lock()
            .latencies
            .entry(operation)
            .or_default()
            .push_back(delay);
    }

    /// Calls in the order they were issued
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().issued.clone()
    }

    /// Calls in the order they resolved
    pub fn resolved_calls(&self) -> Vec<StoreCall> {
        self.state.lock().resolved.clone()
    }

    pub fn calls_of(&self, operation: StoreOperation) -> Vec<StoreCall> {
        self.state
            .lock()
            .issued
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        let mut state = self.state.lock();
        state.issued.clear();
        state.resolved.clear();
    }

    pub fn routing_count(&self) -> usize {
        self.state.lock().routings.len()
    }

    /// Persisted steps of a routing, in stored order
    pub fn stored_steps(&self, routing_id: RoutingId) -> Vec<PersistedStep> {
        self.state
            .lock()
            .steps
            .get(&routing_id)
            .cloned()
            .unwrap_or_default()
    }

    fn begin(&self, call: StoreCall) -> (Option<Duration>, Option<Option<String>>) {
        let mut state = self.state.lock();
        let operation = call.operation();
        debug!(operation = operation.name(), ?call, "in-memory store call issued");
        state.issued.push(call);
        let delay = state
            .latencies
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        let failure = state
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        (delay, failure)
    }

    /// Wait out any configured latency, then fail or run `apply`
    async fn complete<T>(
        &self,
        call: StoreCall,
        apply: impl FnOnce(&mut StoreState) -> RemoteResult<T>,
    ) -> RemoteResult<T> {
        let operation = call.operation();
        let (delay, failure) = self.begin(call.clone());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        state.resolved.push(call);
        match failure {
            Some(Some(message)) => Err(RemoteOperationError::new(operation.name(), message)),
            Some(None) => Err(RemoteOperationError::without_message(operation.name())),
            None => apply(&mut state),
        }
    }
}

fn not_found(operation: &str, what: &str, id: i64) -> RemoteOperationError {
    RemoteOperationError::new(operation, format!("{what} {id} not found"))
}

#[async_trait]
impl RoutingStore for InMemoryRoutingStore {
    async fn load_routing(&self, routing_id: RoutingId) -> RemoteResult<RoutingRecord> {
        self.complete(StoreCall::LoadRouting { routing_id }, |state| {
            let routing = state
                .routings
                .get(&routing_id)
                .cloned()
                .ok_or_else(|| not_found(operations::LOAD_ROUTING, "Routing", routing_id))?;
            let steps = state.steps.get(&routing_id).cloned().unwrap_or_default();
            Ok(RoutingRecord { routing, steps })
        })
        .await
    }

    async fn create_routing(&self, header: &RoutingHeader) -> RemoteResult<Routing> {
        let call = StoreCall::CreateRouting {
            name: header.name.clone(),
        };
        self.complete(call, |state| {
            let routing = Routing {
                id: state.next_routing_id,
                header: header.clone(),
            };
            state.next_routing_id += 1;
            state.routings.insert(routing.id, routing.clone());
            state.steps.insert(routing.id, Vec::new());
            Ok(routing)
        })
        .await
    }

    async fn update_routing(&self, routing_id: RoutingId, header: &RoutingHeader) -> RemoteResult<Routing> {
        let call = StoreCall::UpdateRouting {
            routing_id,
            name: header.name.clone(),
        };
        self.complete(call, |state| {
            let routing = state
                .routings
                .get_mut(&routing_id)
                .ok_or_else(|| not_found(operations::UPDATE_ROUTING, "Routing", routing_id))?;
            routing.header = header.clone();
            Ok(routing.clone())
        })
        .await
    }

    async fn create_step(&self, routing_id: RoutingId, step: &StepPayload) -> RemoteResult<PersistedStep> {
        let call = StoreCall::CreateStep {
            routing_id,
            sequence_number: step.sequence_number,
            operation: step.draft.display_name(),
        };
        self.complete(call, |state| {
            if !state.routings.contains_key(&routing_id) {
                return Err(not_found(operations::CREATE_STEP, "Routing", routing_id));
            }
            let persisted = PersistedStep {
                id: state.next_step_id,
                sequence_number: step.sequence_number,
                draft: step.draft.clone(),
                execution_status: None,
            };
            state.next_step_id += 1;
            state
                .steps
                .entry(routing_id)
                .or_default()
                .push(persisted.clone());
            Ok(persisted)
        })
        .await
    }

    async fn update_step(&self, step_id: StepId, step: &StepPayload) -> RemoteResult<PersistedStep> {
        let call = StoreCall::UpdateStep {
            step_id,
            sequence_number: step.sequence_number,
        };
        self.complete(call, |state| {
            let stored = state
                .steps
                .values_mut()
                .flat_map(|steps| steps.iter_mut())
                .find(|stored| stored.id == step_id)
                .ok_or_else(|| not_found(operations::UPDATE_STEP, "Step", step_id))?;
            stored.sequence_number = step.sequence_number;
            stored.draft = step.draft.clone();
            Ok(stored.clone())
        })
        .await
    }

    async fn delete_step(&self, step_id: StepId) -> RemoteResult<()> {
        self.complete(StoreCall::DeleteStep { step_id }, |state| {
            let routing_id = state
                .routing_of_step(step_id)
                .ok_or_else(|| not_found(operations::DELETE_STEP, "Step", step_id))?;
            if let Some(steps) = state.steps.get_mut(&routing_id) {
                steps.retain(|step| step.id != step_id);
                steps.sort_by_key(|step| step.sequence_number);
                for (position, step) in steps.iter_mut().enumerate() {
                    step.sequence_number = position as i32 + 1;
                }
            }
            Ok(())
        })
        .await
    }

    async fn reorder_steps(&self, routing_id: RoutingId, ordered_step_ids: &[StepId]) -> RemoteResult<()> {
        let call = StoreCall::ReorderSteps {
            routing_id,
            ordered_step_ids: ordered_step_ids.to_vec(),
        };
        self.complete(call, |state| {
            let steps = state
                .steps
                .get_mut(&routing_id)
                .ok_or_else(|| not_found(operations::REORDER_STEPS, "Routing", routing_id))?;
            if steps.len() != ordered_step_ids.len() {
                return Err(RemoteOperationError::new(
                    operations::REORDER_STEPS,
                    format!(
                        "Reorder lists {} steps but routing {routing_id} has {}",
                        ordered_step_ids.len(),
                        steps.len()
                    ),
                ));
            }
            let mut reordered = Vec::with_capacity(steps.len());
            for (position, step_id) in ordered_step_ids.iter().enumerate() {
                let mut step = steps
                    .iter()
                    .find(|step| step.id == *step_id)
                    .cloned()
                    .ok_or_else(|| not_found(operations::REORDER_STEPS, "Step", *step_id))?;
                step.sequence_number = position as i32 + 1;
                reordered.push(step);
            }
            *steps = reordered;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ReferenceDataSource for InMemoryRoutingStore {
    async fn list_processes(&self) -> RemoteResult<Vec<Process>> {
        self.complete(StoreCall::ListProcesses, |state| Ok(state.processes.clone()))
            .await
    }

    async fn list_operation_templates(&self) -> RemoteResult<Vec<OperationTemplateSummary>> {
        self.complete(StoreCall::ListOperationTemplates, |state| {
            Ok(state.templates.clone())
        })
        .await
    }
}

#[async_trait]
impl OrderSource for InMemoryRoutingStore {
    async fn load_order(&self, order_id: OrderId) -> RemoteResult<Order> {
        self.complete(StoreCall::LoadOrder { order_id }, |state| {
            state
                .orders
                .get(&order_id)
                .cloned()
                .ok_or_else(|| not_found(operations::LOAD_ORDER, "Order", order_id))
        })
        .await
    }
}
