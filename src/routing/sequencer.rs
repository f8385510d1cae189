//! # Routing Sequencer
//!
//! Owns the ordered step list of one routing.
//!
//! ## Ordering
//!
//! Sequence numbers always equal list position + 1. They are recomputed from
//! the list after every add, move and delete and never taken from the store.
//!
//! ## Remote Synchronization
//!
//! When the routing already has a remote identity every mutation is mirrored to
//! the [`RoutingStore`]. Local state changes first; the remote call follows.
//!
//! - Create responses are matched to their entry through its [`StepKey`], so
//!   moves issued while a create is in flight do not misplace the identity.
//! - A failed create, update or reorder keeps the local mutation and returns
//!   the error. Delete is the exception: the entry stays until the store
//!   confirms the removal.
//! - Reorders are issued through a single lane per routing. A reorder that
//!   reaches the lane after a newer move was made is skipped, so the store
//!   always ends up with the most recent local order.
//!
//! Operations take `&self`; several may be in flight at once and their
//! responses may arrive in any order. The step list lock is never held across
//! a remote call.

use parking_lot::{Mutex, RwLock};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::RoutingStore;
use crate::config::SequencerConfig;
use crate::constants::events;
use crate::error::{operations, RemoteOperationError, Result, RoutingError};
use crate::events::EventPublisher;
use crate::logging::{log_error, log_step_operation};
use crate::models::{PersistedStep, RoutingId, RoutingStep, StepDraft, StepId, StepKey, StepPayload};
use crate::validation::validate_step_draft;

/// User confirmation asked before a step is deleted
pub trait DeleteConfirmation {
    fn confirm_delete(&self, step: &RoutingStep) -> bool;
}

impl<F> DeleteConfirmation for F
where
    F: Fn(&RoutingStep) -> bool,
{
    fn confirm_delete(&self, step: &RoutingStep) -> bool {
        self(step)
    }
}

/// Confirmation gate that accepts every deletion
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl DeleteConfirmation for AlwaysConfirm {
    fn confirm_delete(&self, _step: &RoutingStep) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The step was removed; carries the removed entry
    Removed(RoutingStep),
    /// The confirmation gate declined
    Cancelled,
}

/// What happened to the remote order after a local reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSync {
    /// The routing has no remote identity yet
    LocalOnly,
    /// At least one step is not persisted; nothing meaningful to send
    Deferred,
    /// A newer reorder was issued and will carry the order instead
    Superseded,
    /// The store accepted the new order
    Persisted,
    /// No reorder was outstanding
    InSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Boundary move; the list is untouched
    Unchanged,
    Moved { sync: OrderSync },
}

#[derive(Debug, Default)]
struct SequencerState {
    steps: Vec<RoutingStep>,
    /// Bumped by every local reorder
    reorder_generation: u64,
    /// A reorder was deferred because some steps were not persisted
    order_pending: bool,
}

impl SequencerState {
    fn position(&self, key: StepKey) -> Option<usize> {
        self.steps.iter().position(|step| step.key == key)
    }

    fn renumber(&mut self) {
        for (index, step) in self.steps.iter_mut().enumerate() {
            step.sequence_number = index as i32 + 1;
        }
    }

    fn remote_ids(&self) -> Option<Vec<StepId>> {
        self.steps.iter().map(|step| step.remote_id).collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.steps.len() {
            Ok(())
        } else {
            Err(RoutingError::IndexOutOfRange {
                index,
                len: self.steps.len(),
            })
        }
    }
}

/// What to do once a create response has been matched to its entry
enum Backfill {
    Done,
    /// The entry changed while the create was in flight
    Update(StepPayload),
    /// The entry was deleted while the create was in flight
    Orphaned,
}

/// Ordered step list of one routing
pub struct RoutingSequencer {
    routing_id: RwLock<Option<RoutingId>>,
    store: Arc<dyn RoutingStore>,
    state: Mutex<SequencerState>,
    reorder_lane: tokio::sync::Mutex<()>,
    config: SequencerConfig,
    events: Option<EventPublisher>,
}

impl std::fmt::Debug for RoutingSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingSequencer")
            .field("routing_id", &self.routing_id())
            .field("steps", &self.state.lock().steps.len())
            .finish()
    }
}

impl RoutingSequencer {
    /// Sequencer with an empty step list
    ///
    /// `routing_id` is the remote identity of the parent routing, if it has one.
    /// Without it every mutation stays local.
    pub fn new(routing_id: Option<RoutingId>, store: Arc<dyn RoutingStore>) -> Self {
        Self::with_config(routing_id, store, SequencerConfig::default())
    }

    pub fn with_config(
        routing_id: Option<RoutingId>,
        store: Arc<dyn RoutingStore>,
        config: SequencerConfig,
    ) -> Self {
        Self {
            routing_id: RwLock::new(routing_id),
            store,
            state: Mutex::new(SequencerState::default()),
            reorder_lane: tokio::sync::Mutex::new(()),
            config,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = Some(events);
        self
    }

    pub fn routing_id(&self) -> Option<RoutingId> {
        *self.routing_id.read()
    }

    /// Mirror later mutations to `routing_id` once the routing exists remotely
    ///
    /// A sequencer that already belongs to a routing keeps it.
    pub fn attach_routing(&self, routing_id: RoutingId) {
        let mut current = self.routing_id.write();
        match *current {
            None => {
                *current = Some(routing_id);
                debug!(routing_id, "Sequencer attached to routing");
            }
            Some(existing) if existing != routing_id => {
                warn!(existing, routing_id, "Sequencer already belongs to another routing");
            }
            Some(_) => {}
        }
    }

    /// Snapshot of the step list
    pub fn steps(&self) -> Vec<RoutingStep> {
        self.state.lock().steps.clone()
    }

    pub fn step(&self, index: usize) -> Option<RoutingStep> {
        self.state.lock().steps.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().steps.is_empty()
    }

    /// Current position of the entry with `key`
    pub fn index_of(&self, key: StepKey) -> Option<usize> {
        self.state.lock().position(key)
    }

    pub fn has_unpersisted_steps(&self) -> bool {
        self.state.lock().steps.iter().any(|step| !step.is_persisted())
    }

    /// Replace the list with steps loaded from the store
    ///
    /// Steps are sorted by their stored sequence number and then renumbered
    /// from their position.
    pub fn load_persisted(&self, mut persisted: Vec<PersistedStep>) {
        persisted.sort_by_key(|step| step.sequence_number);
        let mut state = self.state.lock();
        state.steps = persisted.into_iter().map(RoutingStep::from).collect();
        state.renumber();
        state.order_pending = false;
        debug!(routing_id = ?self.routing_id(), steps = state.steps.len(), "Loaded persisted steps");
    }

    /// Append a step
    ///
    /// The step is appended even when the remote create fails; the error is
    /// returned and [`retry_pending`](Self::retry_pending) persists it later.
    pub async fn add_step(&self, draft: StepDraft) -> Result<StepKey> {
        validate_step_draft(&draft)?;

        let (key, payload) = {
            let mut state = self.state.lock();
            let step = RoutingStep::new(draft, state.steps.len() as i32 + 1);
            let key = step.key;
            let payload = step.to_payload();
            state.steps.push(step);
            (key, payload)
        };
        self.publish(
            events::STEP_ADDED,
            json!({
                "step_key": key,
                "sequence_number": payload.sequence_number,
                "operation": payload.draft.display_name(),
            }),
        );

        if let Some(routing_id) = self.routing_id() {
            self.create_remote(routing_id, key, payload).await?;
        }
        Ok(key)
    }

    /// Replace the definition of the step at `index`
    ///
    /// The entry keeps its key, remote identity and sequence number.
    pub async fn edit_step(&self, index: usize, draft: StepDraft) -> Result<()> {
        validate_step_draft(&draft)?;

        let (remote_id, payload) = {
            let mut state = self.state.lock();
            state.check_index(index)?;
            let step = &mut state.steps[index];
            step.draft = draft;
            (step.remote_id, step.to_payload())
        };
        self.publish(
            events::STEP_UPDATED,
            json!({"sequence_number": payload.sequence_number, "step_id": remote_id}),
        );

        if let Some(step_id) = remote_id {
            self.store
                .update_step(step_id, &payload)
                .await
                .map_err(|error| self.remote_failed(error, Some(step_id)))?;
            log_step_operation(
                operations::UPDATE_STEP,
                self.routing_id(),
                Some(step_id),
                Some(payload.sequence_number),
                "success",
                None,
            );
        }
        Ok(())
    }

    /// Delete the step at `index`
    ///
    /// Mandatory steps are refused before the gate is asked. A persisted step is
    /// removed locally only after the store confirms the delete.
    pub async fn delete_step<C>(&self, index: usize, confirmation: &C) -> Result<DeleteOutcome>
    where
        C: DeleteConfirmation + ?Sized,
    {
        let step = {
            let state = self.state.lock();
            state.check_index(index)?;
            state.steps[index].clone()
        };

        if step.is_mandatory() {
            warn!(
                routing_id = ?self.routing_id(),
                sequence_number = step.sequence_number,
                "Refused to delete mandatory step"
            );
            return Err(RoutingError::ProtectedStep {
                sequence: step.sequence_number,
                operation: step.draft.display_name(),
            });
        }

        if !confirmation.confirm_delete(&step) {
            debug!(sequence_number = step.sequence_number, "Step deletion cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Some(step_id) = step.remote_id {
            self.store
                .delete_step(step_id)
                .await
                .map_err(|error| self.remote_failed(error, Some(step_id)))?;
            log_step_operation(
                operations::DELETE_STEP,
                self.routing_id(),
                Some(step_id),
                Some(step.sequence_number),
                "success",
                None,
            );
        }

        {
            let mut state = self.state.lock();
            if let Some(position) = state.position(step.key) {
                state.steps.remove(position);
                state.renumber();
            }
        }
        self.publish(
            events::STEP_REMOVED,
            json!({"step_key": step.key, "step_id": step.remote_id}),
        );
        Ok(DeleteOutcome::Removed(step))
    }

    /// Swap the step at `index` with its predecessor
    pub async fn move_up(&self, index: usize) -> Result<MoveOutcome> {
        if index == 0 {
            return Ok(MoveOutcome::Unchanged);
        }
        self.state.lock().check_index(index)?;
        self.swap_with_next(index - 1).await
    }

    /// Swap the step at `index` with its successor
    pub async fn move_down(&self, index: usize) -> Result<MoveOutcome> {
        let len = {
            let state = self.state.lock();
            state.check_index(index)?;
            state.steps.len()
        };
        if index + 1 == len {
            return Ok(MoveOutcome::Unchanged);
        }
        self.swap_with_next(index).await
    }

    /// Persist every step without a remote identity, one at a time in list order
    ///
    /// Stops at the first failure. Steps created before the failure keep their
    /// remote identity, so calling this again does not duplicate them. A
    /// sequencer without a routing has nothing to persist.
    pub async fn persist_pending_steps(&self) -> Result<usize> {
        let Some(routing_id) = self.routing_id() else {
            return Ok(0);
        };
        let mut created = 0;
        loop {
            let next = {
                let state = self.state.lock();
                state
                    .steps
                    .iter()
                    .find(|step| !step.is_persisted())
                    .map(|step| (step.key, step.to_payload()))
            };
            let Some((key, payload)) = next else {
                break;
            };
            self.create_remote(routing_id, key, payload).await?;
            created += 1;
        }
        Ok(created)
    }

    /// Retry whatever a failed call left unsynchronized
    ///
    /// Creates missing steps, then sends the current order if a reorder was
    /// deferred or failed.
    pub async fn retry_pending(&self) -> Result<OrderSync> {
        if self.routing_id().is_none() {
            return Ok(OrderSync::LocalOnly);
        }
        self.persist_pending_steps().await?;
        let pending = {
            let state = self.state.lock();
            state.order_pending.then_some(state.reorder_generation)
        };
        match pending {
            Some(generation) => self.sync_order(generation).await,
            None => Ok(OrderSync::InSync),
        }
    }

    async fn swap_with_next(&self, upper: usize) -> Result<MoveOutcome> {
        let generation = {
            let mut state = self.state.lock();
            state.steps.swap(upper, upper + 1);
            state.renumber();
            state.reorder_generation += 1;
            state.reorder_generation
        };
        self.publish(
            events::STEPS_REORDERED,
            json!({"positions": [upper + 1, upper + 2], "generation": generation}),
        );

        let sync = self.sync_order(generation).await?;
        Ok(MoveOutcome::Moved { sync })
    }

    /// Send the local order for reorder `generation`, if it is still the latest
    async fn sync_order(&self, generation: u64) -> Result<OrderSync> {
        let Some(routing_id) = self.routing_id() else {
            return Ok(OrderSync::LocalOnly);
        };

        let _lane = self.reorder_lane.lock().await;
        let ordered_ids = {
            let mut state = self.state.lock();
            if state.reorder_generation != generation {
                debug!(routing_id, generation, "Reorder superseded by a newer move");
                return Ok(OrderSync::Superseded);
            }
            match state.remote_ids() {
                Some(ids) => ids,
                None => {
                    state.order_pending = true;
                    debug!(routing_id, "Reorder deferred until every step is persisted");
                    return Ok(OrderSync::Deferred);
                }
            }
        };

        match self.store.reorder_steps(routing_id, &ordered_ids).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock();
                    if state.reorder_generation == generation {
                        state.order_pending = false;
                    }
                }
                info!(routing_id, steps = ordered_ids.len(), "Step order persisted");
                Ok(OrderSync::Persisted)
            }
            Err(error) => {
                self.state.lock().order_pending = true;
                let error = self.remote_failed(error, None);
                if self.config.resync_on_reorder_failure {
                    self.resync_after_failed_reorder(routing_id, generation).await;
                }
                Err(error)
            }
        }
    }

    /// Adopt the stored order after a failed reorder
    ///
    /// Only applies when no newer reorder was issued and the stored steps are
    /// exactly the persisted local steps.
    async fn resync_after_failed_reorder(&self, routing_id: RoutingId, generation: u64) {
        let record = match self.store.load_routing(routing_id).await {
            Ok(record) => record,
            Err(error) => {
                log_error(
                    "RoutingSequencer",
                    operations::LOAD_ROUTING,
                    &error.to_string(),
                    Some("resync after failed reorder"),
                );
                return;
            }
        };

        let mut remote = record.steps;
        remote.sort_by_key(|step| step.sequence_number);

        let mut state = self.state.lock();
        if state.reorder_generation != generation {
            return;
        }
        let local_ids: HashSet<StepId> = state.steps.iter().filter_map(|s| s.remote_id).collect();
        let remote_ids: HashSet<StepId> = remote.iter().map(|s| s.id).collect();
        if local_ids != remote_ids || local_ids.len() != state.steps.len() {
            warn!(routing_id, "Stored steps differ from local steps; keeping local order");
            return;
        }

        let mut reordered = Vec::with_capacity(state.steps.len());
        for stored in &remote {
            if let Some(position) = state.steps.iter().position(|s| s.remote_id == Some(stored.id)) {
                reordered.push(state.steps[position].clone());
            }
        }
        state.steps = reordered;
        state.renumber();
        state.order_pending = false;
        drop(state);

        info!(routing_id, "Adopted stored step order after failed reorder");
        self.publish(events::STEPS_RESYNCED, json!({"routing_id": routing_id}));
    }

    /// Create `key`'s step remotely and backfill the identity into its entry
    async fn create_remote(&self, routing_id: RoutingId, key: StepKey, payload: StepPayload) -> Result<StepId> {
        let created = self
            .store
            .create_step(routing_id, &payload)
            .await
            .map_err(|error| self.remote_failed(error, None))?;

        let (follow_up, order_pending, generation) = {
            let mut state = self.state.lock();
            let follow_up = match state.position(key) {
                Some(position) => {
                    let step = &mut state.steps[position];
                    step.remote_id = Some(created.id);
                    if step.draft != payload.draft {
                        Backfill::Update(step.to_payload())
                    } else {
                        Backfill::Done
                    }
                }
                None => Backfill::Orphaned,
            };
            let order_pending = state.order_pending && state.remote_ids().is_some();
            (follow_up, order_pending, state.reorder_generation)
        };
        log_step_operation(
            operations::CREATE_STEP,
            Some(routing_id),
            Some(created.id),
            Some(payload.sequence_number),
            "success",
            None,
        );
        self.publish(
            events::STEP_PERSISTED,
            json!({"step_key": key, "step_id": created.id}),
        );

        match follow_up {
            Backfill::Done => {}
            Backfill::Update(current) => {
                self.store
                    .update_step(created.id, &current)
                    .await
                    .map_err(|error| self.remote_failed(error, Some(created.id)))?;
            }
            Backfill::Orphaned => {
                warn!(routing_id, step_id = created.id, "Step deleted while its create was in flight");
                self.store
                    .delete_step(created.id)
                    .await
                    .map_err(|error| self.remote_failed(error, Some(created.id)))?;
            }
        }

        if order_pending && self.routing_id() == Some(routing_id) {
            self.sync_order(generation).await?;
        }
        Ok(created.id)
    }

    fn remote_failed(&self, error: RemoteOperationError, step_id: Option<StepId>) -> RoutingError {
        log_error(
            "RoutingSequencer",
            &error.operation,
            &error.to_string(),
            step_id.map(|id| format!("step_id={id}")).as_deref(),
        );
        self.publish(
            events::REMOTE_FAILED,
            json!({
                "operation": error.operation,
                "step_id": step_id,
                "message": error.user_message(),
            }),
        );
        RoutingError::Remote(error)
    }

    fn publish(&self, event: &str, mut context: serde_json::Value) {
        if let Some(events) = &self.events {
            if let serde_json::Value::Object(map) = &mut context {
                map.entry("routing_id").or_insert(json!(self.routing_id()));
            }
            events.publish(event, context);
        }
    }
}
