//! # Routing Editor
//!
//! One edit session of one routing. The mode is fixed when the editor is
//! created:
//!
//! - **Create** starts from a blank header and an empty step list. Saving
//!   creates the header, then persists every step sequentially in list order.
//! - **Edit** loads an existing routing. Saving updates the header only; step
//!   changes reach the store through the hosted [`RoutingSequencer`].
//!
//! A failed save leaves the form and the step list exactly as they were.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::sequencer::RoutingSequencer;
use crate::client::{ReferenceDataSource, RoutingStore};
use crate::config::{FlowConfig, SequencerConfig};
use crate::constants::events;
use crate::error::{operations, RemoteOperationError, Result, RoutingError};
use crate::events::EventPublisher;
use crate::logging::{log_error, log_routing_operation};
use crate::models::{
    OperationTemplateId, OperationTemplateSummary, Process, RoutingHeader, RoutingId, StepDraft,
};
use crate::validation::validate_routing_header;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(RoutingId),
}

impl EditorMode {
    pub fn routing_id(&self) -> Option<RoutingId> {
        match self {
            Self::Create => None,
            Self::Edit(routing_id) => Some(*routing_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorPhase {
    /// Not opened yet
    Loading,
    Ready,
    /// The routing could not be loaded; the session cannot recover
    LoadFailed { message: String },
    Saved { routing_id: RoutingId },
}

impl EditorPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LoadFailed { .. })
    }
}

/// Called once a save has fully completed
pub trait Navigator {
    fn navigate_after_save(&self, routing_id: RoutingId);
}

impl<F> Navigator for F
where
    F: Fn(RoutingId),
{
    fn navigate_after_save(&self, routing_id: RoutingId) {
        self(routing_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub routing_id: RoutingId,
    /// Whether this save created the routing header
    pub created_header: bool,
    pub created_steps: usize,
}

/// Editing session for one routing
pub struct RoutingEditor {
    mode: EditorMode,
    phase: EditorPhase,
    form: RoutingHeader,
    store: Arc<dyn RoutingStore>,
    reference_data: Arc<dyn ReferenceDataSource>,
    sequencer: RoutingSequencer,
    processes: Vec<Process>,
    templates: Vec<OperationTemplateSummary>,
    /// Header created by an earlier save whose step creations did not finish
    created_header: Option<(RoutingId, RoutingHeader)>,
    last_error: Option<RoutingError>,
    reference_error: Option<RemoteOperationError>,
    events: Option<EventPublisher>,
}

impl std::fmt::Debug for RoutingEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingEditor")
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("form", &self.form)
            .field("sequencer", &self.sequencer)
            .finish()
    }
}

impl RoutingEditor {
    pub fn new(
        mode: EditorMode,
        store: Arc<dyn RoutingStore>,
        reference_data: Arc<dyn ReferenceDataSource>,
    ) -> Self {
        Self::with_config(mode, store, reference_data, SequencerConfig::default())
    }

    pub fn with_config(
        mode: EditorMode,
        store: Arc<dyn RoutingStore>,
        reference_data: Arc<dyn ReferenceDataSource>,
        config: SequencerConfig,
    ) -> Self {
        let sequencer = RoutingSequencer::with_config(mode.routing_id(), store.clone(), config);
        Self {
            mode,
            phase: EditorPhase::Loading,
            form: RoutingHeader::default(),
            store,
            reference_data,
            sequencer,
            processes: Vec::new(),
            templates: Vec::new(),
            created_header: None,
            last_error: None,
            reference_error: None,
            events: None,
        }
    }

    /// Editor using the sequencer and event settings of `config`
    pub fn from_config(
        mode: EditorMode,
        store: Arc<dyn RoutingStore>,
        reference_data: Arc<dyn ReferenceDataSource>,
        config: &FlowConfig,
    ) -> Self {
        let editor = Self::with_config(mode, store, reference_data, config.sequencer.clone());
        match config.events.publisher() {
            Some(events) => editor.with_events(events),
            None => editor,
        }
    }

    /// Publish editor and sequencer events through `events`
    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.sequencer = self.sequencer.with_events(events.clone());
        self.events = Some(events);
        self
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn form(&self) -> &RoutingHeader {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RoutingHeader {
        &mut self.form
    }

    /// Step list of the routing being edited
    pub fn sequencer(&self) -> &RoutingSequencer {
        &self.sequencer
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn templates(&self) -> &[OperationTemplateSummary] {
        &self.templates
    }

    /// Error of the most recent failed load or save
    pub fn last_error(&self) -> Option<&RoutingError> {
        self.last_error.as_ref()
    }

    /// Failure while loading processes or operation templates
    pub fn reference_error(&self) -> Option<&RemoteOperationError> {
        self.reference_error.as_ref()
    }

    /// Remote identity of the routing, once it has one
    pub fn routing_id(&self) -> Option<RoutingId> {
        self.mode
            .routing_id()
            .or_else(|| self.created_header.as_ref().map(|(routing_id, _)| *routing_id))
    }

    /// Load reference data and, in edit mode, the routing itself
    ///
    /// Reference data failures are recorded in
    /// [`reference_error`](Self::reference_error) and do not stop the session.
    /// A routing load failure moves the editor to [`EditorPhase::LoadFailed`]
    /// with a blank form.
    pub async fn open(&mut self) -> Result<()> {
        self.load_reference_data().await;

        let EditorMode::Edit(routing_id) = self.mode else {
            self.phase = EditorPhase::Ready;
            return Ok(());
        };

        match self.store.load_routing(routing_id).await {
            Ok(record) => {
                self.form = record.routing.header;
                let steps = record.steps.len();
                self.sequencer.load_persisted(record.steps);
                self.phase = EditorPhase::Ready;
                self.last_error = None;
                log_routing_operation(
                    operations::LOAD_ROUTING,
                    Some(routing_id),
                    Some(&self.form.name),
                    "success",
                    Some(&format!("steps={steps}")),
                );
                self.publish(
                    events::ROUTING_LOADED,
                    serde_json::json!({"routing_id": routing_id, "steps": steps}),
                );
                Ok(())
            }
            Err(error) => {
                log_error(
                    "RoutingEditor",
                    operations::LOAD_ROUTING,
                    &error.to_string(),
                    Some(&format!("routing_id={routing_id}")),
                );
                self.form = RoutingHeader::default();
                self.phase = EditorPhase::LoadFailed {
                    message: error.user_message(),
                };
                let error = RoutingError::Remote(error);
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    async fn load_reference_data(&mut self) {
        self.reference_error = None;

        match self.reference_data.list_processes().await {
            Ok(processes) => self.processes = processes,
            Err(error) => {
                warn!(error = %error, "Failed to load processes");
                self.reference_error = Some(error);
            }
        }

        match self.reference_data.list_operation_templates().await {
            Ok(templates) => self.templates = templates,
            Err(error) => {
                warn!(error = %error, "Failed to load operation templates");
                self.reference_error.get_or_insert(error);
            }
        }

        debug!(
            processes = self.processes.len(),
            templates = self.templates.len(),
            "Reference data loaded"
        );
    }

    /// Step draft prefilled from a loaded operation template
    pub fn draft_from_template(&self, template_id: OperationTemplateId) -> Option<StepDraft> {
        self.templates
            .iter()
            .find(|template| template.id == template_id)
            .map(OperationTemplateSummary::to_draft)
    }

    /// Save the routing
    ///
    /// `navigator` is called only after every remote call of the save resolved
    /// successfully.
    pub async fn save<N>(&mut self, navigator: &N) -> Result<SaveOutcome>
    where
        N: Navigator + ?Sized,
    {
        let result = match self.mode {
            EditorMode::Create => self.save_new().await,
            EditorMode::Edit(routing_id) => self.save_existing(routing_id).await,
        };

        match result {
            Ok(outcome) => {
                self.last_error = None;
                self.phase = EditorPhase::Saved {
                    routing_id: outcome.routing_id,
                };
                log_routing_operation(
                    "save_routing",
                    Some(outcome.routing_id),
                    Some(&self.form.name),
                    "success",
                    Some(&format!("created_steps={}", outcome.created_steps)),
                );
                if let Some(publisher) = &self.events {
                    if let Err(error) = publisher.publish_serialized(events::ROUTING_SAVED, &outcome) {
                        warn!(error = %error, "Failed to publish routing saved event");
                    }
                }
                navigator.navigate_after_save(outcome.routing_id);
                Ok(outcome)
            }
            Err(error) => {
                warn!(error = %error, mode = ?self.mode, "Routing save failed");
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    async fn save_new(&mut self) -> Result<SaveOutcome> {
        validate_routing_header(&self.form)?;

        let (routing_id, created_header) = match self.created_header.clone() {
            Some((routing_id, saved)) => {
                if saved != self.form {
                    self.store
                        .update_routing(routing_id, &self.form)
                        .await
                        .map_err(|error| self.header_failed(error, Some(routing_id)))?;
                    self.created_header = Some((routing_id, self.form.clone()));
                }
                info!(routing_id, "Reusing routing header from an earlier save");
                (routing_id, false)
            }
            None => {
                let routing = self
                    .store
                    .create_routing(&self.form)
                    .await
                    .map_err(|error| self.header_failed(error, None))?;
                self.created_header = Some((routing.id, self.form.clone()));
                log_routing_operation(
                    operations::CREATE_ROUTING,
                    Some(routing.id),
                    Some(&self.form.name),
                    "success",
                    None,
                );
                (routing.id, true)
            }
        };

        self.sequencer.attach_routing(routing_id);
        let created_steps = self.sequencer.persist_pending_steps().await?;
        Ok(SaveOutcome {
            routing_id,
            created_header,
            created_steps,
        })
    }

    async fn save_existing(&mut self, routing_id: RoutingId) -> Result<SaveOutcome> {
        validate_routing_header(&self.form)?;

        self.store
            .update_routing(routing_id, &self.form)
            .await
            .map_err(|error| self.header_failed(error, Some(routing_id)))?;
        Ok(SaveOutcome {
            routing_id,
            created_header: false,
            created_steps: 0,
        })
    }

    fn header_failed(&self, error: RemoteOperationError, routing_id: Option<RoutingId>) -> RoutingError {
        log_error(
            "RoutingEditor",
            &error.operation,
            &error.to_string(),
            routing_id.map(|id| format!("routing_id={id}")).as_deref(),
        );
        self.publish(
            events::REMOTE_FAILED,
            serde_json::json!({
                "operation": error.operation,
                "routing_id": routing_id,
                "message": error.user_message(),
            }),
        );
        RoutingError::Remote(error)
    }

    fn publish(&self, event: &str, context: serde_json::Value) {
        if let Some(events) = &self.events {
            events.publish(event, context);
        }
    }
}
