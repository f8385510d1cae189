#![allow(clippy::doc_markdown)] // Allow technical terms like MES, Mermaid in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # MES Flow Core
//!
//! Routing step sequencing and process-flow diagram layout for a
//! manufacturing-execution console.
//!
//! ## Overview
//!
//! Two pieces of the console carry real design weight and live here:
//!
//! - **Routing sequencing**: an ordered, editable list of production steps kept
//!   consistent with a remote store while only part of it may be persisted.
//! - **Process-flow layout**: an order's operations grouped by process and laid
//!   out as a positioned directed graph with status-dependent styling.
//!
//! Everything the console persists goes through the async traits in
//! [`client`]; this crate owns no storage of its own.
//!
//! ## Module Organization
//!
//! - [`models`] - routings, steps, operations, orders and layout artifacts
//! - [`routing`] - routing sequencer and routing editor
//! - [`flow`] - process grouper, layout engine, styles and rendering surfaces
//! - [`client`] - remote collaborator traits and the in-memory store
//! - [`config`] - layout, sequencer, logging and event settings
//! - [`error`] - structured error handling
//! - [`events`] - routing lifecycle events
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use mesflow_core::client::{InMemoryRoutingStore, NoReferenceData};
//! use mesflow_core::models::{RoutingHeader, StepDraft};
//! use mesflow_core::routing::{EditorMode, RoutingEditor};
//!
//! # async fn example() -> mesflow_core::Result<()> {
//! let store = Arc::new(InMemoryRoutingStore::new());
//! let mut editor = RoutingEditor::new(EditorMode::Create, store.clone(), Arc::new(NoReferenceData));
//! editor.open().await?;
//!
//! *editor.form_mut() = RoutingHeader::new("Gear housing", 3);
//! editor.sequencer().add_step(StepDraft::operation("Mill", "MACHINING")).await?;
//! editor.sequencer().add_step(StepDraft::operation("Inspect", "QUALITY").mandatory()).await?;
//!
//! let outcome = editor.save(&|routing_id: i64| println!("saved routing {routing_id}")).await?;
//! assert_eq!(outcome.created_steps, 2);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod flow;
pub mod logging;
pub mod models;
pub mod routing;
pub mod validation;

pub use config::{ConfigLoader, FlowConfig, LayoutConfig, SequencerConfig};
pub use error::{RemoteOperationError, Result, RoutingError};
pub use events::EventPublisher;
pub use flow::{FlowDiagramService, FlowLayoutEngine};
pub use routing::{RoutingEditor, RoutingSequencer};
