//! # Routing Editing
//!
//! The routing sequencer owns one routing's ordered step list and keeps it in
//! step with the routing store. The routing editor hosts a sequencer for one
//! edit session and saves the routing header.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use mesflow_core::client::InMemoryRoutingStore;
//! use mesflow_core::models::StepDraft;
//! use mesflow_core::routing::RoutingSequencer;
//!
//! # async fn example() -> mesflow_core::Result<()> {
//! let store = Arc::new(InMemoryRoutingStore::new());
//! let sequencer = RoutingSequencer::new(None, store);
//!
//! sequencer.add_step(StepDraft::operation("Saw", "CUTTING")).await?;
//! sequencer.add_step(StepDraft::operation("Drill", "MACHINING")).await?;
//! sequencer.move_up(1).await?;
//!
//! let names: Vec<_> = sequencer.steps().iter().map(|s| s.draft.display_name()).collect();
//! assert_eq!(names, ["Drill", "Saw"]);
//! # Ok(())
//! # }
//! ```

pub mod editor;
pub mod sequencer;

pub use editor::{EditorMode, EditorPhase, Navigator, RoutingEditor, SaveOutcome};
pub use sequencer::{
    AlwaysConfirm, DeleteConfirmation, DeleteOutcome, MoveOutcome, OrderSync, RoutingSequencer,
};
