//! # System Constants
//!
//! Event names, layout defaults and identifiers shared by the routing
//! sequencer, the routing editor and the flow layout engine.

/// Routing lifecycle events published through [`crate::events::EventPublisher`]
pub mod events {
    // Step list mutations
    pub const STEP_ADDED: &str = "routing.step_added";
    pub const STEP_UPDATED: &str = "routing.step_updated";
    pub const STEP_REMOVED: &str = "routing.step_removed";
    pub const STEPS_REORDERED: &str = "routing.steps_reordered";
    pub const STEP_PERSISTED: &str = "routing.step_persisted";

    // Remote synchronization
    pub const REMOTE_FAILED: &str = "routing.remote_failed";
    pub const STEPS_RESYNCED: &str = "routing.steps_resynced";

    // Editor lifecycle
    pub const ROUTING_LOADED: &str = "routing.loaded";
    pub const ROUTING_SAVED: &str = "routing.saved";
}

/// Default geometry of the flow layout, in canvas pixels
pub mod layout {
    pub const HEADER_X: f64 = 50.0;
    pub const FIRST_OPERATION_X: f64 = 250.0;
    pub const COLUMN_WIDTH: f64 = 200.0;
    pub const ROW_HEIGHT: f64 = 120.0;
    pub const TOP_MARGIN: f64 = 50.0;
    pub const NODE_WIDTH: f64 = 160.0;
    pub const NODE_HEIGHT: f64 = 60.0;
    pub const HEADER_WIDTH: f64 = 140.0;
    pub const HEADER_HEIGHT: f64 = 60.0;
    pub const MIN_CANVAS_HEIGHT: f64 = 400.0;
    pub const CANVAS_MARGIN: f64 = 100.0;
}

/// Key of the group collecting operations without a process
pub const DEFAULT_PROCESS_KEY: &str = "default";

/// Display name of the group collecting operations without a process
pub const DEFAULT_PROCESS_NAME: &str = "Unassigned operations";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "MESFLOW";
