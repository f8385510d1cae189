//! # Error Types
//!
//! Structured error handling for the routing sequencer, routing editor and the
//! flow diagram service. Validation and protection errors never reach the remote
//! layer; remote failures are wrapped in [`RemoteOperationError`].

use thiserror::Error;

/// Message shown when a remote collaborator fails without saying why.
pub const GENERIC_REMOTE_FAILURE_MESSAGE: &str = "The request could not be completed. Please try again.";

/// Remote call names used in errors and structured logs
pub mod operations {
    pub const LOAD_ROUTING: &str = "load_routing";
    pub const CREATE_ROUTING: &str = "create_routing";
    pub const UPDATE_ROUTING: &str = "update_routing";
    pub const CREATE_STEP: &str = "create_step";
    pub const UPDATE_STEP: &str = "update_step";
    pub const DELETE_STEP: &str = "delete_step";
    pub const REORDER_STEPS: &str = "reorder_steps";
    pub const LIST_PROCESSES: &str = "list_processes";
    pub const LIST_OPERATION_TEMPLATES: &str = "list_operation_templates";
    pub const LOAD_ORDER: &str = "load_order";
}

/// Failure reported by one of the external collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Remote operation {operation} failed: {}", .message.as_deref().unwrap_or("no details provided"))]
pub struct RemoteOperationError {
    pub operation: String,
    pub message: Option<String>,
}

impl RemoteOperationError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: Some(message.into()),
        }
    }

    /// A failure the transport gave no description for
    pub fn without_message(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: None,
        }
    }

    /// Human-readable message, falling back to a generic one
    pub fn user_message(&self) -> String {
        match self.message.as_deref() {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => GENERIC_REMOTE_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Errors produced by the routing sequencer and editor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Validation error: missing required field(s): {}", .missing_fields.join(", "))]
    Validation { missing_fields: Vec<String> },

    #[error("Step {sequence} ({operation}) is mandatory and cannot be removed")]
    ProtectedStep { sequence: i32, operation: String },

    #[error("Step index {index} is out of range for a routing with {len} steps")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Remote(#[from] RemoteOperationError),
}

impl RoutingError {
    pub fn validation<I, S>(missing_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            missing_fields: missing_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the error came from a remote collaborator
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Message suitable for display next to the form that triggered it
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(remote) => remote.user_message(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;

/// Result alias for calls into the external collaborators
pub type RemoteResult<T> = std::result::Result<T, RemoteOperationError>;
