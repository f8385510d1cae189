use serde::{Deserialize, Serialize};
use std::fmt;

use super::routing_step::PersistedStep;
use super::{ProcessId, RoutingId};

/// How the steps of a routing are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    #[default]
    Sequential,
    Parallel,
}

impl fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "SEQUENTIAL"),
            Self::Parallel => write!(f, "PARALLEL"),
        }
    }
}

impl std::str::FromStr for ExecutionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SEQUENTIAL" => Ok(Self::Sequential),
            "PARALLEL" => Ok(Self::Parallel),
            _ => Err(format!("Invalid execution type: {s}")),
        }
    }
}

/// Lifecycle status of a routing definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingStatus {
    /// Being designed, not yet usable by orders
    #[default]
    Draft,
    /// Available to orders
    Active,
    /// Temporarily withdrawn
    Inactive,
    /// Superseded, kept for history
    Obsolete,
}

impl RoutingStatus {
    /// Whether orders may be released against this routing
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for RoutingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "DRAFT"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
            Self::Obsolete => write!(f, "OBSOLETE"),
        }
    }
}

/// Editable header fields of a routing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutingHeader {
    pub name: String,
    pub process_id: Option<ProcessId>,
    pub execution_type: ExecutionType,
    pub status: RoutingStatus,
}

impl RoutingHeader {
    pub fn new(name: impl Into<String>, process_id: ProcessId) -> Self {
        Self {
            name: name.into(),
            process_id: Some(process_id),
            ..Self::default()
        }
    }

    pub fn with_execution_type(mut self, execution_type: ExecutionType) -> Self {
        self.execution_type = execution_type;
        self
    }

    pub fn with_status(mut self, status: RoutingStatus) -> Self {
        self.status = status;
        self
    }

    /// Names of required header fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.process_id.is_none() {
            missing.push("process_id");
        }
        missing
    }
}

/// A routing header as the routing store returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routing {
    pub id: RoutingId,
    #[serde(flatten)]
    pub header: RoutingHeader,
}

/// A routing together with its persisted steps, as loaded for editing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRecord {
    pub routing: Routing,
    #[serde(default)]
    pub steps: Vec<PersistedStep>,
}
