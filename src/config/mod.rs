//! # Configuration System
//!
//! Layout geometry, sequencer behavior, logging and event settings.
//!
//! ## Sources
//!
//! - **Defaults**: every field has a default, so an empty configuration is valid
//! - **Files**: optional `config/mesflow.{toml,yaml,json}` plus an environment
//!   specific `config/mesflow.<env>.*` override, loaded by [`ConfigLoader`]
//! - **Environment**: `MESFLOW__<SECTION>__<KEY>` variables override files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mesflow_core::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! let row_height = config.layout.row_height;
//! # let _ = row_height;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};

use crate::constants::layout as defaults;
use crate::events::EventPublisher;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub layout: LayoutConfig,
    pub sequencer: SequencerConfig,
    pub logging: LoggingConfig,
    pub events: EventsConfig,
}

/// Geometry of the process-flow layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// X of the process header column
    pub header_x: f64,
    /// X of the first operation column
    pub first_operation_x: f64,
    /// Distance between operation columns
    pub column_width: f64,
    /// Distance between process rows
    pub row_height: f64,
    /// Y of the first row
    pub top_margin: f64,
    pub node_width: f64,
    pub node_height: f64,
    pub header_width: f64,
    pub header_height: f64,
    pub min_canvas_height: f64,
    /// Added below the last row when sizing the canvas
    pub canvas_margin: f64,
    /// Draw a dotted edge from the last operation of a process to the next
    /// process header of the same line item
    pub link_processes: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_x: defaults::HEADER_X,
            first_operation_x: defaults::FIRST_OPERATION_X,
            column_width: defaults::COLUMN_WIDTH,
            row_height: defaults::ROW_HEIGHT,
            top_margin: defaults::TOP_MARGIN,
            node_width: defaults::NODE_WIDTH,
            node_height: defaults::NODE_HEIGHT,
            header_width: defaults::HEADER_WIDTH,
            header_height: defaults::HEADER_HEIGHT,
            min_canvas_height: defaults::MIN_CANVAS_HEIGHT,
            canvas_margin: defaults::CANVAS_MARGIN,
            link_processes: false,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("layout.column_width", self.column_width),
            ("layout.row_height", self.row_height),
            ("layout.node_width", self.node_width),
            ("layout.node_height", self.node_height),
            ("layout.header_width", self.header_width),
            ("layout.header_height", self.header_height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::invalid_value(
                    field,
                    value.to_string(),
                    "must be a positive number",
                ));
            }
        }

        let non_negative = [
            ("layout.header_x", self.header_x),
            ("layout.first_operation_x", self.first_operation_x),
            ("layout.top_margin", self.top_margin),
            ("layout.min_canvas_height", self.min_canvas_height),
            ("layout.canvas_margin", self.canvas_margin),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigurationError::invalid_value(
                    field,
                    value.to_string(),
                    "must be zero or a positive number",
                ));
            }
        }

        if self.first_operation_x < self.header_x + self.header_width {
            return Err(ConfigurationError::invalid_value(
                "layout.first_operation_x",
                self.first_operation_x.to_string(),
                "operations must start to the right of the process header",
            ));
        }
        if self.node_width > self.column_width {
            return Err(ConfigurationError::invalid_value(
                "layout.node_width",
                self.node_width.to_string(),
                "nodes must fit inside one column",
            ));
        }
        Ok(())
    }
}

/// Routing sequencer behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Reload the routing from the store when a reorder call fails
    pub resync_on_reorder_failure: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            resync_on_reorder_failure: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive; the environment decides when unset
    pub level: Option<String>,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub enabled: bool,
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_capacity: 256,
        }
    }
}

impl EventsConfig {
    /// Publisher for these settings, or `None` when events are disabled
    pub fn publisher(&self) -> Option<EventPublisher> {
        self.enabled
            .then(|| EventPublisher::new(self.channel_capacity))
    }
}

impl FlowConfig {
    /// Defaults with a handful of direct environment overrides
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Ok(column_width) = std::env::var("MESFLOW_COLUMN_WIDTH") {
            config.layout.column_width = column_width.parse().map_err(|e| {
                ConfigurationError::invalid_value(
                    "layout.column_width",
                    column_width.clone(),
                    format!("{e}"),
                )
            })?;
        }

        if let Ok(row_height) = std::env::var("MESFLOW_ROW_HEIGHT") {
            config.layout.row_height = row_height.parse().map_err(|e| {
                ConfigurationError::invalid_value("layout.row_height", row_height.clone(), format!("{e}"))
            })?;
        }

        if let Ok(link_processes) = std::env::var("MESFLOW_LINK_PROCESSES") {
            config.layout.link_processes = link_processes.parse().map_err(|e| {
                ConfigurationError::invalid_value(
                    "layout.link_processes",
                    link_processes.clone(),
                    format!("{e}"),
                )
            })?;
        }

        if let Ok(level) = std::env::var("MESFLOW_LOG_LEVEL") {
            config.logging.level = Some(level);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.layout.validate()?;
        if self.events.enabled && self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                "0".to_string(),
                "must be at least 1 when events are enabled",
            ));
        }
        Ok(())
    }
}
