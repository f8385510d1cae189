//! Rendering surfaces
//!
//! A surface takes a finished layout and draws it. It owns no business logic
//! and reports nothing back to the layout engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::models::FlowLayout;

/// Anything that can draw a flow layout
pub trait RenderSurface {
    fn render(&mut self, layout: &FlowLayout);
}

/// Text formats a layout can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Mermaid,
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mermaid => write!(f, "mermaid"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mermaid" => Ok(Self::Mermaid),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid export format: {s}")),
        }
    }
}

/// Surface that renders a layout to Mermaid or JSON text
#[derive(Debug, Clone, Default)]
pub struct ExportSurface {
    format: ExportFormat,
    rendered: Option<String>,
}

impl ExportSurface {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            rendered: None,
        }
    }

    /// Text of the most recent render
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }
}

impl RenderSurface for ExportSurface {
    fn render(&mut self, layout: &FlowLayout) {
        self.rendered = match self.format {
            ExportFormat::Mermaid => Some(layout.to_mermaid()),
            ExportFormat::Json => match layout.to_json().and_then(|value| serde_json::to_string_pretty(&value)) {
                Ok(json) => Some(json),
                Err(e) => {
                    error!(error = %e, "Failed to export flow layout as JSON");
                    None
                }
            },
        };
    }
}
