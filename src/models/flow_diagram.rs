//! # Flow Diagram
//!
//! Layout artifacts produced by the flow layout engine. A [`FlowLayout`] is
//! derived data: it is rebuilt from an order's operations on every pass and has
//! no lifecycle of its own.
//!
//! Besides the node/edge payload consumed by a rendering surface, a layout can
//! be exported as a Mermaid flowchart or as JSON for custom renderers and API
//! responses.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::operation::OperationStatus;

/// Top-left corner of a node on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    ProcessHeader,
    Operation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    Rectangle,
    RoundedRectangle,
}

/// Fill, border and shadow of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub fill: String,
    pub border: String,
    pub border_width: f64,
    pub shadow: bool,
}

/// A positioned node in the flow diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub position: Position,
    pub size: Size,
    pub shape: NodeShape,
    pub style: NodeStyle,
    pub status: Option<OperationStatus>,
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLine {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowHead {
    Triangle,
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub line: EdgeLine,
    pub arrow: Option<ArrowHead>,
    pub color: String,
}

/// Complete node/edge payload for one order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowLayout {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub row_count: usize,
    pub canvas_height: f64,
}

/// Diagram statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDiagramStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub process_count: usize,
    pub operation_count: usize,
    pub completion_percentage: f64,
}

impl FlowLayout {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Edges pointing at the given node
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges.iter().filter(move |edge| edge.target == node_id)
    }

    pub fn operation_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Operation)
    }

    /// Generate Mermaid flowchart syntax for the diagram.
    ///
    /// Node positions are left to Mermaid; status colors and edge line styles
    /// are carried over.
    pub fn to_mermaid(&self) -> String {
        let mut mermaid = String::from("flowchart LR\n");

        for node in &self.nodes {
            let id = mermaid_id(&node.id);
            let label = node.label.replace('"', "'");
            match node.kind {
                NodeKind::ProcessHeader => mermaid.push_str(&format!("    {id}([\"{label}\"])\n")),
                NodeKind::Operation => mermaid.push_str(&format!("    {id}[\"{label}\"]\n")),
            }
        }

        for edge in &self.edges {
            let connector = match (edge.line, edge.arrow) {
                (EdgeLine::Solid, Some(_)) => "-->",
                (EdgeLine::Solid, None) => "---",
                (_, Some(_)) => "-.->",
                (_, None) => "-.-",
            };
            mermaid.push_str(&format!(
                "    {} {} {}\n",
                mermaid_id(&edge.source),
                connector,
                mermaid_id(&edge.target)
            ));
        }

        mermaid.push('\n');
        for node in &self.nodes {
            mermaid.push_str(&format!(
                "    style {} fill:{},stroke:{},stroke-width:{}px\n",
                mermaid_id(&node.id),
                node.style.fill,
                node.style.border,
                node.style.border_width
            ));
        }
        for (index, edge) in self.edges.iter().enumerate() {
            mermaid.push_str(&format!("    linkStyle {index} stroke:{}\n", edge.color));
        }

        mermaid
    }

    /// Generate JSON representation of the diagram.
    pub fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let JsonValue::Object(map) = &mut value {
            map.insert(
                "metadata".to_string(),
                serde_json::json!({
                    "generated_at": chrono::Utc::now().to_rfc3339(),
                    "version": "1.0"
                }),
            );
        }
        Ok(value)
    }

    /// Calculate diagram statistics.
    pub fn get_stats(&self) -> FlowDiagramStats {
        let operation_count = self.operation_nodes().count();
        let done = self
            .operation_nodes()
            .filter(|node| node.status.is_some_and(|status| status.is_done()))
            .count();
        let completion_percentage = if operation_count > 0 {
            (done as f64 / operation_count as f64) * 100.0
        } else {
            0.0
        };

        FlowDiagramStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            process_count: self.nodes.len() - operation_count,
            operation_count,
            completion_percentage,
        }
    }
}

fn mermaid_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
