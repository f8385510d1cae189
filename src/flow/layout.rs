//! # Flow Layout Engine
//!
//! Turns grouped processes into a positioned node/edge payload.
//!
//! Each grouped process is one row, rows running top to bottom in line item
//! then group order. The process header sits in a fixed left column and the
//! process's operations follow in fixed-width columns to its right.
//!
//! Edges:
//! - header → first operation: dashed, neutral, one per process
//! - operation → next operation: solid with an arrowhead, colored by the
//!   status of the later operation
//! - last operation → next process header in the same line item: dotted and
//!   neutral, only with [`LayoutConfig::link_processes`]
//!
//! Every call builds the layout from scratch.

use tracing::debug;

use super::grouper::{GroupedProcess, LineItemGroups};
use super::style::{header_node_style, neutral_edge_color, operation_node_style, status_style};
use crate::config::LayoutConfig;
use crate::models::{
    ArrowHead, EdgeLine, FlowLayout, GraphEdge, GraphNode, LineItemId, NodeKind, NodeShape,
    Operation, Position, Size,
};

/// Deterministic row/column layout of grouped processes
#[derive(Debug, Clone, Default)]
pub struct FlowLayoutEngine {
    config: LayoutConfig,
}

impl FlowLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out every grouped process of every line item
    pub fn build_layout(&self, line_items: &[LineItemGroups]) -> FlowLayout {
        let mut layout = FlowLayout::default();

        for line_item in line_items {
            let mut previous_tail: Option<String> = None;
            for process in &line_item.processes {
                let row = layout.row_count;
                layout.row_count += 1;

                let header_id = self.place_process(&mut layout, line_item.line_item_id, process, row);

                if self.config.link_processes {
                    if let Some(tail) = previous_tail.take() {
                        layout.edges.push(edge(&tail, &header_id, EdgeLine::Dotted, None, neutral_edge_color()));
                    }
                    previous_tail = process
                        .operations
                        .last()
                        .map(|operation| operation_node_id(line_item.line_item_id, operation));
                }
            }
        }

        layout.canvas_height = self.canvas_height(layout.row_count);
        debug!(
            rows = layout.row_count,
            nodes = layout.nodes.len(),
            edges = layout.edges.len(),
            "Flow layout built"
        );
        layout
    }

    /// Lay out a single list of grouped processes
    pub fn build_process_layout(&self, line_item_id: LineItemId, processes: Vec<GroupedProcess>) -> FlowLayout {
        self.build_layout(&[LineItemGroups {
            line_item_id,
            product_name: None,
            processes,
        }])
    }

    pub fn canvas_height(&self, rows: usize) -> f64 {
        let content = rows as f64 * self.config.row_height + self.config.canvas_margin;
        content.max(self.config.min_canvas_height)
    }

    /// Place one process row; returns the header node id
    fn place_process(
        &self,
        layout: &mut FlowLayout,
        line_item_id: LineItemId,
        process: &GroupedProcess,
        row: usize,
    ) -> String {
        let y = self.config.top_margin + row as f64 * self.config.row_height;
        let header_id = format!("process-{line_item_id}-{}", process.key);

        layout.nodes.push(GraphNode {
            id: header_id.clone(),
            label: process.name.clone(),
            kind: NodeKind::ProcessHeader,
            position: Position {
                x: self.config.header_x,
                y,
            },
            size: Size {
                width: self.config.header_width,
                height: self.config.header_height,
            },
            shape: NodeShape::RoundedRectangle,
            style: header_node_style(),
            status: None,
            tooltip: Some(format!("{} operation(s)", process.operations.len())),
        });

        let mut previous: Option<String> = None;
        for (column, operation) in process.operations.iter().enumerate() {
            let node_id = operation_node_id(line_item_id, operation);
            layout.nodes.push(self.operation_node(operation, &node_id, column, y));

            let link = match previous.as_deref() {
                None => edge(&header_id, &node_id, EdgeLine::Dashed, None, neutral_edge_color()),
                Some(source) => edge(
                    source,
                    &node_id,
                    EdgeLine::Solid,
                    Some(ArrowHead::Triangle),
                    status_style(Some(operation.status)).edge_color(),
                ),
            };
            layout.edges.push(link);
            previous = Some(node_id);
        }

        header_id
    }

    fn operation_node(&self, operation: &Operation, node_id: &str, column: usize, y: f64) -> GraphNode {
        let tooltip = match &operation.code {
            Some(code) => format!("{} ({code})\nStatus: {}", operation.name, operation.status),
            None => format!("{}\nStatus: {}", operation.name, operation.status),
        };

        GraphNode {
            id: node_id.to_string(),
            label: operation.name.clone(),
            kind: NodeKind::Operation,
            position: Position {
                x: self.config.first_operation_x + column as f64 * self.config.column_width,
                y,
            },
            size: Size {
                width: self.config.node_width,
                height: self.config.node_height,
            },
            shape: NodeShape::Rectangle,
            style: operation_node_style(operation.status),
            status: Some(operation.status),
            tooltip: Some(tooltip),
        }
    }
}

/// Operation ids are only unique within a line item
fn operation_node_id(line_item_id: LineItemId, operation: &Operation) -> String {
    format!("op-{line_item_id}-{}", operation.id)
}

fn edge(source: &str, target: &str, line: EdgeLine, arrow: Option<ArrowHead>, color: &str) -> GraphEdge {
    GraphEdge {
        id: format!("e-{source}-{target}"),
        source: source.to_string(),
        target: target.to_string(),
        line,
        arrow,
        color: color.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::grouper::{group_by_process, ProcessKey};
    use crate::flow::style::{AMBER, BLUE};
    use crate::models::OperationStatus;

    fn process(id: i64, statuses: &[OperationStatus]) -> GroupedProcess {
        let operations: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(index, status)| {
                Operation::new(id * 10 + index as i64, format!("Op {index}"), *status)
                    .in_process(id, format!("Process {id}"))
                    .with_sequence(index as i32 + 1)
            })
            .collect();
        group_by_process(&operations).remove(0)
    }

    #[test]
    fn test_single_process_nodes_and_edges() {
        let engine = FlowLayoutEngine::default();
        let layout = engine.build_process_layout(
            1,
            vec![process(
                1,
                &[OperationStatus::Confirmed, OperationStatus::InProgress, OperationStatus::Ready],
            )],
        );

        assert_eq!(layout.nodes.len(), 4);
        assert_eq!(layout.edges.len(), 3);

        let header_links: Vec<_> = layout.edges.iter().filter(|e| e.line == EdgeLine::Dashed).collect();
        assert_eq!(header_links.len(), 1);
        assert_eq!(header_links[0].source, "process-1-p1");
        assert_eq!(header_links[0].target, "op-1-10");

        let incoming: Vec<_> = layout.incoming_edges("op-1-12").collect();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].color, AMBER.edge_color());
        assert_ne!(incoming[0].color, BLUE.edge_color());
        assert_eq!(incoming[0].arrow, Some(ArrowHead::Triangle));
    }

    #[test]
    fn test_single_operation_process_still_has_header_link() {
        let layout = FlowLayoutEngine::default()
            .build_process_layout(1, vec![process(2, &[OperationStatus::NotStarted])]);
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(layout.edges.len(), 1);
        assert_eq!(layout.edges[0].line, EdgeLine::Dashed);
    }

    #[test]
    fn test_rows_and_columns() {
        let config = LayoutConfig::default();
        let layout = FlowLayoutEngine::new(config.clone()).build_process_layout(
            1,
            vec![
                process(1, &[OperationStatus::Ready, OperationStatus::Ready]),
                process(2, &[OperationStatus::Ready]),
            ],
        );

        let header = layout.node("process-1-p2").unwrap();
        assert_eq!(header.position.x, config.header_x);
        assert_eq!(header.position.y, config.top_margin + config.row_height);

        let second = layout.node("op-1-11").unwrap();
        assert_eq!(second.position.x, config.first_operation_x + config.column_width);
        assert_eq!(second.position.y, config.top_margin);
    }

    #[test]
    fn test_no_edges_between_processes_by_default() {
        let layout = FlowLayoutEngine::default().build_process_layout(
            1,
            vec![
                process(1, &[OperationStatus::Ready, OperationStatus::Ready]),
                process(2, &[OperationStatus::Ready]),
            ],
        );
        assert_eq!(layout.edges.len(), 3);
        assert!(layout.edges.iter().all(|e| e.line != EdgeLine::Dotted));
    }

    #[test]
    fn test_linked_processes_within_line_item() {
        let engine = FlowLayoutEngine::new(LayoutConfig {
            link_processes: true,
            ..LayoutConfig::default()
        });
        let line_items = vec![
            LineItemGroups {
                line_item_id: 1,
                product_name: None,
                processes: vec![
                    process(1, &[OperationStatus::Ready, OperationStatus::Ready]),
                    process(2, &[OperationStatus::Ready]),
                ],
            },
            LineItemGroups {
                line_item_id: 2,
                product_name: None,
                processes: vec![process(3, &[OperationStatus::Ready])],
            },
        ];

        let layout = engine.build_layout(&line_items);
        let links: Vec<_> = layout.edges.iter().filter(|e| e.line == EdgeLine::Dotted).collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].source, "op-1-11");
        assert_eq!(links[0].target, "process-1-p2");
    }

    #[test]
    fn test_same_operation_id_in_two_line_items() {
        let line_items: Vec<_> = [1, 2]
            .into_iter()
            .map(|line_item_id| LineItemGroups {
                line_item_id,
                product_name: None,
                processes: vec![process(1, &[OperationStatus::Ready, OperationStatus::Completed])],
            })
            .collect();

        let layout = FlowLayoutEngine::default().build_layout(&line_items);

        let first = layout.node("op-1-10").unwrap();
        let second = layout.node("op-2-10").unwrap();
        assert_ne!(first.position.y, second.position.y);
        assert_eq!(layout.incoming_edges("op-2-11").next().unwrap().source, "op-2-10");
        assert_eq!(layout.incoming_edges("op-1-11").count(), 1);

        let mut ids: Vec<_> = layout.nodes.iter().map(|node| node.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), layout.nodes.len());
    }

    #[test]
    fn test_canvas_height() {
        let engine = FlowLayoutEngine::default();
        assert_eq!(engine.canvas_height(0), 400.0);
        assert_eq!(engine.canvas_height(2), 400.0);
        assert_eq!(engine.canvas_height(5), 700.0);
    }

    #[test]
    fn test_default_group_header_id() {
        let operations = vec![Operation::new(5, "Pack", OperationStatus::Ready)];
        let groups = group_by_process(&operations);
        assert_eq!(groups[0].key, ProcessKey::Default);

        let layout = FlowLayoutEngine::default().build_process_layout(9, groups);
        assert!(layout.node("process-9-default").is_some());
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let engine = FlowLayoutEngine::default();
        let groups = vec![process(1, &[OperationStatus::Blocked, OperationStatus::OnHold])];
        assert_eq!(
            engine.build_process_layout(1, groups.clone()),
            engine.build_process_layout(1, groups)
        );
    }
}
