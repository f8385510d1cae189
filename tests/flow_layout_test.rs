//! Flow Layout Integration Tests
//!
//! Grouping, layout and export of order operations.

mod common;

use std::sync::Arc;

use common::*;
use mesflow_core::client::InMemoryRoutingStore;
use mesflow_core::flow::style::{AMBER, BLUE, NEUTRAL};
use mesflow_core::flow::{
    group_by_process, group_order, ExportFormat, ExportSurface, FlowDiagramService, FlowLayoutEngine,
    ProcessKey, RenderSurface,
};
use mesflow_core::models::{EdgeLine, FlowLayout, NodeKind, OperationStatus};
use mesflow_core::LayoutConfig;

#[derive(Default)]
struct RecordingSurface {
    layouts: Vec<FlowLayout>,
}

impl RenderSurface for RecordingSurface {
    fn render(&mut self, layout: &FlowLayout) {
        self.layouts.push(layout.clone());
    }
}

#[test]
fn operations_group_by_process_in_sequence_order() {
    let operations = vec![
        operation(1, Some((7, "Cutting")), Some(2), "A", OperationStatus::Ready),
        operation(2, Some((8, "Welding")), Some(1), "B", OperationStatus::Ready),
        operation(3, Some((7, "Cutting")), Some(1), "C", OperationStatus::Ready),
    ];

    let groups = group_by_process(&operations);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key, ProcessKey::Process(7));
    assert_eq!(groups[0].name, "Cutting");
    assert_eq!(
        groups[0].operations.iter().map(|op| op.id).collect::<Vec<_>>(),
        vec![3, 1]
    );
    assert_eq!(groups[1].key, ProcessKey::Process(8));
    assert_eq!(groups[1].operations[0].id, 2);
}

#[test]
fn single_process_layout_chains_operations() {
    let operations = vec![
        operation(1, Some((7, "Cutting")), Some(1), "Blank", OperationStatus::Confirmed),
        operation(2, Some((7, "Cutting")), Some(2), "Rough", OperationStatus::InProgress),
        operation(3, Some((7, "Cutting")), Some(3), "Finish", OperationStatus::Ready),
    ];
    let engine = FlowLayoutEngine::default();

    let layout = engine.build_process_layout(1, group_by_process(&operations));

    assert_eq!(layout.nodes.len(), 4);
    assert_eq!(layout.edges.len(), 3);

    let header_edge = layout.incoming_edges("op-1-1").next().unwrap();
    assert_eq!(header_edge.source, "process-1-p7");
    assert_eq!(header_edge.line, EdgeLine::Dashed);
    assert!(header_edge.arrow.is_none());
    assert_eq!(header_edge.color, NEUTRAL.border);

    let into_second = layout.incoming_edges("op-1-2").next().unwrap();
    assert_eq!(into_second.color, BLUE.border);
    let into_third = layout.incoming_edges("op-1-3").next().unwrap();
    assert_eq!(into_third.source, "op-1-2");
    assert_eq!(into_third.line, EdgeLine::Solid);
    assert_eq!(into_third.color, AMBER.border);
    assert_eq!(layout.node("op-1-3").unwrap().style.fill, AMBER.fill);
}

#[test]
fn order_layout_gives_each_process_a_row() {
    let engine = FlowLayoutEngine::default();
    let config = engine.config().clone();

    let layout = engine.build_layout(&group_order(&sample_order()));

    assert_eq!(layout.row_count, 3);
    assert_eq!(layout.canvas_height, engine.canvas_height(3));
    assert_eq!(
        layout
            .nodes
            .iter()
            .filter(|node| node.kind == NodeKind::ProcessHeader)
            .map(|node| node.label.as_str())
            .collect::<Vec<_>>(),
        vec!["Cutting", "Heat treatment", mesflow_core::constants::DEFAULT_PROCESS_NAME]
    );
    assert_eq!(layout.operation_nodes().count(), 4);
    assert_eq!(layout.edges.len(), 4);

    let header = layout.node("process-1-p1").unwrap();
    let blank = layout.node("op-1-10").unwrap();
    let hob = layout.node("op-1-11").unwrap();
    assert_eq!(blank.position.y, header.position.y);
    assert_eq!(blank.position.x, config.first_operation_x);
    assert_eq!(hob.position.x, config.first_operation_x + config.column_width);

    let heat = layout.node("process-1-p2").unwrap();
    assert_eq!(heat.position.y, header.position.y + config.row_height);
    assert!(layout.node("process-2-default").is_some());
}

#[test]
fn linked_processes_add_dotted_edges_within_a_line_item() {
    let engine = FlowLayoutEngine::new(LayoutConfig {
        link_processes: true,
        ..LayoutConfig::default()
    });

    let layout = engine.build_layout(&group_order(&sample_order()));

    let dotted: Vec<_> = layout
        .edges
        .iter()
        .filter(|edge| edge.line == EdgeLine::Dotted)
        .collect();
    assert_eq!(dotted.len(), 1);
    assert_eq!(dotted[0].source, "op-1-11");
    assert_eq!(dotted[0].target, "process-1-p2");
}

#[test]
fn mermaid_export_carries_edges_and_styles() {
    let layout = FlowLayoutEngine::default().build_layout(&group_order(&sample_order()));
    let mut surface = ExportSurface::new(ExportFormat::Mermaid);

    surface.render(&layout);

    let mermaid = surface.rendered().unwrap();
    assert!(mermaid.starts_with("flowchart LR\n"));
    assert!(mermaid.contains("process_1_p1 -.- op_1_10"));
    assert!(mermaid.contains("op_1_10 --> op_1_11"));
    assert!(mermaid.contains(&format!("style op_1_11 fill:{}", BLUE.fill)));
    assert_eq!(mermaid, layout.to_mermaid());
}

#[test]
fn json_export_is_parseable() {
    let layout = FlowLayoutEngine::default().build_layout(&group_order(&sample_order()));
    let mut surface = ExportSurface::new("json".parse().unwrap());

    surface.render(&layout);

    let value: serde_json::Value = serde_json::from_str(surface.rendered().unwrap()).unwrap();
    assert_eq!(value["nodes"].as_array().unwrap().len(), 7);
    assert_eq!(value["row_count"], 3);
}

#[tokio::test]
async fn service_renders_loaded_order() {
    let store = Arc::new(InMemoryRoutingStore::new());
    store.insert_order(sample_order());
    let service = FlowDiagramService::new(store.clone(), LayoutConfig::default());
    let mut surface = RecordingSurface::default();

    let layout = service.render_order(900, &mut surface).await.unwrap();

    assert_eq!(surface.layouts, vec![layout.clone()]);
    let stats = layout.get_stats();
    assert_eq!(stats.operation_count, 4);
    assert_eq!(stats.completion_percentage, 25.0);
}

#[tokio::test]
async fn service_reports_missing_order_without_rendering() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let service = FlowDiagramService::new(store, LayoutConfig::default());
    let mut surface = RecordingSurface::default();

    assert!(service.render_order(404, &mut surface).await.is_err());
    assert!(surface.layouts.is_empty());
}

#[tokio::test]
async fn each_build_reflects_current_order_state() {
    let store = Arc::new(InMemoryRoutingStore::new());
    store.insert_order(sample_order());
    let service = FlowDiagramService::new(store.clone(), LayoutConfig::default());
    let before = service.build_for_order(900).await.unwrap();

    let mut order = sample_order();
    order.line_items[0].operations[2].status = OperationStatus::Ready;
    store.insert_order(order);
    let after = service.build_for_order(900).await.unwrap();

    assert_eq!(before.node("op-1-12").unwrap().style.fill, NEUTRAL.fill);
    assert_eq!(after.node("op-1-12").unwrap().style.fill, AMBER.fill);
}
