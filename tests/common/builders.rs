use std::sync::Arc;

use mesflow_core::client::InMemoryRoutingStore;
use mesflow_core::models::{
    LineItem, Operation, OperationStatus, OperationTemplateSummary, Order, PersistedStep, Process,
    StepDraft,
};

/// In-memory store offering two processes and one operation template
pub fn store_with_reference_data() -> Arc<InMemoryRoutingStore> {
    Arc::new(
        InMemoryRoutingStore::new()
            .with_processes(vec![
                Process {
                    id: 1,
                    name: "Machining".to_string(),
                    active: true,
                },
                Process {
                    id: 2,
                    name: "Assembly".to_string(),
                    active: true,
                },
            ])
            .with_templates(vec![OperationTemplateSummary {
                id: 50,
                name: "Final inspection".to_string(),
                operation_type: "QUALITY".to_string(),
                operation_code: Some("QC-01".to_string()),
                description: Some("Dimensional check".to_string()),
                estimated_duration_minutes: Some(20),
            }]),
    )
}

pub fn draft(name: &str) -> StepDraft {
    StepDraft::operation(name, "MACHINING")
}

pub fn persisted(id: i64, sequence_number: i32, name: &str) -> PersistedStep {
    PersistedStep {
        id,
        sequence_number,
        draft: draft(name),
        execution_status: None,
    }
}

pub fn operation(
    id: i64,
    process: Option<(i64, &str)>,
    sequence: Option<i32>,
    name: &str,
    status: OperationStatus,
) -> Operation {
    let mut operation = Operation::new(id, name, status);
    if let Some((process_id, process_name)) = process {
        operation = operation.in_process(process_id, process_name);
    }
    operation.sequence_number = sequence;
    operation
}

/// Order with two line items: a two-process gear and a single-process shaft
pub fn sample_order() -> Order {
    Order {
        id: 900,
        order_number: Some("SO-900".to_string()),
        line_items: vec![
            LineItem {
                id: 1,
                product_name: Some("Gear".to_string()),
                operations: vec![
                    operation(11, Some((1, "Cutting")), Some(2), "Hob", OperationStatus::InProgress),
                    operation(10, Some((1, "Cutting")), Some(1), "Blank", OperationStatus::Completed),
                    operation(12, Some((2, "Heat treatment")), Some(1), "Harden", OperationStatus::NotStarted),
                ],
            },
            LineItem {
                id: 2,
                product_name: Some("Shaft".to_string()),
                operations: vec![operation(20, None, None, "Saw", OperationStatus::Blocked)],
            },
        ],
    }
}
