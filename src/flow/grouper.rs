//! # Process Grouper
//!
//! Groups an order's flat operation list by process. Grouping never fails:
//! operations without a process land in the default group and operations
//! without a sequence number sort as 0.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::constants::{DEFAULT_PROCESS_KEY, DEFAULT_PROCESS_NAME};
use crate::models::{LineItemId, Operation, Order, ProcessId};

/// Grouping key of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKey {
    Process(ProcessId),
    /// Operations that carry no process identity
    Default,
}

impl ProcessKey {
    pub fn of(operation: &Operation) -> Self {
        operation.process_id.map_or(Self::Default, Self::Process)
    }
}

impl fmt::Display for ProcessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process(id) => write!(f, "p{id}"),
            Self::Default => f.write_str(DEFAULT_PROCESS_KEY),
        }
    }
}

/// Operations of one process, in sequence order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedProcess {
    pub key: ProcessKey,
    pub name: String,
    pub operations: Vec<Operation>,
}

/// Grouped processes of one order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemGroups {
    pub line_item_id: LineItemId,
    pub product_name: Option<String>,
    pub processes: Vec<GroupedProcess>,
}

/// Group operations by process
///
/// Groups appear in the order their key was first seen. Within a group,
/// operations are stably sorted by sequence number.
pub fn group_by_process(operations: &[Operation]) -> Vec<GroupedProcess> {
    let mut groups: Vec<GroupedProcess> = Vec::new();
    let mut positions: HashMap<ProcessKey, usize> = HashMap::new();

    for operation in operations {
        let key = ProcessKey::of(operation);
        let position = *positions.entry(key).or_insert_with(|| {
            groups.push(GroupedProcess {
                key,
                name: String::new(),
                operations: Vec::new(),
            });
            groups.len() - 1
        });
        groups[position].operations.push(operation.clone());
    }

    for group in &mut groups {
        group.name = group_name(group.key, &group.operations);
        group.operations.sort_by_key(|operation| operation.sequence_number.unwrap_or(0));
    }
    groups
}

/// Group every line item of an order, in line item order
pub fn group_order(order: &Order) -> Vec<LineItemGroups> {
    order
        .line_items
        .iter()
        .map(|line_item| LineItemGroups {
            line_item_id: line_item.id,
            product_name: line_item.product_name.clone(),
            processes: group_by_process(&line_item.operations),
        })
        .collect()
}

/// First non-blank process name carried by the group's operations
fn group_name(key: ProcessKey, operations: &[Operation]) -> String {
    let ProcessKey::Process(id) = key else {
        return DEFAULT_PROCESS_NAME.to_string();
    };
    operations
        .iter()
        .filter_map(|operation| operation.process_name.as_deref())
        .find(|name| !name.trim().is_empty())
        .map_or_else(|| format!("Process {id}"), str::to_string)
}
