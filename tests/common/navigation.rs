use parking_lot::Mutex;
use std::sync::Arc;

use mesflow_core::client::{InMemoryRoutingStore, StoreCall, StoreOperation};
use mesflow_core::models::RoutingId;
use mesflow_core::routing::Navigator;

/// What the store had resolved when the editor navigated away
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRecord {
    pub routing_id: RoutingId,
    pub resolved_calls: Vec<StoreCall>,
}

/// Navigator that snapshots the store's resolved calls at navigation time
pub struct RecordingNavigator {
    store: Arc<InMemoryRoutingStore>,
    pub navigations: Mutex<Vec<NavigationRecord>>,
}

impl RecordingNavigator {
    pub fn new(store: Arc<InMemoryRoutingStore>) -> Self {
        Self {
            store,
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn navigations(&self) -> Vec<NavigationRecord> {
        self.navigations.lock().clone()
    }

    /// Resolved calls of `operation` at the moment of the last navigation
    pub fn resolved_before_navigation(&self, operation: StoreOperation) -> usize {
        self.navigations
            .lock()
            .last()
            .map(|record| {
                record
                    .resolved_calls
                    .iter()
                    .filter(|call| call.operation() == operation)
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_after_save(&self, routing_id: RoutingId) {
        self.navigations.lock().push(NavigationRecord {
            routing_id,
            resolved_calls: self.store.resolved_calls(),
        });
    }
}
