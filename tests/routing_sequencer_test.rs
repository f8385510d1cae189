//! Routing Sequencer Integration Tests
//!
//! Step list ordering and remote synchronization against the in-memory store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use mesflow_core::client::{InMemoryRoutingStore, RoutingStore, StoreCall, StoreOperation};
use mesflow_core::constants::events;
use mesflow_core::models::{RoutingHeader, RoutingId};
use mesflow_core::routing::{AlwaysConfirm, DeleteOutcome, MoveOutcome, OrderSync, RoutingSequencer};
use mesflow_core::{EventPublisher, RoutingError};

async fn routing_with_steps(store: &Arc<InMemoryRoutingStore>, names: &[&str]) -> (RoutingId, RoutingSequencer) {
    let routing = store
        .create_routing(&RoutingHeader::new("Housing", 1))
        .await
        .unwrap();
    let sequencer = RoutingSequencer::new(Some(routing.id), store.clone());
    for name in names {
        sequencer.add_step(draft(name)).await.unwrap();
    }
    store.clear_calls();
    (routing.id, sequencer)
}

fn names(sequencer: &RoutingSequencer) -> Vec<String> {
    sequencer.steps().iter().map(|s| s.draft.display_name()).collect()
}

#[tokio::test]
async fn reorder_of_persisted_steps_sends_one_call_in_new_order() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let (routing_id, sequencer) = routing_with_steps(&store, &["Saw", "Drill"]).await;
    let before: Vec<_> = sequencer.steps().iter().map(|s| s.remote_id.unwrap()).collect();

    sequencer.move_up(1).await.unwrap();

    assert_eq!(
        store.calls(),
        vec![StoreCall::ReorderSteps {
            routing_id,
            ordered_step_ids: vec![before[1], before[0]],
        }]
    );
}

#[tokio::test]
async fn reorder_with_unpersisted_step_sends_nothing() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_, sequencer) = routing_with_steps(&store, &["Saw"]).await;
    store.fail_next(StoreOperation::CreateStep, None);
    assert!(sequencer.add_step(draft("Drill")).await.is_err());
    store.clear_calls();

    let outcome = sequencer.move_down(0).await.unwrap();

    assert_eq!(outcome, MoveOutcome::Moved { sync: OrderSync::Deferred });
    assert!(store.calls_of(StoreOperation::ReorderSteps).is_empty());
    assert_eq!(names(&sequencer), vec!["Drill", "Saw"]);
}

#[tokio::test]
async fn local_routing_never_calls_the_store() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let sequencer = RoutingSequencer::new(None, store.clone());

    sequencer.add_step(draft("Saw")).await.unwrap();
    sequencer.add_step(draft("Drill")).await.unwrap();
    sequencer.edit_step(0, draft("Band saw")).await.unwrap();
    assert_eq!(
        sequencer.move_down(0).await.unwrap(),
        MoveOutcome::Moved { sync: OrderSync::LocalOnly }
    );
    sequencer.delete_step(1, &AlwaysConfirm).await.unwrap();

    assert!(store.calls().is_empty());
    assert_eq!(names(&sequencer), vec!["Drill"]);
}

#[tokio::test]
async fn mandatory_step_survives_delete_anywhere_in_list() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let sequencer = RoutingSequencer::new(None, store);
    sequencer.add_step(draft("Inspect").mandatory()).await.unwrap();
    sequencer.add_step(draft("Saw")).await.unwrap();
    sequencer.add_step(draft("Release").mandatory()).await.unwrap();
    let before = sequencer.steps();

    for index in [0, 2] {
        let error = sequencer.delete_step(index, &AlwaysConfirm).await.unwrap_err();
        assert!(matches!(error, RoutingError::ProtectedStep { .. }));
        assert_eq!(sequencer.steps(), before);
    }
}

#[tokio::test]
async fn confirmation_gate_sees_the_step() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let sequencer = RoutingSequencer::new(None, store);
    sequencer.add_step(draft("Saw")).await.unwrap();
    sequencer.add_step(draft("Drill")).await.unwrap();

    let seen = parking_lot::Mutex::new(Vec::new());
    let gate = |step: &mesflow_core::models::RoutingStep| {
        seen.lock().push(step.draft.display_name());
        true
    };
    let outcome = sequencer.delete_step(1, &gate).await.unwrap();

    assert!(matches!(outcome, DeleteOutcome::Removed(_)));
    assert_eq!(*seen.lock(), vec!["Drill".to_string()]);
}

#[tokio::test]
async fn delete_waits_for_store_before_removing() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let (routing_id, sequencer) = routing_with_steps(&store, &["Saw", "Drill", "Tap"]).await;
    store.fail_next(StoreOperation::DeleteStep, None);
    let before = sequencer.steps();

    let error = sequencer.delete_step(1, &AlwaysConfirm).await.unwrap_err();
    assert_eq!(error.user_message(), mesflow_core::error::GENERIC_REMOTE_FAILURE_MESSAGE);
    assert_eq!(sequencer.steps(), before);
    assert_eq!(store.stored_steps(routing_id).len(), 3);

    sequencer.delete_step(1, &AlwaysConfirm).await.unwrap();
    assert_eq!(names(&sequencer), vec!["Saw", "Tap"]);
    assert_eq!(
        sequencer.steps().iter().map(|s| s.sequence_number).collect::<Vec<_>>(),
        vec![1, 2]
    );
    let stored: Vec<_> = store
        .stored_steps(routing_id)
        .iter()
        .map(|s| (s.draft.display_name(), s.sequence_number))
        .collect();
    assert_eq!(stored, vec![("Saw".to_string(), 1), ("Tap".to_string(), 2)]);
    assert!(store.calls_of(StoreOperation::ReorderSteps).is_empty());
}

#[tokio::test]
async fn failed_update_keeps_local_edit() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let (routing_id, sequencer) = routing_with_steps(&store, &["Saw"]).await;
    store.fail_next(StoreOperation::UpdateStep, Some("locked by an active order"));

    let error = sequencer.edit_step(0, draft("Band saw")).await.unwrap_err();

    assert_eq!(error.user_message(), "locked by an active order");
    assert_eq!(names(&sequencer), vec!["Band saw"]);
    assert_eq!(
        store.stored_steps(routing_id)[0].draft.operation_name.as_deref(),
        Some("Saw")
    );
}

#[tokio::test]
async fn create_responses_arriving_out_of_order_backfill_by_key() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let (routing_id, sequencer) = routing_with_steps(&store, &[]).await;
    store.delay_next(StoreOperation::CreateStep, Duration::from_millis(50));
    store.delay_next(StoreOperation::CreateStep, Duration::from_millis(20));

    let (first, second, third) = tokio::join!(
        sequencer.add_step(draft("Saw")),
        sequencer.add_step(draft("Drill")),
        sequencer.add_step(draft("Tap"))
    );
    first.unwrap();
    second.unwrap();
    third.unwrap();

    let resolved: Vec<_> = store
        .resolved_calls()
        .into_iter()
        .filter_map(|call| match call {
            StoreCall::CreateStep { operation, .. } => Some(operation),
            _ => None,
        })
        .collect();
    assert_eq!(resolved, vec!["Tap", "Drill", "Saw"]);

    for step in sequencer.steps() {
        let stored = store
            .stored_steps(routing_id)
            .into_iter()
            .find(|stored| Some(stored.id) == step.remote_id)
            .unwrap();
        assert_eq!(stored.draft, step.draft);
    }
}

#[tokio::test]
async fn edit_during_pending_create_reaches_the_store() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let (routing_id, sequencer) = routing_with_steps(&store, &[]).await;
    store.delay_next(StoreOperation::CreateStep, Duration::from_millis(30));

    let (added, edited) = tokio::join!(sequencer.add_step(draft("Saw")), async {
        tokio::task::yield_now().await;
        sequencer.edit_step(0, draft("Band saw")).await
    });
    added.unwrap();
    edited.unwrap();

    let stored = store.stored_steps(routing_id);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].draft.operation_name.as_deref(), Some("Band saw"));
}

#[tokio::test]
async fn rapid_reorders_leave_store_on_latest_order() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let (routing_id, sequencer) = routing_with_steps(&store, &["A", "B", "C", "D"]).await;
    store.delay_next(StoreOperation::ReorderSteps, Duration::from_millis(40));
    store.delay_next(StoreOperation::ReorderSteps, Duration::from_millis(10));

    let results = tokio::join!(
        sequencer.move_down(0),
        sequencer.move_down(1),
        sequencer.move_down(2),
        sequencer.move_up(3)
    );
    assert!(results.0.is_ok() && results.1.is_ok() && results.2.is_ok() && results.3.is_ok());

    let local: Vec<_> = sequencer.steps().iter().map(|s| s.remote_id.unwrap()).collect();
    let stored: Vec<_> = store.stored_steps(routing_id).iter().map(|s| s.id).collect();
    assert_eq!(local, stored);
    assert!(store.calls_of(StoreOperation::ReorderSteps).len() < 4);
}

#[tokio::test]
async fn failed_reorder_reports_error_and_resyncs() {
    let store = Arc::new(InMemoryRoutingStore::new());
    let (routing_id, _) = routing_with_steps(&store, &["Saw", "Drill", "Tap"]).await;
    let publisher = EventPublisher::new(32);
    let mut receiver = publisher.subscribe();
    let sequencer = RoutingSequencer::new(Some(routing_id), store.clone()).with_events(publisher);
    sequencer.load_persisted(store.stored_steps(routing_id));
    store.fail_next(StoreOperation::ReorderSteps, Some("routing is locked"));

    let error = sequencer.move_down(0).await.unwrap_err();

    assert_eq!(error.user_message(), "routing is locked");
    assert_eq!(store.calls_of(StoreOperation::LoadRouting).len(), 1);
    assert_eq!(names(&sequencer), vec!["Saw", "Drill", "Tap"]);

    let mut seen = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        seen.push(event.name);
    }
    assert_eq!(
        seen,
        vec![events::STEPS_REORDERED, events::REMOTE_FAILED, events::STEPS_RESYNCED]
    );
}
