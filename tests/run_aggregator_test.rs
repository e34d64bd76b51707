mod common;

use common::*;
use shopfloor_core::models::{LogicalItemKey, RunKey};
use shopfloor_core::orchestration::ReleaseRequest;
use shopfloor_core::store::RunStore;
use shopfloor_core::{Actor, ItemStatus};

fn operator() -> Actor {
    Actor::new("op-2", "Lee")
}

/// Release `count` rows of one batch at the cutting station only.
async fn release_batch(
    engine: &shopfloor_core::orchestration::ProductionEngine,
    order_id: &str,
    count: usize,
) -> Vec<shopfloor_core::models::ProductionItem> {
    let mut items = Vec::new();
    for row in 0..count {
        let released = engine
            .release_row(ReleaseRequest {
                key: LogicalItemKey::new(order_id, "B1", format!("row-{row}")),
                item_name: format!("panel {row}"),
                qty: 1,
                material: None,
                stations: vec![CUTTING],
            })
            .await
            .unwrap();
        items.extend(released);
    }
    items
}

#[tokio::test]
async fn in_progress_governs_over_queued_and_done() {
    let (_, engine) = engine_fixture();
    let items = release_batch(&engine, "MO-1", 3).await;
    let run = RunKey::new("MO-1", "B1", CUTTING);
    let op = operator();

    assert_eq!(engine.get_run_status(&run).await.unwrap(), ItemStatus::Queued);

    // First item done, second in progress, third still queued.
    engine.start(items[0].id, &op).await.unwrap();
    engine.mark_done(items[0].id, &op).await.unwrap();
    engine.start(items[1].id, &op).await.unwrap();

    assert_eq!(
        engine.get_run_status(&run).await.unwrap(),
        ItemStatus::InProgress
    );
}

#[tokio::test]
async fn stored_run_matches_derivation_after_each_transition() {
    let (store, engine) = engine_fixture();
    let items = release_batch(&engine, "MO-2", 2).await;
    let run = RunKey::new("MO-2", "B1", CUTTING);
    let op = operator();

    engine.start(items[0].id, &op).await.unwrap();
    let stored = store.get_run(&run).await.unwrap().expect("run stored");
    assert_eq!(stored.status, ItemStatus::InProgress);
    assert_eq!(stored.status, engine.get_run_status(&run).await.unwrap());
    let run_started = stored.started_at.expect("run started_at stamped");

    engine.mark_done(items[0].id, &op).await.unwrap();
    engine.start(items[1].id, &op).await.unwrap();
    engine.mark_done(items[1].id, &op).await.unwrap();

    let done = store.get_run(&run).await.unwrap().unwrap();
    assert_eq!(done.status, ItemStatus::Done);
    assert_eq!(done.status, engine.get_run_status(&run).await.unwrap());
    // started_at was stamped once and kept.
    assert_eq!(done.started_at, Some(run_started));
    assert!(done.done_at.is_some());

    // Run duration is the sum of constituent item durations.
    use shopfloor_core::store::ItemStore;
    let total: i64 = store
        .list_items_by_run(&run)
        .await
        .unwrap()
        .iter()
        .filter_map(|item| item.duration_minutes)
        .sum();
    assert_eq!(done.duration_minutes, Some(total));
}

#[tokio::test]
async fn blocked_run_surfaces_when_nothing_else_moves() {
    let (_, engine) = engine_fixture();
    let items = release_batch(&engine, "MO-3", 1).await;
    let run = RunKey::new("MO-3", "B1", CUTTING);
    let op = operator();

    engine
        .mark_blocked(items[0].id, "saw down", None, &op)
        .await
        .unwrap();
    assert_eq!(
        engine.get_run_status(&run).await.unwrap(),
        ItemStatus::Blocked
    );
}

#[tokio::test]
async fn empty_run_reads_as_queued() {
    let (_, engine) = engine_fixture();
    let run = RunKey::new("MO-none", "B1", CUTTING);
    assert_eq!(engine.get_run_status(&run).await.unwrap(), ItemStatus::Queued);
}
