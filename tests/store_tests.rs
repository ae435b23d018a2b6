//! Integration tests for the SQLite store backend.

use std::time::Duration;
use subtask_tree::{NewSubtask, SqliteStore, SubtaskManager, SubtaskPatch, SubtaskStore};

/// Helper to create a fresh in-memory store for testing.
fn setup_store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("Failed to create in-memory store")
}

fn new_subtask(task_id: &str, parent_id: Option<&str>, title: &str, position: i64) -> NewSubtask {
    NewSubtask {
        task_id: task_id.to_string(),
        parent_id: parent_id.map(str::to_string),
        title: title.to_string(),
        position,
    }
}

#[tokio::test]
async fn insert_assigns_id_and_timestamps() {
    let store = setup_store();

    let subtask = store
        .insert(new_subtask("t1", None, "write tests", 0))
        .await
        .unwrap();

    assert!(!subtask.id.is_empty());
    assert!(!subtask.is_completed);
    assert!(subtask.created_at > 0);
    assert_eq!(subtask.updated_at, subtask.created_at);
}

#[tokio::test]
async fn list_scopes_to_task_and_orders_by_position() {
    let store = setup_store();
    store.insert(new_subtask("t1", None, "third", 2)).await.unwrap();
    store.insert(new_subtask("t1", None, "first", 0)).await.unwrap();
    store.insert(new_subtask("t2", None, "other task", 0)).await.unwrap();
    store.insert(new_subtask("t1", None, "second", 1)).await.unwrap();

    let titles: Vec<String> = store
        .list("t1")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();

    assert_eq!(titles, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn list_breaks_position_ties_by_created_at() {
    let store = setup_store();
    store.insert(new_subtask("t1", None, "older", 0)).await.unwrap();
    // created_at has millisecond resolution; space the inserts out
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.insert(new_subtask("t1", None, "newer", 0)).await.unwrap();

    let titles: Vec<String> = store
        .list("t1")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();

    assert_eq!(titles, vec!["older", "newer"]);
}

#[tokio::test]
async fn update_patches_only_provided_fields() {
    let store = setup_store();
    let subtask = store
        .insert(new_subtask("t1", None, "original", 3))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = store
        .update(&subtask.id, SubtaskPatch::title("renamed"))
        .await
        .unwrap();

    assert_eq!(updated.title, "renamed");
    assert!(!updated.is_completed);
    assert_eq!(updated.position, 3);
    assert!(updated.updated_at > updated.created_at);
}

#[tokio::test]
async fn update_toggles_completion_both_ways() {
    let store = setup_store();
    let subtask = store.insert(new_subtask("t1", None, "toggle", 0)).await.unwrap();

    let done = store
        .update(&subtask.id, SubtaskPatch::completed(true))
        .await
        .unwrap();
    assert!(done.is_completed);

    let undone = store
        .update(&subtask.id, SubtaskPatch::completed(false))
        .await
        .unwrap();
    assert!(!undone.is_completed);
}

#[tokio::test]
async fn update_unknown_id_is_an_error() {
    let store = setup_store();

    let result = store.update("ghost", SubtaskPatch::completed(true)).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn update_positions_writes_every_row() {
    let store = setup_store();
    let a = store.insert(new_subtask("t1", None, "a", 0)).await.unwrap();
    let b = store.insert(new_subtask("t1", None, "b", 1)).await.unwrap();
    let c = store.insert(new_subtask("t1", None, "c", 2)).await.unwrap();

    store
        .update_positions(&[(b.id.clone(), 0), (a.id.clone(), 1), (c.id.clone(), 2)])
        .await
        .unwrap();

    let order: Vec<String> = store
        .list("t1")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(order, vec!["b", "a", "c"]);
}

#[tokio::test]
async fn delete_removes_only_the_named_row() {
    let store = setup_store();
    let parent = store.insert(new_subtask("t1", None, "parent", 0)).await.unwrap();
    store
        .insert(new_subtask("t1", Some(&parent.id), "kid", 0))
        .await
        .unwrap();

    store.delete(&parent.id).await.unwrap();

    let remaining = store.list("t1").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "kid");
    // The surviving child still points at the deleted parent.
    assert_eq!(remaining[0].parent_id.as_deref(), Some(parent.id.as_str()));
}

#[tokio::test]
async fn delete_unknown_id_is_an_error() {
    let store = setup_store();

    assert!(store.delete("ghost").await.is_err());
}

#[tokio::test]
async fn open_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subtasks.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.insert(new_subtask("t1", None, "durable", 0)).await.unwrap();
    }

    let reopened = SqliteStore::open(&path).unwrap();
    let rows = reopened.list("t1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "durable");
}

#[tokio::test]
async fn manager_over_sqlite_round_trip() {
    let mut manager = SubtaskManager::new(setup_store());
    manager.load(Some("t1")).await;

    let root = manager.add("pack bags", None).await.unwrap();
    let kid = manager.add("passports", Some(&root.id)).await.unwrap();
    manager.add("book taxi", None).await.unwrap();

    assert_eq!(manager.flat().len(), 3);
    assert_eq!(manager.tree().len(), 2);
    assert_eq!(manager.tree()[0].children[0].subtask.id, kid.id);

    manager.update(&kid.id, SubtaskPatch::completed(true)).await.unwrap();
    assert!(manager.flat().iter().any(|s| s.id == kid.id && s.is_completed));

    // Deleting the parent leaves the child orphaned at root level.
    manager.delete(&root.id).await.unwrap();
    let roots: Vec<&str> = manager.tree().iter().map(|n| n.subtask.id.as_str()).collect();
    assert!(roots.contains(&kid.id.as_str()));
}
