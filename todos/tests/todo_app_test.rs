//! End-to-end tests for the todo list over a real Store.
//!
//! Each test drives the `TodoApp` facade against in-memory storage and a
//! scripted remote collection.

#![allow(clippy::unwrap_used)] // Test code

mod support;

use std::sync::Arc;
use std::time::Duration;
use support::ScriptedApi;
use todo_sync_core::storage::StorageError;
use todo_sync_testing::InMemoryKeyValueStore;
use todos::seed::{SEED_TITLES, title_for};
use todos::storage::TODOS_KEY;
use todos::{Filter, InitPhase, Status, Todo, TodoError};

fn persisted(store: &InMemoryKeyValueStore) -> Vec<Todo> {
    serde_json::from_slice(&store.get_raw(TODOS_KEY).unwrap()).unwrap()
}

#[tokio::test]
async fn empty_storage_is_seeded_with_ten_titled_todos() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(200));
    let app = support::app(&store, &api);

    let items = app.load().await.unwrap();

    assert_eq!(items.len(), 10);
    let ids: Vec<_> = items.iter().map(|t| t.id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    for todo in &items {
        assert_eq!(todo.title, title_for(todo.id));
    }
    assert!(items.iter().any(|t| t.title == SEED_TITLES[0]));

    let state = app.todos().await;
    assert_eq!(state.status, Status::Succeeded);
    assert_eq!(state.phase, InitPhase::Ready);
    assert_eq!(state.error, None);
    assert_eq!(persisted(&store), items);
}

#[tokio::test]
async fn stored_collection_is_adopted_without_fetching() {
    let store = InMemoryKeyValueStore::new();
    let stored = vec![Todo::new(5, "Stored one", false), Todo::new(6, "Stored two", true)];
    store.insert_raw(TODOS_KEY, serde_json::to_vec(&stored).unwrap());
    let api = Arc::new(ScriptedApi::with_items(200));
    let app = support::app(&store, &api);

    assert_eq!(app.load().await.unwrap(), stored);
    assert_eq!(api.fetch_count(), 0);
}

#[tokio::test]
async fn create_then_remove_restores_original_collection() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    let original = app.load().await.unwrap();

    let created = app.create("Buy milk", false).await.unwrap();

    assert!(original.iter().all(|t| t.id != created.id));
    assert_eq!(created.title, "Buy milk");
    assert!(!created.completed);
    let state = app.todos().await;
    assert_eq!(state.count(), 11);
    assert_eq!(state.items.last(), Some(&created));
    assert_eq!(persisted(&store).len(), 11);

    assert_eq!(app.remove(created.id).await.unwrap(), created.id);

    assert_eq!(app.todos().await.items, original);
    assert_eq!(persisted(&store), original);
}

#[tokio::test]
async fn update_replaces_only_the_target() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    let original = app.load().await.unwrap();
    let target = original[3].clone();

    let replacement = Todo {
        title: "Y".to_string(),
        completed: true,
        ..target.clone()
    };
    assert_eq!(app.update(replacement.clone()).await.unwrap(), replacement);

    let items = app.todos().await.items;
    assert_eq!(items.len(), original.len());
    for (before, after) in original.iter().zip(&items) {
        if before.id == target.id {
            assert_eq!(after, &replacement);
        } else {
            assert_eq!(after, before);
        }
    }
    assert_eq!(persisted(&store), items);
}

#[tokio::test]
async fn update_of_unknown_id_is_a_no_op() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    let original = app.load().await.unwrap();

    app.update(Todo::new(424_242, "ghost", true)).await.unwrap();

    assert_eq!(app.todos().await.items, original);
    assert_eq!(persisted(&store), original);
}

#[tokio::test]
async fn removing_twice_succeeds_and_changes_nothing_the_second_time() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    let original = app.load().await.unwrap();
    let id = original[0].id;

    app.remove(id).await.unwrap();
    let after_first = app.todos().await.items;
    app.remove(id).await.unwrap();

    assert_eq!(after_first.len(), 9);
    assert_eq!(app.todos().await.items, after_first);
    assert_eq!(persisted(&store), after_first);
}

#[tokio::test]
async fn reload_restores_collection_after_mutations() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    let original = app.load().await.unwrap();

    let milk = app.create("Buy milk", false).await.unwrap();
    app.create("Walk the dog", true).await.unwrap();
    app.update(milk.toggled()).await.unwrap();
    app.remove(original[2].id).await.unwrap();
    let expected = app.todos().await.items;

    // Fresh process over the same storage
    let reopened = support::app(&store, &api);
    assert_eq!(reopened.load().await.unwrap(), expected);
    assert_eq!(api.fetch_count(), 1);
}

#[tokio::test]
async fn storage_read_failure_fails_load_and_keeps_collection() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    let original = app.load().await.unwrap();

    store.fail_reads(true);
    let error = app.load().await.unwrap_err();

    assert!(matches!(error, TodoError::Storage(StorageError::Unavailable(_))));
    let state = app.todos().await;
    assert_eq!(state.status, Status::Failed);
    assert!(state.error.is_some());
    assert_eq!(state.items, original);
    assert_eq!(state.phase, InitPhase::Ready);
}

#[tokio::test]
async fn first_load_failure_returns_to_empty_phase() {
    let store = InMemoryKeyValueStore::new();
    store.fail_reads(true);
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);

    assert!(app.load().await.is_err());

    let state = app.todos().await;
    assert_eq!(state.status, Status::Failed);
    assert_eq!(state.phase, InitPhase::Empty);
    assert!(state.items.is_empty());
}

#[tokio::test]
async fn network_failure_during_seed_fails_load() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    api.fail_fetch(true);
    let app = support::app(&store, &api);

    let error = app.load().await.unwrap_err();

    assert!(matches!(error, TodoError::Network(_)));
    let state = app.todos().await;
    assert_eq!(state.status, Status::Failed);
    assert_eq!(state.phase, InitPhase::Empty);
    assert!(state.items.is_empty());
    assert!(!store.contains_key(TODOS_KEY));

    // Retry once the network is back
    api.fail_fetch(false);
    assert_eq!(app.load().await.unwrap().len(), 10);
}

#[tokio::test]
async fn write_failure_fails_create_and_leaves_collection() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    let original = app.load().await.unwrap();

    store.fail_writes(true);
    let error = app.create("Buy milk", false).await.unwrap_err();

    assert!(matches!(error, TodoError::Storage(_)));
    let state = app.todos().await;
    assert_eq!(state.status, Status::Failed);
    assert_eq!(state.items, original);
}

#[tokio::test]
async fn concurrent_creates_both_survive() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    app.load().await.unwrap();
    store.set_latency(Some(Duration::from_millis(20)));

    let (a, b) = tokio::join!(app.create("First", false), app.create("Second", false));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.id, b.id);
    let stored = persisted(&store);
    assert_eq!(stored.len(), 12);
    assert!(stored.contains(&a));
    assert!(stored.contains(&b));
    assert_eq!(app.todos().await.count(), 12);
}

#[tokio::test]
async fn new_ids_skip_past_existing_ones() {
    let store = InMemoryKeyValueStore::new();
    let far_future = 9_000_000_000_000;
    store.insert_raw(
        TODOS_KEY,
        serde_json::to_vec(&vec![Todo::new(far_future, "From another device", false)]).unwrap(),
    );
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    app.load().await.unwrap();

    let created = app.create("Buy milk", false).await.unwrap();

    assert!(created.id > far_future);
}

#[tokio::test]
async fn create_fails_cleanly_when_no_ids_are_left() {
    let store = InMemoryKeyValueStore::new();
    let stored = vec![Todo::new(i64::MAX, "The very last todo", false)];
    store.insert_raw(TODOS_KEY, serde_json::to_vec(&stored).unwrap());
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    app.load().await.unwrap();

    let error = app.create("Buy milk", false).await.unwrap_err();

    assert_eq!(error, TodoError::IdsExhausted);
    let state = app.todos().await;
    assert_eq!(state.status, Status::Failed);
    assert_eq!(state.items, stored);
    assert_eq!(persisted(&store), stored);

    // Other mutations keep working
    app.remove(i64::MAX).await.unwrap();
    assert!(app.todos().await.items.is_empty());
}

#[tokio::test]
async fn mirroring_sends_each_mutation() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::mirroring_app(&store, &api);
    app.load().await.unwrap();

    let created = app.create("Buy milk", false).await.unwrap();
    app.update(created.toggled()).await.unwrap();
    app.remove(created.id).await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            format!("POST {}", created.id),
            format!("PUT {}", created.id),
            format!("DELETE {}", created.id),
        ]
    );
}

#[tokio::test]
async fn mirroring_failure_does_not_fail_create() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    api.fail_writes(true);
    let app = support::mirroring_app(&store, &api);
    app.load().await.unwrap();

    let created = app.create("Buy milk", false).await.unwrap();

    // The local id is kept even though the remote would assign its own
    assert_ne!(created.id, 201);
    assert_eq!(api.calls(), vec![format!("POST {}", created.id)]);
    assert!(persisted(&store).contains(&created));
    let state = app.todos().await;
    assert_eq!(state.status, Status::Succeeded);
    assert!(state.contains(created.id));
}

#[tokio::test]
async fn mirroring_is_off_by_default() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    app.load().await.unwrap();

    app.create("Buy milk", false).await.unwrap();

    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn visible_view_follows_search_and_filter() {
    let store = InMemoryKeyValueStore::new();
    let stored = vec![
        Todo::new(1, "Buy milk", false),
        Todo::new(2, "Buy bread", true),
        Todo::new(3, "Call mom", false),
    ];
    store.insert_raw(TODOS_KEY, serde_json::to_vec(&stored).unwrap());
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    app.load().await.unwrap();

    assert_eq!(app.visible().await, stored);

    app.set_search_query("BUY").await.unwrap();
    let ids: Vec<_> = app.visible().await.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2]);

    app.set_filter(Filter::Incomplete).await.unwrap();
    let ids: Vec<_> = app.visible().await.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1]);

    // The view never changes the collection
    assert_eq!(app.todos().await.items, stored);
}

#[tokio::test]
async fn shutdown_rejects_further_operations() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::with_items(20));
    let app = support::app(&store, &api);
    app.load().await.unwrap();

    app.shutdown(Duration::from_secs(1)).await.unwrap();

    assert!(matches!(
        app.create("Too late", false).await,
        Err(TodoError::Store(_))
    ));
}
