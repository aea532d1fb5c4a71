//! Mutation semantics through the public API.

use crate::common::*;
use mirage_core::Error;
use miragedb::{CommitMode, Entity, EntityStore, Key, Mutation, Value};

#[test]
fn put_then_get_returns_entity_unchanged() {
    let store = EntityStore::new();
    let entity = Entity::new(Key::with_name("Task", "roundtrip"))
        .with_property("priority", Value::Integer(3))
        .with_property("done", Value::Boolean(false))
        .with_property("score", Value::Double(0.5))
        .with_property("note", Value::Str("unchanged".to_string()));
    seed(&store, vec![entity.clone()]);

    assert_eq!(get(&store, entity.key.clone()), Some(entity));
}

#[test]
fn delete_is_idempotent_and_never_fails() {
    let store = EntityStore::new();
    seed(&store, vec![task("a")]);

    for round in 0..3 {
        store
            .commit(
                CommitMode::NonTransactional,
                vec![Mutation::Delete(Key::with_name("Task", "a"))],
                None,
            )
            .unwrap_or_else(|e| panic!("delete round {} failed: {}", round, e));
        assert_eq!(store.entity_count(), 0);
    }
}

#[test]
fn insert_on_existing_key_fails_and_preserves_prior() {
    let store = EntityStore::new();
    let original = Entity::new(Key::with_name("Task", "a"))
        .with_property("version", Value::Str("original".to_string()));
    seed(&store, vec![original.clone()]);

    let replacement = Entity::new(Key::with_name("Task", "a"))
        .with_property("version", Value::Str("replacement".to_string()));
    let err = store
        .commit(
            CommitMode::NonTransactional,
            vec![Mutation::Insert(replacement)],
            None,
        )
        .unwrap_err();
    assert!(matches!(err, Error::EntityAlreadyExists { .. }));
    assert_eq!(get(&store, Key::with_name("Task", "a")), Some(original));
}

#[test]
fn update_on_missing_key_fails_and_creates_nothing() {
    let store = EntityStore::new();
    let err = store
        .commit(
            CommitMode::NonTransactional,
            vec![Mutation::Update(task("fresh"))],
            None,
        )
        .unwrap_err();
    assert!(matches!(err, Error::EntityNotFound { .. }));
    assert!(get(&store, Key::with_name("Task", "fresh")).is_none());
    assert_eq!(store.entity_count(), 0);
}

#[test]
fn upsert_always_succeeds_second_value_wins() {
    let store = EntityStore::new();
    let first = Entity::new(Key::with_name("Task", "a"))
        .with_property("generation", Value::Integer(1));
    let second = Entity::new(Key::with_name("Task", "a"))
        .with_property("generation", Value::Integer(2));

    seed(&store, vec![first]);
    seed(&store, vec![second.clone()]);

    assert_eq!(get(&store, Key::with_name("Task", "a")), Some(second));
    assert_eq!(store.entity_count(), 1);
}

#[test]
fn failed_batch_leaves_no_partial_writes() {
    let store = EntityStore::new();
    seed(&store, vec![task("existing")]);

    let err = store
        .commit(
            CommitMode::NonTransactional,
            vec![
                Mutation::Upsert(task("one")),
                Mutation::Delete(Key::with_name("Task", "existing")),
                Mutation::Insert(task("existing")), // the delete staged above makes this legal...
                Mutation::Update(task("never-stored")), // ...but this aborts the whole batch
            ],
            None,
        )
        .unwrap_err();
    assert!(matches!(err, Error::EntityNotFound { .. }));

    assert!(get(&store, Key::with_name("Task", "one")).is_none());
    assert!(get(&store, Key::with_name("Task", "existing")).is_some());
    assert_eq!(store.entity_count(), 1);
}

#[test]
fn mutation_results_preserve_submission_order() {
    let store = EntityStore::new();
    let keys = store
        .commit(
            CommitMode::NonTransactional,
            vec![
                Mutation::Upsert(task("b")),
                Mutation::Insert(Entity::new(Key::incomplete("Task"))),
                Mutation::Delete(Key::with_name("Task", "z")),
            ],
            None,
        )
        .unwrap();
    assert_eq!(keys.len(), 3);
    assert_eq!(keys[0], Key::with_name("Task", "b"));
    assert!(keys[1].is_complete(), "allocated key returned in place");
    assert_eq!(keys[2], Key::with_name("Task", "z"));
}
