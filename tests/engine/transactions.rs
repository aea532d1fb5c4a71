//! Transaction lifecycle through the public API.

use std::thread;
use std::time::Duration;

use crate::common::*;
use mirage_core::{Error, ErrorCode};
use miragedb::{CommitMode, EntityStore, Key, Limits, Mutation};

fn fast_expiry_store() -> EntityStore {
    EntityStore::with_config(Limits::default(), Duration::from_millis(25))
}

#[test]
fn transactional_commit_applies_and_consumes_the_handle() {
    let store = EntityStore::new();
    let handle = store.begin_transaction().unwrap();

    store
        .commit(
            CommitMode::Transactional,
            vec![Mutation::Upsert(task("a"))],
            Some(&handle),
        )
        .unwrap();
    assert!(get(&store, Key::with_name("Task", "a")).is_some());

    // The handle was consumed; a second use is unknown.
    let err = store
        .commit(CommitMode::Transactional, vec![], Some(&handle))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[test]
fn expired_handle_fails_commit_with_expiry_class_and_is_removed() {
    let store = fast_expiry_store();
    let handle = store.begin_transaction().unwrap();
    assert_eq!(store.transaction_count(), 1);

    thread::sleep(Duration::from_millis(50));

    let err = store
        .commit(
            CommitMode::Transactional,
            vec![Mutation::Upsert(task("a"))],
            Some(&handle),
        )
        .unwrap_err();
    assert!(matches!(err, Error::TransactionExpired { .. }));
    assert_eq!(err.code(), ErrorCode::Aborted);
    assert_eq!(store.transaction_count(), 0);
    assert_eq!(store.entity_count(), 0);
}

#[test]
fn failed_transactional_commit_consumes_handle_and_writes_nothing() {
    let store = EntityStore::new();
    let handle = store.begin_transaction().unwrap();

    let err = store
        .commit(
            CommitMode::Transactional,
            vec![
                Mutation::Upsert(task("staged")),
                Mutation::Update(task("missing")),
            ],
            Some(&handle),
        )
        .unwrap_err();
    assert!(matches!(err, Error::EntityNotFound { .. }));
    assert_eq!(store.entity_count(), 0);
    assert_eq!(store.transaction_count(), 0);
}

#[test]
fn handles_are_never_reused() {
    let store = EntityStore::new();
    let mut handles = std::collections::HashSet::new();
    for _ in 0..100 {
        let handle = store.begin_transaction().unwrap();
        assert!(handles.insert(handle.clone()), "handle {} reissued", handle);
        store
            .commit(CommitMode::Transactional, vec![], Some(&handle))
            .unwrap();
    }
}
