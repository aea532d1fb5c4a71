//! Concurrent access: interleaved commits and queries under load.

use std::sync::Arc;
use std::thread;

use rand::Rng;

use crate::common::*;
use miragedb::{CommitMode, Entity, EntityStore, Key, Mutation, Query, Value};

const WRITERS: usize = 50;
const ROUNDS: usize = 20;
const SLOTS: usize = 10;

fn slot_key(slot: usize) -> Key {
    Key::with_name("Churn", format!("slot-{}", slot))
}

#[test]
fn concurrent_commits_across_ten_keys_leave_a_consistent_store() {
    let store = Arc::new(EntityStore::new());

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for round in 0..ROUNDS {
                    // Deterministic slot walk so every key sees every writer;
                    // the payload varies randomly like real traffic.
                    let slot = (writer + round) % SLOTS;
                    let entity = Entity::new(slot_key(slot))
                        .with_property("writer", Value::Integer(writer as i64))
                        .with_property("round", Value::Integer(round as i64))
                        .with_property("jitter", Value::Integer(rng.gen_range(0..1_000)));
                    store
                        .commit(
                            CommitMode::NonTransactional,
                            vec![Mutation::Upsert(entity)],
                            None,
                        )
                        .expect("concurrent upsert");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    // No lost or duplicated entities: exactly one entity per slot.
    assert_eq!(store.entity_count(), SLOTS);
    let results = store.run_query(&Query::new("Churn")).unwrap();
    assert_eq!(results.entities.len(), SLOTS);

    // Every surviving entity is one that some writer actually committed.
    for entity in &results.entities {
        let writer = entity.property("writer").and_then(|v| v.as_integer());
        let round = entity.property("round").and_then(|v| v.as_integer());
        assert!(matches!(writer, Some(w) if (0..WRITERS as i64).contains(&w)));
        assert!(matches!(round, Some(r) if (0..ROUNDS as i64).contains(&r)));
    }
}

#[test]
fn queries_under_write_load_always_see_all_committed_entities() {
    let store = Arc::new(EntityStore::new());

    // A stable kind committed up front; writers churn a different kind.
    let stable: Vec<Entity> = (0..SLOTS)
        .map(|i| task(&format!("stable-{}", i)))
        .collect();
    seed(&store, stable);

    let writer_store = Arc::clone(&store);
    let writer = thread::spawn(move || {
        for round in 0..200 {
            let entity = Entity::new(slot_key(round % SLOTS))
                .with_property("round", Value::Integer(round as i64));
            writer_store
                .commit(
                    CommitMode::NonTransactional,
                    vec![Mutation::Upsert(entity)],
                    None,
                )
                .expect("churn upsert");
        }
    });

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..100 {
                    let results = store.run_query(&Query::new("Task")).unwrap();
                    // Previously committed, never-deleted entities are always
                    // all visible, whatever the concurrent churn does.
                    assert_eq!(results.entities.len(), SLOTS);
                }
            })
        })
        .collect();

    writer.join().expect("writer thread");
    for reader in readers {
        reader.join().expect("reader thread");
    }
}

#[test]
fn same_key_commits_serialize_with_a_single_winner() {
    let store = Arc::new(EntityStore::new());
    let key = Key::with_name("Contended", "only");

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let store = Arc::clone(&store);
            let key = key.clone();
            thread::spawn(move || {
                let entity =
                    Entity::new(key).with_property("writer", Value::Integer(writer as i64));
                store
                    .commit(
                        CommitMode::NonTransactional,
                        vec![Mutation::Upsert(entity)],
                        None,
                    )
                    .expect("contended upsert");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    assert_eq!(store.entity_count(), 1);
    let survivor = get(&store, key).expect("winner present");
    let writer = survivor
        .property("writer")
        .and_then(|v| v.as_integer())
        .expect("winner carries its writer id");
    assert!((0..WRITERS as i64).contains(&writer));
}
