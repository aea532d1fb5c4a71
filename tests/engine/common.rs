//! Shared helpers for the engine suite.

use miragedb::{CommitMode, Entity, EntityStore, Key, Mutation, QueryResults, Value};

/// A Task entity with a name property mirroring its key name.
pub fn task(name: &str) -> Entity {
    Entity::new(Key::with_name("Task", name))
        .with_property("name", Value::Str(name.to_string()))
}

/// Commit a batch of upserts outside any transaction.
pub fn seed(store: &EntityStore, entities: Vec<Entity>) {
    store
        .commit(
            CommitMode::NonTransactional,
            entities.into_iter().map(Mutation::Upsert).collect(),
            None,
        )
        .expect("seed commit");
}

/// The `name` property of every result, in result order.
pub fn names(results: &QueryResults) -> Vec<String> {
    results
        .entities
        .iter()
        .filter_map(|entity| entity.property("name")?.as_str().map(String::from))
        .collect()
}

/// Fetch one entity through lookup.
pub fn get(store: &EntityStore, key: Key) -> Option<Entity> {
    store
        .lookup(vec![key], None)
        .expect("lookup")
        .found
        .into_iter()
        .next()
}
