//! Shared helpers for the executor suite.

use std::sync::Arc;

use miragedb::{Entity, EntityStore, Executor, Key, Value};

/// Executor over a fresh in-memory engine.
pub fn create_executor() -> Executor {
    Executor::new(Arc::new(EntityStore::new()))
}

/// A Task entity with a name property mirroring its key name.
pub fn task(name: &str) -> Entity {
    Entity::new(Key::with_name("Task", name))
        .with_property("name", Value::Str(name.to_string()))
}
