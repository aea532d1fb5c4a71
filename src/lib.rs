//! MirageDB - in-process emulator of a hierarchical key/value document store
//!
//! Mirage lets client code exercise realistic create/read/update/delete,
//! query, transaction, and ID-allocation flows against the emulated
//! service's semantics, with no network dependency.
//!
//! # Quick Start
//!
//! ```
//! use miragedb::{Entity, Key, Mirage, Query, Value};
//!
//! // Create an in-memory emulator
//! let db = Mirage::in_memory();
//!
//! // Store an entity
//! let task = Entity::new(Key::with_name("Task", "demo"))
//!     .with_property("done", Value::Boolean(false));
//! db.upsert(task)?;
//!
//! // Query it back
//! let results = db.run_query(Query::new("Task"))?;
//! assert_eq!(results.entities.len(), 1);
//! # Ok::<(), miragedb::Error>(())
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which provides a
//! command-based API mirroring the wire protocol's six operations. The
//! [`Mirage`] struct provides a convenient high-level interface.
//!
//! Internal implementation details (storage, mutation processing,
//! transaction tracking, query evaluation) are not exposed - only the
//! executor API is public.

// Re-export the public API from mirage-executor
pub use mirage_executor::*;
