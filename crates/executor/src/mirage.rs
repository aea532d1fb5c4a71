//! High-level typed wrapper for the Executor.
//!
//! The [`Mirage`] struct provides a convenient Rust API that wraps the
//! [`Executor`] and [`Command`]/[`Output`] enums with typed method calls.
//!
//! All methods address the default database with no routing indicator.
//! Callers exercising named databases or transport concerns should use
//! [`Mirage::executor`] and build commands directly.
//!
//! # Example
//!
//! ```
//! use mirage_executor::{Entity, Key, Mirage, Value};
//!
//! let db = Mirage::in_memory();
//! let entity = Entity::new(Key::with_name("Task", "demo"))
//!     .with_property("done", Value::Boolean(false));
//! db.upsert(entity).unwrap();
//! let results = db.lookup(vec![Key::with_name("Task", "demo")]).unwrap();
//! assert_eq!(results.found.len(), 1);
//! ```

use std::sync::Arc;
use std::time::Duration;

use mirage_core::{Entity, Key, Limits};
use mirage_engine::{
    CommitMode, EntityStore, LookupResults, Mutation, Query, QueryResults,
};

use crate::{Command, Error, Executor, Output, RequestContext, Result};

/// High-level typed wrapper for emulator operations.
///
/// Each method builds the appropriate [`Command`], executes it, and
/// extracts the typed result, reporting `Internal` on an impossible output
/// shape.
pub struct Mirage {
    executor: Executor,
}

impl Mirage {
    /// Emulator with default limits and transaction timeout.
    pub fn in_memory() -> Self {
        Self::with_store(EntityStore::new())
    }

    /// Emulator with custom limits and transaction timeout.
    pub fn with_config(limits: Limits, transaction_timeout: Duration) -> Self {
        Self::with_store(EntityStore::with_config(limits, transaction_timeout))
    }

    /// Emulator over a pre-built engine.
    pub fn with_store(store: EntityStore) -> Self {
        Self {
            executor: Executor::new(Arc::new(store)),
        }
    }

    /// The underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    fn execute(&self, cmd: Command) -> Result<Output> {
        self.executor.execute(&RequestContext::new(), cmd)
    }

    // =========================================================================
    // Operation surface
    // =========================================================================

    /// Fetch entities by key.
    pub fn lookup(&self, keys: Vec<Key>) -> Result<LookupResults> {
        match self.execute(Command::Lookup {
            database: None,
            namespace: None,
            keys,
        })? {
            Output::Lookup(results) => Ok(results),
            _ => Err(Error::Internal {
                reason: "unexpected output for Lookup".into(),
            }),
        }
    }

    /// Apply a non-transactional mutation batch.
    pub fn commit(&self, mutations: Vec<Mutation>) -> Result<Vec<Key>> {
        match self.execute(Command::Commit {
            database: None,
            mode: CommitMode::NonTransactional,
            mutations,
            transaction: None,
        })? {
            Output::MutationResults { keys } => Ok(keys),
            _ => Err(Error::Internal {
                reason: "unexpected output for Commit".into(),
            }),
        }
    }

    /// Apply a mutation batch under a transaction handle.
    pub fn commit_in_transaction(
        &self,
        transaction: impl Into<String>,
        mutations: Vec<Mutation>,
    ) -> Result<Vec<Key>> {
        match self.execute(Command::Commit {
            database: None,
            mode: CommitMode::Transactional,
            mutations,
            transaction: Some(transaction.into()),
        })? {
            Output::MutationResults { keys } => Ok(keys),
            _ => Err(Error::Internal {
                reason: "unexpected output for Commit".into(),
            }),
        }
    }

    /// Evaluate a query.
    pub fn run_query(&self, query: Query) -> Result<QueryResults> {
        match self.execute(Command::RunQuery {
            database: None,
            namespace: None,
            query,
        })? {
            Output::Query(results) => Ok(results),
            _ => Err(Error::Internal {
                reason: "unexpected output for RunQuery".into(),
            }),
        }
    }

    /// Open a transaction and return its handle.
    pub fn begin_transaction(&self) -> Result<String> {
        match self.execute(Command::BeginTransaction { database: None })? {
            Output::Transaction { transaction } => Ok(transaction),
            _ => Err(Error::Internal {
                reason: "unexpected output for BeginTransaction".into(),
            }),
        }
    }

    /// Fill numeric identifiers into incomplete keys.
    pub fn allocate_ids(&self, keys: Vec<Key>) -> Result<Vec<Key>> {
        match self.execute(Command::AllocateIds {
            database: None,
            keys,
        })? {
            Output::AllocatedKeys { keys } => Ok(keys),
            _ => Err(Error::Internal {
                reason: "unexpected output for AllocateIds".into(),
            }),
        }
    }

    /// Count the results of the nested query.
    pub fn count(&self, query: Query) -> Result<u64> {
        match self.execute(Command::RunAggregationQuery {
            database: None,
            namespace: None,
            query,
        })? {
            Output::Count { count } => Ok(count),
            _ => Err(Error::Internal {
                reason: "unexpected output for RunAggregationQuery".into(),
            }),
        }
    }

    // =========================================================================
    // Single-mutation conveniences
    // =========================================================================

    /// Insert one entity, returning its (possibly identifier-filled) key.
    pub fn insert(&self, entity: Entity) -> Result<Key> {
        self.single(Mutation::Insert(entity))
    }

    /// Update one entity in place.
    pub fn update(&self, entity: Entity) -> Result<Key> {
        self.single(Mutation::Update(entity))
    }

    /// Store one entity unconditionally.
    pub fn upsert(&self, entity: Entity) -> Result<Key> {
        self.single(Mutation::Upsert(entity))
    }

    /// Delete one key; idempotent.
    pub fn delete(&self, key: Key) -> Result<()> {
        self.single(Mutation::Delete(key)).map(|_| ())
    }

    fn single(&self, mutation: Mutation) -> Result<Key> {
        let mut keys = self.commit(vec![mutation])?;
        match keys.pop() {
            Some(key) if keys.is_empty() => Ok(key),
            _ => Err(Error::Internal {
                reason: "single-mutation commit returned an unexpected key count".into(),
            }),
        }
    }
}
