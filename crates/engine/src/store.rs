//! The entity store
//!
//! [`EntityStore`] is the engine's single piece of shared state: a mapping
//! from canonical key string to entity, the transaction table, and the two
//! allocation counters, all guarded by one `parking_lot::RwLock`.
//!
//! ## Locking discipline
//!
//! - Pure reads (`lookup`, `run_query`, `run_aggregation_query`) take the
//!   shared lock.
//! - Every mutating path (`commit`, `allocate_ids`, `begin_transaction`)
//!   takes the exclusive lock for its whole critical section, so no reader
//!   ever observes a partially applied batch.
//! - Locks are scoped guards; every exit path, including early validation
//!   failures, releases before returning.
//!
//! Counters are fields of the locked state, never ambient globals, and are
//! only touched under the exclusive lock.

use std::collections::BTreeMap;
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use mirage_core::{Entity, Error, Key, Limits, PathId, Result};

use crate::mutation::{self, CommitMode, Mutation};
use crate::query::{self, Query, QueryResults};
use crate::transaction::{self, TransactionRecord};

/// How long a transaction handle stays valid.
///
/// Deliberately far below the emulated service's real timeout so expiry
/// paths fail fast in tests. Override via [`EntityStore::with_config`].
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(15);

/// First identifier handed out by the allocator.
///
/// Allocated ids start well above the range callers typically hand-assign,
/// so emulator-issued ids do not collide with seeded fixtures.
pub(crate) const FIRST_ALLOCATED_ID: i64 = 1_000_000;

/// Everything behind the lock.
#[derive(Debug)]
pub(crate) struct StoreInner {
    /// Canonical key string → entity, last write wins.
    pub(crate) entities: BTreeMap<String, Entity>,
    /// Active transaction handles.
    pub(crate) transactions: FxHashMap<String, TransactionRecord>,
    /// Monotonic identifier allocator.
    pub(crate) next_entity_id: i64,
    /// Monotonic transaction-handle allocator.
    pub(crate) next_transaction_id: u64,
}

impl StoreInner {
    fn new() -> Self {
        StoreInner {
            entities: BTreeMap::new(),
            transactions: FxHashMap::default(),
            next_entity_id: FIRST_ALLOCATED_ID,
            next_transaction_id: 1,
        }
    }

    /// The entity under a canonical key, if live.
    pub(crate) fn get(&self, canonical: &str) -> Option<&Entity> {
        self.entities.get(canonical)
    }

    /// Store an entity under its canonical key, last write wins.
    pub(crate) fn put(&mut self, canonical: String, entity: Entity) {
        self.entities.insert(canonical, entity);
    }

    /// Remove the entity under a canonical key; absent keys are a no-op.
    pub(crate) fn delete(&mut self, canonical: &str) {
        self.entities.remove(canonical);
    }

    /// Iterate live entities in ascending canonical-key order.
    pub(crate) fn scan(&self) -> impl Iterator<Item = (&String, &Entity)> {
        self.entities.iter()
    }

    /// Allocating half of the key codec.
    ///
    /// Complete keys pass through unchanged; incomplete keys get the next
    /// numeric identifier written into their final path element. Pathless
    /// keys are malformed.
    pub(crate) fn resolve(&mut self, mut key: Key) -> Result<(String, Key)> {
        if key.path.is_empty() {
            return Err(Error::MalformedKey {
                reason: "key has no path elements".to_string(),
            });
        }
        if !key.is_complete() {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            if let Some(element) = key.path.last_mut() {
                element.id = Some(PathId::Id(id));
            }
        }
        let canonical = key.canonical()?;
        Ok((canonical, key))
    }
}

/// Lookup response: entities found, keys with no live entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResults {
    /// Entities found, in request order.
    pub found: Vec<Entity>,
    /// Requested keys with no live entity, in request order.
    pub missing: Vec<Key>,
}

/// The mock storage engine.
///
/// One instance emulates one database process; all six operations of the
/// request surface terminate here.
#[derive(Debug)]
pub struct EntityStore {
    inner: RwLock<StoreInner>,
    limits: Limits,
    transaction_timeout: Duration,
}

impl EntityStore {
    /// Store with default limits and transaction timeout.
    pub fn new() -> Self {
        Self::with_config(Limits::default(), DEFAULT_TRANSACTION_TIMEOUT)
    }

    /// Store with custom limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self::with_config(limits, DEFAULT_TRANSACTION_TIMEOUT)
    }

    /// Store with custom limits and transaction timeout.
    pub fn with_config(limits: Limits, transaction_timeout: Duration) -> Self {
        EntityStore {
            inner: RwLock::new(StoreInner::new()),
            limits,
            transaction_timeout,
        }
    }

    /// The ceilings this store enforces.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Fetch entities by key.
    ///
    /// Keys with an empty namespace inherit the request-level `namespace`,
    /// if any. Incomplete keys fail the whole request with `MalformedKey`;
    /// lookup never allocates.
    pub fn lookup(&self, keys: Vec<Key>, namespace: Option<&str>) -> Result<LookupResults> {
        let inner = self.inner.read();
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for key in keys {
            let key = key.qualify(namespace);
            let canonical = key.canonical()?;
            match inner.get(&canonical) {
                Some(entity) => found.push(entity.clone()),
                None => missing.push(key),
            }
        }
        Ok(LookupResults { found, missing })
    }

    /// Apply a mutation batch atomically.
    ///
    /// The whole batch validates before anything is written; the first
    /// violation aborts the commit with no partial effect. A transactional
    /// commit must name a live, unexpired handle, and the handle is consumed
    /// by the commit that references it whether or not the batch applies.
    pub fn commit(
        &self,
        mode: CommitMode,
        mutations: Vec<Mutation>,
        transaction: Option<&str>,
    ) -> Result<Vec<Key>> {
        match (mode, transaction) {
            (CommitMode::Transactional, None) => {
                return Err(Error::InvalidArgument {
                    reason: "transactional commit requires a transaction handle".to_string(),
                })
            }
            (CommitMode::NonTransactional, Some(_)) => {
                return Err(Error::InvalidArgument {
                    reason: "non-transactional commit must not name a transaction".to_string(),
                })
            }
            _ => {}
        }

        let mut inner = self.inner.write();
        if let Some(handle) = transaction {
            transaction::validate(&mut inner, handle, self.transaction_timeout)?;
        }
        let outcome = mutation::apply_batch(&mut inner, &self.limits, mutations);
        if let Some(handle) = transaction {
            // Consumed on success and on failure alike; never reused.
            inner.transactions.remove(handle);
        }
        outcome
    }

    /// Open a transaction and return its opaque handle.
    ///
    /// Always succeeds; also purges handles that already aged out.
    pub fn begin_transaction(&self) -> Result<String> {
        let mut inner = self.inner.write();
        Ok(transaction::begin(&mut inner, self.transaction_timeout))
    }

    /// Fill numeric identifiers into incomplete keys.
    ///
    /// Every key must be incomplete; a complete or pathless key rejects the
    /// whole request before any identifier is handed out.
    pub fn allocate_ids(&self, keys: Vec<Key>) -> Result<Vec<Key>> {
        let mut inner = self.inner.write();
        for key in &keys {
            if key.path.is_empty() {
                return Err(Error::MalformedKey {
                    reason: "key has no path elements".to_string(),
                });
            }
            if key.is_complete() {
                return Err(Error::InvalidArgument {
                    reason: format!("key {} is already complete; allocation requires incomplete keys", key),
                });
            }
        }
        keys.into_iter()
            .map(|key| inner.resolve(key).map(|(_, key)| key))
            .collect()
    }

    /// Evaluate a query under the shared lock.
    pub fn run_query(&self, query: &Query) -> Result<QueryResults> {
        let inner = self.inner.read();
        query::execute(&inner, query)
    }

    /// Count the results of the nested query.
    ///
    /// The count observes the whole pipeline, offset and limit included.
    pub fn run_aggregation_query(&self, query: &Query) -> Result<u64> {
        let inner = self.inner.read();
        let results = query::execute(&inner, query)?;
        Ok(results.entities.len() as u64)
    }

    /// Number of live entities; test and diagnostics helper.
    pub fn entity_count(&self) -> usize {
        self.inner.read().entities.len()
    }

    /// Number of active (possibly expired, not yet purged) transactions.
    pub fn transaction_count(&self) -> usize {
        self.inner.read().transactions.len()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
