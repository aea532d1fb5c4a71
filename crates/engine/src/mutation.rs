//! The mutation processor
//!
//! A commit is an ordered batch of mutations applied atomically: either
//! every element lands or none does. Application is two-phase under the
//! store's exclusive lock:
//!
//! 1. **Stage**: walk the batch in submission order, validating each
//!    element against the live map overlaid with the effects staged so far.
//!    Existence checks therefore see earlier elements of the same batch, and
//!    the first violation (size ceiling, existence mismatch, malformed key)
//!    abandons the batch before the store is touched.
//! 2. **Apply**: fold the staged overlay into the live map.
//!
//! Identifier allocation during staging may burn ids when a later element
//! fails; ids are never reused, so that is harmless.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mirage_core::{Entity, Error, Key, Limits, Result};

use crate::store::StoreInner;

/// Commit mode, named by the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitMode {
    /// Commit under a previously opened transaction handle.
    Transactional,
    /// Standalone commit; must not name a transaction.
    NonTransactional,
}

/// One element of a commit batch.
///
/// Wire shape is externally tagged lowercase: `{"insert": {entity}}`,
/// `{"update": {entity}}`, `{"upsert": {entity}}`, `{"delete": {key}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutation {
    /// Store a new entity; fails if the key already holds one.
    Insert(Entity),
    /// Overwrite an existing entity; fails if the key holds none.
    Update(Entity),
    /// Store unconditionally; never fails on existence.
    Upsert(Entity),
    /// Remove the entity if present; idempotent.
    Delete(Key),
}

/// Effects staged by phase one, keyed by canonical string.
///
/// `Some` stages a write, `None` a removal; the latest staged effect per
/// key wins, which reproduces sequential semantics inside one batch.
type Overlay = BTreeMap<String, Option<Entity>>;

fn is_live(inner: &StoreInner, overlay: &Overlay, canonical: &str) -> bool {
    match overlay.get(canonical) {
        Some(Some(_)) => true,
        Some(None) => false,
        None => inner.get(canonical).is_some(),
    }
}

fn validate_sizes(limits: &Limits, canonical: &str, entity: &Entity) -> Result<()> {
    limits.validate_key(canonical)?;
    limits.validate_entity(entity)?;
    Ok(())
}

/// Apply a whole commit batch atomically. Caller holds the exclusive lock.
///
/// Returns the per-mutation result keys (identifier-filled where the store
/// allocated) in submission order.
pub(crate) fn apply_batch(
    inner: &mut StoreInner,
    limits: &Limits,
    mutations: Vec<Mutation>,
) -> Result<Vec<Key>> {
    limits.validate_batch(mutations.len())?;

    let mut overlay = Overlay::new();
    let mut result_keys = Vec::with_capacity(mutations.len());

    for mutation in mutations {
        match mutation {
            Mutation::Insert(mut entity) => {
                let (canonical, key) = inner.resolve(entity.key)?;
                entity.key = key.clone();
                if is_live(inner, &overlay, &canonical) {
                    return Err(Error::EntityAlreadyExists {
                        key: key.to_string(),
                    });
                }
                validate_sizes(limits, &canonical, &entity)?;
                overlay.insert(canonical, Some(entity));
                result_keys.push(key);
            }
            Mutation::Update(entity) => {
                let canonical = entity.key.canonical()?;
                if !is_live(inner, &overlay, &canonical) {
                    return Err(Error::EntityNotFound {
                        key: entity.key.to_string(),
                    });
                }
                validate_sizes(limits, &canonical, &entity)?;
                result_keys.push(entity.key.clone());
                overlay.insert(canonical, Some(entity));
            }
            Mutation::Upsert(mut entity) => {
                let (canonical, key) = inner.resolve(entity.key)?;
                entity.key = key.clone();
                validate_sizes(limits, &canonical, &entity)?;
                overlay.insert(canonical, Some(entity));
                result_keys.push(key);
            }
            Mutation::Delete(key) => {
                let canonical = key.canonical()?;
                overlay.insert(canonical, None);
                result_keys.push(key);
            }
        }
    }

    // Phase two: fold the overlay in. Nothing below can fail.
    for (canonical, effect) in overlay {
        match effect {
            Some(entity) => inner.put(canonical, entity),
            None => inner.delete(&canonical),
        }
    }
    tracing::debug!(mutations = result_keys.len(), "commit batch applied");
    Ok(result_keys)
}
