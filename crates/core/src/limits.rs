//! Size ceilings for entities, keys, and commit batches
//!
//! These mirror the emulated service's published limits. Violations surface
//! as `INVALID_ARGUMENT` errors and are always detected before any store
//! mutation. Custom limits can be set at engine construction time; the
//! defaults match the service.

use thiserror::Error;

use crate::entity::Entity;
use crate::error::Error;

/// Size ceilings enforced by the mutation processor.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum serialized entity size in bytes (default: 1,048,572).
    pub max_entity_bytes: usize,

    /// Maximum canonical key length in bytes (default: 6144).
    pub max_key_bytes: usize,

    /// Maximum mutations in one commit (default: 500).
    pub max_mutations_per_commit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_entity_bytes: 1_048_572, // 1 MiB - 4 bytes, per the service
            max_key_bytes: 6144,
            max_mutations_per_commit: 500,
        }
    }
}

impl Limits {
    /// Limits small enough to trip in unit tests without megabyte payloads.
    pub fn with_small_limits() -> Self {
        Limits {
            max_entity_bytes: 400,
            max_key_bytes: 64,
            max_mutations_per_commit: 5,
        }
    }

    /// Validate a canonical key string against the key ceiling.
    pub fn validate_key(&self, canonical: &str) -> Result<(), LimitError> {
        let len = canonical.len();
        if len > self.max_key_bytes {
            return Err(LimitError::KeyTooLong {
                actual: len,
                max: self.max_key_bytes,
            });
        }
        Ok(())
    }

    /// Validate an entity's serialized size against the entity ceiling.
    pub fn validate_entity(&self, entity: &Entity) -> Result<(), LimitError> {
        let len = entity.encoded_len();
        if len > self.max_entity_bytes {
            return Err(LimitError::EntityTooLarge {
                actual: len,
                max: self.max_entity_bytes,
            });
        }
        Ok(())
    }

    /// Validate a commit batch size before anything else happens.
    pub fn validate_batch(&self, mutation_count: usize) -> Result<(), LimitError> {
        if mutation_count > self.max_mutations_per_commit {
            return Err(LimitError::BatchTooLarge {
                actual: mutation_count,
                max: self.max_mutations_per_commit,
            });
        }
        Ok(())
    }
}

/// Ceiling violations.
///
/// Each maps to an `INVALID_ARGUMENT` engine error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LimitError {
    /// Canonical key exceeds the key ceiling.
    #[error("key too long: {actual} bytes exceeds maximum {max}")]
    KeyTooLong {
        /// Actual canonical key length in bytes.
        actual: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Serialized entity exceeds the entity ceiling.
    #[error("entity too large: {actual} bytes exceeds maximum {max}")]
    EntityTooLarge {
        /// Actual serialized size in bytes.
        actual: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Commit batch exceeds the mutation-count ceiling.
    #[error("too many mutations: {actual} exceeds maximum {max}")]
    BatchTooLarge {
        /// Mutations in the rejected batch.
        actual: usize,
        /// Maximum allowed per commit.
        max: usize,
    },
}

impl From<LimitError> for Error {
    fn from(err: LimitError) -> Self {
        match err {
            LimitError::KeyTooLong { actual, max } => Error::KeyTooLong { actual, max },
            LimitError::EntityTooLarge { actual, max } => Error::EntityTooLarge { actual, max },
            LimitError::BatchTooLarge { actual, max } => Error::TooManyMutations { actual, max },
        }
    }
}
