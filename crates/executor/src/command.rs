//! Command enum defining the emulator's operation surface.
//!
//! Commands are the "instruction set" of the emulator: one variant per
//! logical operation the transport can dispatch. They are:
//! - **Self-contained**: all parameters needed for execution are in the variant
//! - **Serializable**: convertible to/from JSON for cross-language use
//! - **Pure data**: no closures or executable code
//!
//! # Database field
//!
//! Data-scoped commands carry an optional `database` field. When omitted
//! (or empty) the command addresses the default database. A command naming
//! a non-default database must arrive with a matching routing indicator in
//! its [`RequestContext`](crate::RequestContext); the executor rejects it
//! otherwise, before any store access.
//!
//! # Namespace field
//!
//! `Lookup`, `RunQuery`, and `RunAggregationQuery` take an optional
//! `namespace` applied to keys and queries that leave their partition
//! unset.

use serde::{Deserialize, Serialize};

use mirage_core::Key;
use mirage_engine::{CommitMode, Mutation, Query};

/// A self-contained, serializable operation.
///
/// | Variant | Returns |
/// |---------|---------|
/// | `Lookup` | `Output::Lookup` |
/// | `Commit` | `Output::MutationResults` |
/// | `RunQuery` | `Output::Query` |
/// | `BeginTransaction` | `Output::Transaction` |
/// | `AllocateIds` | `Output::AllocatedKeys` |
/// | `RunAggregationQuery` | `Output::Count` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Fetch entities by key.
    Lookup {
        /// Target database; `None` is the default database.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Default namespace for keys that leave their partition unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        /// Keys to fetch; all must be complete.
        keys: Vec<Key>,
    },

    /// Apply a mutation batch atomically.
    Commit {
        /// Target database; `None` is the default database.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Transactional or standalone.
        mode: CommitMode,
        /// Ordered mutation batch.
        mutations: Vec<Mutation>,
        /// Handle from `BeginTransaction`; required iff mode is transactional.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transaction: Option<String>,
    },

    /// Evaluate a query.
    RunQuery {
        /// Target database; `None` is the default database.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Default namespace if the query leaves its partition unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        /// The query.
        query: Query,
    },

    /// Open a transaction.
    BeginTransaction {
        /// Target database; `None` is the default database.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
    },

    /// Fill numeric identifiers into incomplete keys.
    AllocateIds {
        /// Target database; `None` is the default database.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Incomplete keys to resolve.
        keys: Vec<Key>,
    },

    /// Count the results of the nested query.
    RunAggregationQuery {
        /// Target database; `None` is the default database.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Default namespace if the query leaves its partition unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        /// The nested query to count.
        query: Query,
    },
}

impl Command {
    /// The database this command addresses, if it names one.
    pub fn database(&self) -> Option<&str> {
        match self {
            Command::Lookup { database, .. }
            | Command::Commit { database, .. }
            | Command::RunQuery { database, .. }
            | Command::BeginTransaction { database }
            | Command::AllocateIds { database, .. }
            | Command::RunAggregationQuery { database, .. } => database.as_deref(),
        }
    }
}
