//! Output enum: one typed result per command family.

use serde::{Deserialize, Serialize};

use mirage_core::Key;
use mirage_engine::{LookupResults, QueryResults};

/// Result of a successfully executed [`Command`](crate::Command).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// Entities found and keys missed, from `Lookup`.
    Lookup(LookupResults),

    /// Per-mutation result keys in submission order, from `Commit`.
    MutationResults {
        /// Result key per mutation, identifier-filled where allocated.
        keys: Vec<Key>,
    },

    /// A query response page, from `RunQuery`.
    Query(QueryResults),

    /// Opaque transaction handle, from `BeginTransaction`.
    Transaction {
        /// The handle to pass to a later transactional `Commit`.
        transaction: String,
    },

    /// Identifier-filled keys, from `AllocateIds`.
    AllocatedKeys {
        /// Completed keys in request order.
        keys: Vec<Key>,
    },

    /// Result count, from `RunAggregationQuery`.
    Count {
        /// Number of results the nested query produced.
        count: u64,
    },
}
