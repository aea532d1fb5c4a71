//! Transaction lifecycle tracking
//!
//! Transactions here are lifecycle markers, not isolation machinery: a
//! handle proves a transaction was opened and has not timed out. States are
//! *active* → removed, where removal happens on the commit that references
//! the handle (success or failure), or lazily once the handle's age exceeds
//! the fixed timeout. A removed handle is never reused or resurrected.
//!
//! Read-key tracking for optimistic conflict detection is deliberately
//! absent; the [`TransactionRecord`] keeps only what expiry needs.

use std::time::{Duration, Instant};

use mirage_core::{Error, Result};

use crate::store::StoreInner;

/// An active transaction: opaque handle plus creation stamp.
#[derive(Debug, Clone)]
pub(crate) struct TransactionRecord {
    /// Creation time; expiry compares elapsed wall-clock age to the timeout.
    pub(crate) created_at: Instant,
}

/// Open a transaction. Caller holds the exclusive lock.
///
/// Handles are minted from the store-owned counter and opaque to callers.
/// Records that already aged out are purged on the way.
pub(crate) fn begin(inner: &mut StoreInner, timeout: Duration) -> String {
    purge_expired(inner, timeout);
    let id = inner.next_transaction_id;
    inner.next_transaction_id += 1;
    let handle = format!("txn-{}", id);
    inner.transactions.insert(
        handle.clone(),
        TransactionRecord {
            created_at: Instant::now(),
        },
    );
    tracing::debug!(handle = handle.as_str(), "transaction opened");
    handle
}

/// Check a handle ahead of a transactional commit. Caller holds the
/// exclusive lock.
///
/// Unknown handles are `TransactionInvalid` (surfaced as an invalid
/// argument, per emulated-service convention). A known handle past the
/// timeout is removed and reported as `TransactionExpired`.
pub(crate) fn validate(inner: &mut StoreInner, handle: &str, timeout: Duration) -> Result<()> {
    let expired = match inner.transactions.get(handle) {
        None => {
            return Err(Error::TransactionInvalid {
                handle: handle.to_string(),
            })
        }
        Some(record) => record.created_at.elapsed() > timeout,
    };
    if expired {
        inner.transactions.remove(handle);
        tracing::debug!(handle, "transaction expired at commit time");
        return Err(Error::TransactionExpired {
            handle: handle.to_string(),
        });
    }
    Ok(())
}

/// Drop every record past the timeout. Caller holds the exclusive lock.
pub(crate) fn purge_expired(inner: &mut StoreInner, timeout: Duration) {
    inner
        .transactions
        .retain(|_, record| record.created_at.elapsed() <= timeout);
}
