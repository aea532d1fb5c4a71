//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: each variant carries typed detail fields
//! - **Serializable**: convertible to/from JSON for the transport layer
//! - **Classified**: [`Error::code`] gives the machine-readable kind the
//!   emulated service distinguishes
//!
//! Engine errors convert losslessly via `From<mirage_core::Error>`;
//! `Internal` is reserved for impossible command/output pairings and never
//! surfaces from a well-formed engine.

use serde::{Deserialize, Serialize};

/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Command execution errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    /// Malformed request: bad key, oversized payload, missing routing,
    /// unusable cursor, unknown transaction handle.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was malformed.
        reason: String,
    },

    /// Insert over a live entity.
    #[error("entity already exists: {key}")]
    AlreadyExists {
        /// Display form of the conflicting key.
        key: String,
    },

    /// Update of a missing entity.
    #[error("entity not found: {key}")]
    NotFound {
        /// Display form of the missing key.
        key: String,
    },

    /// Transaction expired at commit time.
    #[error("transaction aborted: {reason}")]
    Aborted {
        /// Why the transaction aborted.
        reason: String,
    },

    /// Bug or invariant violation; not part of the emulated taxonomy.
    #[error("internal error: {reason}")]
    Internal {
        /// What went wrong.
        reason: String,
    },
}

impl Error {
    /// Machine-readable error kind for the transport layer.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Error::AlreadyExists { .. } => "ALREADY_EXISTS",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Aborted { .. } => "ABORTED",
            Error::Internal { .. } => "INTERNAL",
        }
    }
}
