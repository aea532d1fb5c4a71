//! Error types for the Mirage engine
//!
//! Every engine failure is one of the variants below, and every variant maps
//! to exactly one machine-readable [`ErrorCode`] from the emulated service's
//! taxonomy. The transport layer frames the code and message however it
//! likes; the engine does not depend on a particular wire format.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable error classification.
///
/// The four codes the emulated service distinguishes; each [`Error`]
/// variant maps to exactly one via [`Error::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed request, missing routing, oversized payload, bad cursor.
    InvalidArgument,
    /// Insert over a live entity.
    AlreadyExists,
    /// Update of a missing entity.
    NotFound,
    /// Transaction expired at commit time.
    Aborted,
}

impl ErrorCode {
    /// Wire spelling of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Aborted => "ABORTED",
        }
    }
}

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Key cannot be resolved to a canonical string.
    #[error("malformed key: {reason}")]
    MalformedKey {
        /// What made the key unusable.
        reason: String,
    },

    /// A named database was addressed without a routing indicator.
    #[error("database {database:?} was addressed without a routing indicator")]
    MissingDatabaseRouting {
        /// The database the request named.
        database: String,
    },

    /// Canonical key string exceeds the key size ceiling.
    #[error("key too long: {actual} bytes exceeds maximum {max}")]
    KeyTooLong {
        /// Actual canonical key length in bytes.
        actual: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Serialized entity exceeds the entity size ceiling.
    #[error("entity too large: {actual} bytes exceeds maximum {max}")]
    EntityTooLarge {
        /// Actual serialized size in bytes.
        actual: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Commit batch exceeds the per-commit mutation ceiling.
    #[error("too many mutations: {actual} exceeds maximum {max}")]
    TooManyMutations {
        /// Mutations in the rejected batch.
        actual: usize,
        /// Maximum allowed per commit.
        max: usize,
    },

    /// Cursor token failed to decode.
    #[error("invalid cursor: {reason}")]
    InvalidCursor {
        /// Why the token was rejected.
        reason: String,
    },

    /// Transaction handle is unknown to the store.
    ///
    /// Surfaced as `INVALID_ARGUMENT` per emulated-service convention.
    #[error("transaction is invalid or was never started: {handle}")]
    TransactionInvalid {
        /// The offending handle.
        handle: String,
    },

    /// Transaction handle outlived the fixed timeout.
    #[error("transaction expired: {handle}")]
    TransactionExpired {
        /// The expired handle.
        handle: String,
    },

    /// Insert targeted a canonical key that already holds a live entity.
    #[error("entity already exists: {key}")]
    EntityAlreadyExists {
        /// Display form of the conflicting key.
        key: String,
    },

    /// Update targeted a canonical key with no live entity.
    #[error("entity not found: {key}")]
    EntityNotFound {
        /// Display form of the missing key.
        key: String,
    },

    /// Any other malformed request.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was malformed.
        reason: String,
    },
}

impl Error {
    /// The machine-readable code this error reports to the transport.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::MalformedKey { .. }
            | Error::MissingDatabaseRouting { .. }
            | Error::KeyTooLong { .. }
            | Error::EntityTooLarge { .. }
            | Error::TooManyMutations { .. }
            | Error::InvalidCursor { .. }
            | Error::TransactionInvalid { .. }
            | Error::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Error::EntityAlreadyExists { .. } => ErrorCode::AlreadyExists,
            Error::EntityNotFound { .. } => ErrorCode::NotFound,
            Error::TransactionExpired { .. } => ErrorCode::Aborted,
        }
    }
}
