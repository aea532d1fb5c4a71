//! The Mirage storage engine
//!
//! Implements the mock store behind the emulator's six operations:
//! - [`store`]: entity map, counters, transaction table behind one lock
//! - [`mutation`]: atomic insert/update/upsert/delete batches
//! - [`transaction`]: handle lifecycle with timeout-based expiry
//! - [`query`]: filter/order/paginate evaluator with opaque cursors
//!
//! The engine returns structured [`mirage_core::Error`] values; the
//! surrounding command layer maps them to whatever framing it uses.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod mutation;
pub mod query;
pub mod store;
pub(crate) mod transaction;

pub use mutation::{CommitMode, Mutation};
pub use query::{
    CompositeFilter, CompositeOperator, Direction, Filter, MoreResults, Operator, PropertyFilter,
    PropertyOrder, Query, QueryResults, KEY_PROPERTY,
};
pub use store::{EntityStore, LookupResults, DEFAULT_TRANSACTION_TIMEOUT};
