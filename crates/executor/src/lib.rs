//! Command execution layer for the Mirage emulator.
//!
//! This crate is the seam between the transport and the engine: a
//! serializable [`Command`] per logical operation, a stateless
//! [`Executor`] that validates routing and dispatches to the engine, typed
//! [`Output`] results, a serializable [`Error`] taxonomy, and the
//! high-level [`Mirage`] facade for in-process use.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod context;
mod convert;
mod error;
#[allow(clippy::module_inception)]
mod executor;
mod handlers;
mod mirage;
mod output;

pub use command::Command;
pub use context::RequestContext;
pub use error::{Error, Result};
pub use executor::Executor;
pub use mirage::Mirage;
pub use output::Output;

// Re-export the types commands are built from, so transport code and tests
// need only this crate.
pub use mirage_core::{Entity, ErrorCode, Key, LimitError, Limits, PathElement, PathId, Value};
pub use mirage_engine::{
    CommitMode, CompositeFilter, CompositeOperator, Direction, EntityStore, Filter, LookupResults,
    MoreResults, Mutation, Operator, PropertyFilter, PropertyOrder, Query, QueryResults,
    DEFAULT_TRANSACTION_TIMEOUT, KEY_PROPERTY,
};
