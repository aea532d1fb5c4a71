//! The Executor - single entry point to the Mirage engine.
//!
//! The Executor is a stateless dispatcher: it validates database routing,
//! routes commands to the appropriate handler, and converts engine results
//! to outputs. All state lives in the engine.

use std::sync::Arc;

use mirage_core::Error as EngineError;
use mirage_engine::EntityStore;

use crate::{handlers, Command, Output, RequestContext, Result};

/// The command executor - single entry point to the Mirage engine.
///
/// # Thread safety
///
/// Executor is `Send + Sync` and can be shared across request threads; the
/// engine's lock serializes what must serialize.
///
/// # Example
///
/// ```
/// use mirage_executor::{Command, Executor, RequestContext};
/// use mirage_engine::EntityStore;
/// use std::sync::Arc;
///
/// let executor = Executor::new(Arc::new(EntityStore::new()));
/// let output = executor.execute(
///     &RequestContext::new(),
///     Command::BeginTransaction { database: None },
/// );
/// assert!(output.is_ok());
/// ```
pub struct Executor {
    engine: Arc<EntityStore>,
}

impl Executor {
    /// Create an executor over the given engine.
    pub fn new(engine: Arc<EntityStore>) -> Self {
        Self { engine }
    }

    /// The engine this executor dispatches to.
    pub fn engine(&self) -> &Arc<EntityStore> {
        &self.engine
    }

    /// Execute a single command.
    ///
    /// Routing is validated first: a command naming a non-default database
    /// whose context lacks a matching routing indicator is rejected before
    /// any store access.
    pub fn execute(&self, ctx: &RequestContext, cmd: Command) -> Result<Output> {
        require_database_routing(ctx, cmd.database())?;

        match cmd {
            Command::Lookup {
                namespace, keys, ..
            } => handlers::lookup::lookup(&self.engine, namespace, keys),
            Command::Commit {
                mode,
                mutations,
                transaction,
                ..
            } => handlers::commit::commit(&self.engine, mode, mutations, transaction),
            Command::RunQuery {
                namespace, query, ..
            } => handlers::query::run_query(&self.engine, namespace, query),
            Command::BeginTransaction { .. } => {
                handlers::transaction::begin_transaction(&self.engine)
            }
            Command::AllocateIds { keys, .. } => {
                handlers::allocate::allocate_ids(&self.engine, keys)
            }
            Command::RunAggregationQuery {
                namespace, query, ..
            } => handlers::query::run_aggregation_query(&self.engine, namespace, query),
        }
    }
}

/// A named database must arrive with a matching routing indicator; checked
/// before the store is touched.
fn require_database_routing(ctx: &RequestContext, database: Option<&str>) -> Result<()> {
    let database = database.unwrap_or("");
    if database.is_empty() {
        return Ok(());
    }
    match ctx.routing.as_deref() {
        Some(routed) if routed == database => Ok(()),
        _ => {
            tracing::debug!(database, "rejecting command without routing indicator");
            Err(EngineError::MissingDatabaseRouting {
                database: database.to_string(),
            }
            .into())
        }
    }
}
