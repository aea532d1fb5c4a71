//! Commit command handler.

use std::sync::Arc;

use mirage_engine::{CommitMode, EntityStore, Mutation};

use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle a `Commit` command.
pub(crate) fn commit(
    engine: &Arc<EntityStore>,
    mode: CommitMode,
    mutations: Vec<Mutation>,
    transaction: Option<String>,
) -> Result<Output> {
    let keys = convert_result(engine.commit(mode, mutations, transaction.as_deref()))?;
    Ok(Output::MutationResults { keys })
}
