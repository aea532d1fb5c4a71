//! Transaction command handler.

use std::sync::Arc;

use mirage_engine::EntityStore;

use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle a `BeginTransaction` command.
pub(crate) fn begin_transaction(engine: &Arc<EntityStore>) -> Result<Output> {
    let transaction = convert_result(engine.begin_transaction())?;
    Ok(Output::Transaction { transaction })
}
