//! Identifier allocation command handler.

use std::sync::Arc;

use mirage_core::Key;
use mirage_engine::EntityStore;

use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle an `AllocateIds` command.
pub(crate) fn allocate_ids(engine: &Arc<EntityStore>, keys: Vec<Key>) -> Result<Output> {
    let keys = convert_result(engine.allocate_ids(keys))?;
    Ok(Output::AllocatedKeys { keys })
}
