//! Lookup command handler.

use std::sync::Arc;

use mirage_core::Key;
use mirage_engine::EntityStore;

use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle a `Lookup` command.
pub(crate) fn lookup(
    engine: &Arc<EntityStore>,
    namespace: Option<String>,
    keys: Vec<Key>,
) -> Result<Output> {
    let results = convert_result(engine.lookup(keys, namespace.as_deref()))?;
    Ok(Output::Lookup(results))
}
