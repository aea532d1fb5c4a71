//! Query and aggregation command handlers.

use std::sync::Arc;

use mirage_engine::{EntityStore, Query};

use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle a `RunQuery` command.
pub(crate) fn run_query(
    engine: &Arc<EntityStore>,
    namespace: Option<String>,
    query: Query,
) -> Result<Output> {
    let query = query.qualify(namespace.as_deref());
    let results = convert_result(engine.run_query(&query))?;
    Ok(Output::Query(results))
}

/// Handle a `RunAggregationQuery` command.
pub(crate) fn run_aggregation_query(
    engine: &Arc<EntityStore>,
    namespace: Option<String>,
    query: Query,
) -> Result<Output> {
    let query = query.qualify(namespace.as_deref());
    let count = convert_result(engine.run_aggregation_query(&query))?;
    Ok(Output::Count { count })
}
