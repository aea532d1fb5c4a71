//! The query engine
//!
//! Evaluates property/composite/ancestor/key filters over a full scan of
//! the entity store, then orders, paginates, and optionally strips the
//! results to keys only.
//!
//! ## Pipeline
//!
//! 1. kind and namespace equality over the scan;
//! 2. filter tree evaluation (plain recursion over the tagged tree);
//! 3. sort: ascending canonical key string by default, or the caller's
//!    order list evaluated field-by-field until a tie breaks, unresolved
//!    ties falling back to canonical-key order so results stay
//!    deterministic;
//! 4. skip `offset` plus the cursor-decoded position;
//! 5. truncate to `limit` when positive;
//! 6. emit an end cursor and "more results after limit" iff the limit
//!    truncated, else "no more results";
//! 7. keys-only projection strips properties.
//!
//! ## Lenient filters
//!
//! Structurally unrecognized filter fragments, unknown operators, and empty
//! composites all match everything instead of erroring. This reproduces the
//! emulated service's mock behavior and avoids over-constraining
//! unsupported syntax; it can also mask caller bugs, which is why decode
//! fallbacks are logged.

use std::cmp::Ordering;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use mirage_core::{Entity, Error, Result, Value};

use crate::store::StoreInner;

/// The reserved property naming the entity key in filters, orders, and
/// projections.
pub const KEY_PROPERTY: &str = "__key__";

// ============================================================================
// Query model
// ============================================================================

/// A query over one kind (or all kinds) within one namespace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    /// Partition namespace; empty selects the default partition.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Kind to match; `None` runs a kindless query over every kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Optional filter tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Explicit orderings, highest priority first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<PropertyOrder>,
    /// Projected properties; exactly `["__key__"]` selects keys-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projection: Vec<String>,
    /// Results to skip after sorting.
    #[serde(default)]
    pub offset: u32,
    /// Maximum results to return; non-positive means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Cursor from a previous run of the same query.
    #[serde(default, rename = "startCursor", skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

impl Query {
    /// Query over one kind in the default namespace.
    pub fn new(kind: impl Into<String>) -> Self {
        Query {
            kind: Some(kind.into()),
            ..Query::default()
        }
    }

    /// Kindless query matching entities of every kind.
    pub fn kindless() -> Self {
        Query::default()
    }

    /// Scope to a namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Attach a filter tree.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Append an ordering, lower priority than those already present.
    pub fn order_by(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.order.push(PropertyOrder {
            property: property.into(),
            direction,
        });
        self
    }

    /// Truncate to at most `limit` results.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` results.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Resume from a cursor returned by a previous run.
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.start_cursor = Some(cursor.into());
        self
    }

    /// Return keys only, properties stripped.
    pub fn keys_only(mut self) -> Self {
        self.projection = vec![KEY_PROPERTY.to_string()];
        self
    }

    /// Fill an empty namespace from a request-level default, if any.
    pub fn qualify(mut self, namespace: Option<&str>) -> Self {
        if self.namespace.is_empty() {
            if let Some(ns) = namespace {
                self.namespace = ns.to_string();
            }
        }
        self
    }

    fn is_keys_only(&self) -> bool {
        self.projection.len() == 1 && self.projection[0] == KEY_PROPERTY
    }
}

/// Comparison operators for property filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// Exact equality.
    Equal,
    /// Strictly greater.
    GreaterThan,
    /// Greater or equal.
    GreaterThanOrEqual,
    /// Strictly less.
    LessThan,
    /// Less or equal.
    LessThanOrEqual,
    /// Ancestor-prefix test; only meaningful on the key property.
    HasAncestor,
    /// Any operator this engine does not implement; matches everything.
    Unsupported,
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Unknown operator spellings fold into Unsupported (lenient policy).
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "EQUAL" => Operator::Equal,
            "GREATER_THAN" => Operator::GreaterThan,
            "GREATER_THAN_OR_EQUAL" => Operator::GreaterThanOrEqual,
            "LESS_THAN" => Operator::LessThan,
            "LESS_THAN_OR_EQUAL" => Operator::LessThanOrEqual,
            "HAS_ANCESTOR" => Operator::HasAncestor,
            _ => Operator::Unsupported,
        })
    }
}

/// Filter on a single property (or the reserved key property).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Property name; `__key__` addresses the entity key.
    pub property: String,
    /// Comparison operator.
    pub op: Operator,
    /// Comparand.
    pub value: Value,
}

/// How a composite filter combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositeOperator {
    /// Every child must pass; short-circuits on the first failure.
    And,
    /// Any child may pass; short-circuits on the first success.
    Or,
    /// Unknown combinator; matches everything.
    Unsupported,
}

impl<'de> Deserialize<'de> for CompositeOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Unknown combinator spellings fold into Unsupported (lenient policy).
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "AND" => CompositeOperator::And,
            "OR" => CompositeOperator::Or,
            _ => CompositeOperator::Unsupported,
        })
    }
}

/// A filter combining children with AND/OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFilter {
    /// The combinator.
    pub op: CompositeOperator,
    /// Child filters; an empty list matches everything.
    #[serde(default)]
    pub filters: Vec<Filter>,
}

/// A filter tree node.
///
/// Wire shape is single-tag: `{"propertyFilter": {...}}` or
/// `{"compositeFilter": {...}}`. Anything else decodes to `Unsupported`
/// and matches everything (lenient policy).
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Leaf comparison.
    Property(PropertyFilter),
    /// AND/OR combination.
    Composite(CompositeFilter),
    /// Unrecognized fragment, kept verbatim; matches everything.
    Unsupported(serde_json::Value),
}

impl Filter {
    /// Leaf filter on a property.
    pub fn property(property: impl Into<String>, op: Operator, value: Value) -> Self {
        Filter::Property(PropertyFilter {
            property: property.into(),
            op,
            value,
        })
    }

    /// Filter on the reserved key property.
    pub fn key(op: Operator, key: mirage_core::Key) -> Self {
        Filter::property(KEY_PROPERTY, op, Value::Key(key))
    }

    /// Ancestor-prefix filter.
    pub fn has_ancestor(key: mirage_core::Key) -> Self {
        Filter::key(Operator::HasAncestor, key)
    }

    /// AND of the given children.
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::Composite(CompositeFilter {
            op: CompositeOperator::And,
            filters,
        })
    }

    /// OR of the given children.
    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Composite(CompositeFilter {
            op: CompositeOperator::Or,
            filters,
        })
    }

    /// Decode a raw filter tree, falling back to `Unsupported` on any
    /// structurally unrecognized fragment.
    pub fn from_wire(raw: serde_json::Value) -> Filter {
        if let Some(fields) = raw.as_object() {
            if let Some(inner) = fields.get("propertyFilter") {
                if let Ok(filter) = serde_json::from_value::<PropertyFilter>(inner.clone()) {
                    return Filter::Property(filter);
                }
            }
            if let Some(inner) = fields.get("compositeFilter") {
                if let Ok(filter) = serde_json::from_value::<CompositeFilter>(inner.clone()) {
                    return Filter::Composite(filter);
                }
            }
        }
        tracing::warn!("unrecognized filter fragment treated as match-all");
        Filter::Unsupported(raw)
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        match self {
            Filter::Property(filter) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("propertyFilter", filter)?;
                map.end()
            }
            Filter::Composite(filter) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("compositeFilter", filter)?;
                map.end()
            }
            Filter::Unsupported(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(Filter::from_wire(raw))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// One element of a query's order list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyOrder {
    /// Property to compare.
    pub property: String,
    /// Direction; ascending when omitted on the wire.
    #[serde(default)]
    pub direction: Direction,
}

/// Whether a result set was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoreResults {
    /// The limit truncated the result set; resume with the end cursor.
    MoreResultsAfterLimit,
    /// Every matching result was returned.
    NoMoreResults,
}

/// A query response page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    /// Matching entities in final order.
    pub entities: Vec<Entity>,
    /// Cursor to the next unread result, present iff truncated by limit.
    #[serde(default, rename = "endCursor", skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
    /// Exhaustion marker.
    #[serde(rename = "moreResults")]
    pub more_results: MoreResults,
}

// ============================================================================
// Cursors
// ============================================================================

/// Opaque cursor codec.
///
/// A cursor encodes a zero-based offset into the query's deterministic
/// order. Re-running the same query over unmodified data with a returned
/// cursor resumes at exactly the next unread result.
pub(crate) mod cursor {
    use super::*;

    const PREFIX: &str = "offset:";

    pub(crate) fn encode(offset: usize) -> String {
        BASE64.encode(format!("{}{}", PREFIX, offset))
    }

    pub(crate) fn decode(token: &str) -> Result<usize> {
        let bytes = BASE64.decode(token).map_err(|_| Error::InvalidCursor {
            reason: "token is not valid base64".to_string(),
        })?;
        let text = String::from_utf8(bytes).map_err(|_| Error::InvalidCursor {
            reason: "token is not valid UTF-8".to_string(),
        })?;
        text.strip_prefix(PREFIX)
            .and_then(|rest| rest.parse::<usize>().ok())
            .ok_or_else(|| Error::InvalidCursor {
                reason: "token does not encode an offset".to_string(),
            })
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Run the whole pipeline over the locked store state.
pub(crate) fn execute(inner: &StoreInner, query: &Query) -> Result<QueryResults> {
    let cursor_offset = match &query.start_cursor {
        Some(token) => cursor::decode(token)?,
        None => 0,
    };

    // Scan order is ascending canonical key string, which is the
    // deterministic default order; the explicit sort below is stable, so
    // unresolved ties keep it.
    let mut matched: Vec<&Entity> = inner
        .scan()
        .map(|(_, entity)| entity)
        .filter(|entity| {
            entity.key.namespace == query.namespace
                && query
                    .kind
                    .as_deref()
                    .map_or(true, |kind| entity.key.kind() == Some(kind))
        })
        .filter(|entity| {
            query
                .filter
                .as_ref()
                .map_or(true, |filter| eval_filter(filter, entity))
        })
        .collect();

    if !query.order.is_empty() {
        matched.sort_by(|a, b| compare_entities(a, b, &query.order));
    }

    let total = matched.len();
    let skip = cursor_offset + query.offset as usize;
    let limit = query.limit.filter(|l| *l > 0).map(|l| l as usize);

    let page: Vec<&Entity> = match limit {
        Some(limit) => matched.into_iter().skip(skip).take(limit).collect(),
        None => matched.into_iter().skip(skip).collect(),
    };

    let consumed = skip.min(total) + page.len();
    let truncated = consumed < total;
    let (end_cursor, more_results) = if truncated {
        (
            Some(cursor::encode(consumed)),
            MoreResults::MoreResultsAfterLimit,
        )
    } else {
        (None, MoreResults::NoMoreResults)
    };

    let entities = if query.is_keys_only() {
        page.into_iter().map(Entity::keys_only).collect()
    } else {
        page.into_iter().cloned().collect()
    };

    Ok(QueryResults {
        entities,
        end_cursor,
        more_results,
    })
}

/// Recursive filter evaluation over the tagged tree.
fn eval_filter(filter: &Filter, entity: &Entity) -> bool {
    match filter {
        Filter::Property(property) => eval_property_filter(property, entity),
        Filter::Composite(composite) => match composite.op {
            CompositeOperator::And => composite
                .filters
                .iter()
                .all(|child| eval_filter(child, entity)),
            // An empty OR is a malformed fragment and passes (lenient).
            CompositeOperator::Or => {
                composite.filters.is_empty()
                    || composite
                        .filters
                        .iter()
                        .any(|child| eval_filter(child, entity))
            }
            CompositeOperator::Unsupported => true,
        },
        Filter::Unsupported(_) => true,
    }
}

fn eval_property_filter(filter: &PropertyFilter, entity: &Entity) -> bool {
    if filter.property == KEY_PROPERTY {
        return eval_key_filter(filter, entity);
    }
    match filter.op {
        // HAS_ANCESTOR only applies to the key property; elsewhere the
        // fragment is malformed and passes.
        Operator::HasAncestor | Operator::Unsupported => true,
        op => {
            let value = match entity.property(&filter.property) {
                Some(value) => value,
                None => return false,
            };
            match filter_cmp(value, &filter.value) {
                Some(ordering) => op_matches(op, ordering),
                None => false,
            }
        }
    }
}

/// Filters on the reserved key property compare canonical strings;
/// HAS_ANCESTOR is the structural path-prefix test.
fn eval_key_filter(filter: &PropertyFilter, entity: &Entity) -> bool {
    match filter.op {
        Operator::HasAncestor => match filter.value.as_key() {
            Some(ancestor) => entity.key.has_ancestor(ancestor),
            // Non-key comparand: malformed fragment, passes.
            None => true,
        },
        Operator::Unsupported => true,
        op => {
            let comparand = match filter.value.as_key().map(|key| key.canonical()) {
                Some(Ok(canonical)) => canonical,
                // Non-key or incomplete comparand: malformed fragment, passes.
                _ => return true,
            };
            match entity.key.canonical() {
                Ok(own) => op_matches(op, own.as_str().cmp(comparand.as_str())),
                Err(_) => false,
            }
        }
    }
}

fn op_matches(op: Operator, ordering: Ordering) -> bool {
    match op {
        Operator::Equal => ordering == Ordering::Equal,
        Operator::GreaterThan => ordering == Ordering::Greater,
        Operator::GreaterThanOrEqual => ordering != Ordering::Less,
        Operator::LessThan => ordering == Ordering::Less,
        Operator::LessThanOrEqual => ordering != Ordering::Greater,
        Operator::HasAncestor | Operator::Unsupported => true,
    }
}

/// Comparison used by filters: `None` when the types differ or either side
/// is non-primitive, and such filters do not match.
fn filter_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(y),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Comparison used by ordering: mismatched types compare as equal (a
/// documented limitation), so the canonical-key fallback decides.
fn order_cmp(a: &Value, b: &Value) -> Ordering {
    filter_cmp(a, b).unwrap_or(Ordering::Equal)
}

/// Walk the order list in caller priority until a tie breaks. Entities
/// missing a named property tie on that field.
fn compare_entities(a: &Entity, b: &Entity, order: &[PropertyOrder]) -> Ordering {
    for property_order in order {
        let (Some(left), Some(right)) = (
            a.property(&property_order.property),
            b.property(&property_order.property),
        ) else {
            continue;
        };
        let mut ordering = order_cmp(left, right);
        if property_order.direction == Direction::Descending {
            ordering = ordering.reverse();
        }
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
