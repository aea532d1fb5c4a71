//! Key types and the canonical key codec
//!
//! A [`Key`] names an entity inside a partition: an optional namespace, an
//! ancestor path, and a final (kind, identifier) element. Keys travel on the
//! wire as `{"partitionId": {"namespaceId": ...}, "path": [...]}` objects.
//!
//! ## Canonical form
//!
//! The store indexes entities by the *canonical string* of their key:
//!
//! ```text
//! namespace + "!" + kind + "/" + identifier
//! ```
//!
//! Only the final path element is encoded; ancestor elements are compared
//! structurally by [`Key::has_ancestor`], never through the canonical string
//! (single-level comparison, a known simplification). Byte-lexicographic
//! ordering of canonical strings defines the default query order and
//! key-typed filter comparisons.
//!
//! ## Completeness
//!
//! A key is *complete* iff its final path element carries an id or a name.
//! [`Key::canonical`] is the read-only half of the codec and fails on
//! incomplete keys; identifier allocation for incomplete keys is owned by
//! the store, which holds the id counter.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Identifier carried by the final element of a complete key path.
///
/// The emulated service allocates numeric ids; callers may assign either
/// form themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathId {
    /// Numeric identifier, allocated by the store or assigned by the caller.
    Id(i64),
    /// Caller-assigned string name.
    Name(String),
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathId::Id(id) => write!(f, "{}", id),
            PathId::Name(name) => write!(f, "{}", name),
        }
    }
}

/// One (kind, identifier) element of a key path.
///
/// The identifier is absent on the final element of an incomplete key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "wire::PathElementWire", into = "wire::PathElementWire")]
pub struct PathElement {
    /// The collection name this element belongs to.
    pub kind: String,
    /// The element's identifier; `None` marks an incomplete element.
    pub id: Option<PathId>,
}

impl PathElement {
    /// Element with a numeric identifier.
    pub fn with_id(kind: impl Into<String>, id: i64) -> Self {
        PathElement {
            kind: kind.into(),
            id: Some(PathId::Id(id)),
        }
    }

    /// Element with a string name.
    pub fn with_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        PathElement {
            kind: kind.into(),
            id: Some(PathId::Name(name.into())),
        }
    }

    /// Element with no identifier (the tail of an incomplete key).
    pub fn incomplete(kind: impl Into<String>) -> Self {
        PathElement {
            kind: kind.into(),
            id: None,
        }
    }
}

/// Wire representations for key path elements.
///
/// Numeric ids cross the wire as decimal strings (the int64-as-string JSON
/// convention); bare JSON numbers are accepted on input.
mod wire {
    use serde::{Deserialize, Serialize};

    use super::{PathElement, PathId};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum IdRepr {
        Int(i64),
        Str(String),
    }

    #[derive(Serialize, Deserialize)]
    pub struct PathElementWire {
        pub kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub id: Option<IdRepr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
    }

    impl TryFrom<PathElementWire> for PathElement {
        type Error = String;

        fn try_from(wire: PathElementWire) -> Result<Self, String> {
            let id = match (wire.id, wire.name) {
                (Some(_), Some(_)) => {
                    return Err("path element carries both an id and a name".to_string())
                }
                (Some(IdRepr::Int(id)), None) => Some(PathId::Id(id)),
                (Some(IdRepr::Str(s)), None) => Some(PathId::Id(
                    s.parse::<i64>()
                        .map_err(|_| format!("path element id is not an int64: {:?}", s))?,
                )),
                (None, Some(name)) => Some(PathId::Name(name)),
                (None, None) => None,
            };
            Ok(PathElement {
                kind: wire.kind,
                id,
            })
        }
    }

    impl From<PathElement> for PathElementWire {
        fn from(element: PathElement) -> Self {
            let (id, name) = match element.id {
                Some(PathId::Id(id)) => (Some(IdRepr::Str(id.to_string())), None),
                Some(PathId::Name(name)) => (None, Some(name)),
                None => (None, None),
            };
            PathElementWire {
                kind: element.kind,
                id,
                name,
            }
        }
    }
}

/// Hierarchical entity key: namespace plus an ordered (kind, id) path.
///
/// The final path element is the key's own kind and identifier; any
/// preceding elements form the ancestor path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Partition namespace; the empty string selects the default partition.
    #[serde(
        rename = "partitionId",
        default,
        with = "partition",
        skip_serializing_if = "String::is_empty"
    )]
    pub namespace: String,
    /// Ancestor elements followed by the key's own element.
    #[serde(default)]
    pub path: Vec<PathElement>,
}

/// Maps the `namespace` field to/from the wire `partitionId` object.
///
/// Other partition fields (project, database) are accepted and ignored;
/// multi-database sharding beyond the namespace tag is out of scope.
mod partition {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize, Default)]
    struct PartitionId {
        #[serde(
            rename = "namespaceId",
            default,
            skip_serializing_if = "String::is_empty"
        )]
        namespace_id: String,
    }

    pub fn serialize<S: Serializer>(namespace: &str, serializer: S) -> Result<S::Ok, S::Error> {
        PartitionId {
            namespace_id: namespace.to_string(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(PartitionId::deserialize(deserializer)?.namespace_id)
    }
}

impl Key {
    /// Root-level key with a numeric identifier, default namespace.
    pub fn with_id(kind: impl Into<String>, id: i64) -> Self {
        Key {
            namespace: String::new(),
            path: vec![PathElement::with_id(kind, id)],
        }
    }

    /// Root-level key with a string name, default namespace.
    pub fn with_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Key {
            namespace: String::new(),
            path: vec![PathElement::with_name(kind, name)],
        }
    }

    /// Root-level incomplete key awaiting identifier allocation.
    pub fn incomplete(kind: impl Into<String>) -> Self {
        Key {
            namespace: String::new(),
            path: vec![PathElement::incomplete(kind)],
        }
    }

    /// Move this key into a namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Child key of `self` with the given element appended to the path.
    ///
    /// The child inherits the parent's namespace.
    pub fn child(&self, element: PathElement) -> Self {
        let mut path = self.path.clone();
        path.push(element);
        Key {
            namespace: self.namespace.clone(),
            path,
        }
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

    /// The key's own kind (final path element), if the path is non-empty.
    pub fn kind(&self) -> Option<&str> {
        self.path.last().map(|element| element.kind.as_str())
    }

    /// The key's own identifier, if complete.
    pub fn id(&self) -> Option<&PathId> {
        self.path.last().and_then(|element| element.id.as_ref())
    }

    /// A key is complete iff its final path element carries an identifier.
    ///
    /// Keys with no path at all are malformed, not incomplete.
    pub fn is_complete(&self) -> bool {
        matches!(self.path.last(), Some(element) if element.id.is_some())
    }

    /// Read-only canonical string codec.
    ///
    /// Fails with `MalformedKey` on pathless or incomplete keys; callers
    /// needing allocation go through the store, which owns the id counter.
    pub fn canonical(&self) -> Result<String> {
        let element = self.path.last().ok_or_else(|| Error::MalformedKey {
            reason: "key has no path elements".to_string(),
        })?;
        let id = element.id.as_ref().ok_or_else(|| Error::MalformedKey {
            reason: format!("incomplete key: no identifier for kind {:?}", element.kind),
        })?;
        Ok(format!("{}!{}/{}", self.namespace, element.kind, id))
    }

    /// Ancestor-prefix test.
    ///
    /// True iff `ancestor`'s (kind, identifier) path is a prefix of this
    /// key's path in the same namespace. A key passes the test against
    /// itself. Pathless ancestors never match.
    pub fn has_ancestor(&self, ancestor: &Key) -> bool {
        if ancestor.path.is_empty() || self.namespace != ancestor.namespace {
            return false;
        }
        if self.path.len() < ancestor.path.len() {
            return false;
        }
        self.path
            .iter()
            .zip(ancestor.path.iter())
            .all(|(own, theirs)| own == theirs)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}!", self.namespace)?;
        }
        for (index, element) in self.path.iter().enumerate() {
            if index > 0 {
                write!(f, "/")?;
            }
            match &element.id {
                Some(id) => write!(f, "{}:{}", element.kind, id)?,
                None => write!(f, "{}:#", element.kind)?,
            }
        }
        Ok(())
    }
}
