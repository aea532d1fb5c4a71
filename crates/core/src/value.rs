//! Property value types
//!
//! [`Value`] is the tagged union stored in entity property bags. The engine
//! interprets the four primitive kinds plus key references; every other wire
//! payload is carried verbatim in the [`Value::Unsupported`] variant rather
//! than silently collapsing to a zero value.
//!
//! ## Wire shape
//!
//! Values cross the wire as single-tag objects in the emulated service's
//! convention:
//!
//! ```text
//! {"nullValue": null}      {"booleanValue": true}
//! {"integerValue": "42"}   {"doubleValue": 1.5}
//! {"stringValue": "abc"}   {"keyValue": {...}}
//! ```
//!
//! Integers are emitted as decimal strings (int64-as-string convention) and
//! accepted as either strings or bare numbers. A tagged payload of the wrong
//! shape is not an error: it lands in `Unsupported` as-is, consistent with
//! the store's policy of never reinterpreting what it did not understand.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::key::Key;

/// A property value: interpreted primitives plus an opaque escape hatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean true or false.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit IEEE-754 floating point.
    Double(f64),
    /// UTF-8 string.
    Str(String),
    /// Reference to another entity's key.
    Key(Key),
    /// Any wire payload the engine does not interpret, stored as-is.
    Unsupported(serde_json::Value),
}

impl Value {
    /// Type name for error messages and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Key(_) => "key",
            Value::Unsupported(_) => "unsupported",
        }
    }

    /// Try to get as bool.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as key reference.
    pub fn as_key(&self) -> Option<&Key> {
        match self {
            Value::Key(k) => Some(k),
            _ => None,
        }
    }

    /// Decode a raw wire tree into a value.
    ///
    /// Recognized single-tag objects become typed variants; everything else
    /// (arrays, entity values, blobs, timestamps, malformed tags) is kept
    /// verbatim as `Unsupported`.
    pub fn from_wire(raw: serde_json::Value) -> Value {
        if let serde_json::Value::Object(fields) = &raw {
            if fields.contains_key("nullValue") {
                return Value::Null;
            }
            if let Some(tagged) = fields.get("booleanValue") {
                if let Some(b) = tagged.as_bool() {
                    return Value::Boolean(b);
                }
            }
            if let Some(tagged) = fields.get("integerValue") {
                if let Some(i) = tagged.as_i64() {
                    return Value::Integer(i);
                }
                if let Some(s) = tagged.as_str() {
                    if let Ok(i) = s.parse::<i64>() {
                        return Value::Integer(i);
                    }
                }
            }
            if let Some(tagged) = fields.get("doubleValue") {
                if let Some(f) = tagged.as_f64() {
                    return Value::Double(f);
                }
            }
            if let Some(tagged) = fields.get("stringValue") {
                if let Some(s) = tagged.as_str() {
                    return Value::Str(s.to_string());
                }
            }
            if let Some(tagged) = fields.get("keyValue") {
                if let Ok(key) = serde_json::from_value::<Key>(tagged.clone()) {
                    return Value::Key(key);
                }
            }
        }
        Value::Unsupported(raw)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        fn tagged<S: Serializer, V: Serialize>(
            serializer: S,
            tag: &str,
            value: &V,
        ) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(tag, value)?;
            map.end()
        }

        match self {
            Value::Null => tagged(serializer, "nullValue", &serde_json::Value::Null),
            Value::Boolean(b) => tagged(serializer, "booleanValue", b),
            Value::Integer(i) => tagged(serializer, "integerValue", &i.to_string()),
            Value::Double(f) => tagged(serializer, "doubleValue", f),
            Value::Str(s) => tagged(serializer, "stringValue", s),
            Value::Key(k) => tagged(serializer, "keyValue", k),
            Value::Unsupported(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from_wire(raw))
    }
}
