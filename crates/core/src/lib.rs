//! Core types for the Mirage emulator
//!
//! This crate defines the foundational types shared by the engine and the
//! command surface:
//! - Key / PathElement / PathId: hierarchical entity keys and the canonical
//!   string codec
//! - Value: tagged property values with an explicit unsupported variant
//! - Entity: key plus property bag
//! - Error / ErrorCode: the engine's error taxonomy
//! - Limits: entity/key/batch size ceilings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod error;
pub mod key;
pub mod limits;
pub mod value;

// Re-export commonly used types
pub use entity::Entity;
pub use error::{Error, ErrorCode, Result};
pub use key::{Key, PathElement, PathId};
pub use limits::{LimitError, Limits};
pub use value::Value;
