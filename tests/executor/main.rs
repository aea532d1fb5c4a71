//! Executor integration suite
//!
//! Exercises the command surface: dispatch of every Command variant,
//! routing validation, wire shapes, and the typed facade.

mod common;
mod wire_shapes;
