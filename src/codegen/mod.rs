// src/codegen/mod.rs

//! Interpreter source generation.
//!
//! - [`command_ref`] parses `command = "pkg.sub.Class"` and lifecycle names.
//! - [`template`] holds the typed fragments and the state-loading preamble.
//! - [`generator`] picks `command` or `script` and assembles the program.

pub mod command_ref;
pub mod generator;
pub mod template;

pub use command_ref::{CommandRef, LifecycleMethod};
pub use generator::{generate, render_source, resolve_body, GeneratedSource};
