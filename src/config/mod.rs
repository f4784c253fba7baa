// src/config/mod.rs

//! Bridge settings.
//!
//! - TOML-backed data model (`model.rs`).
//! - Loading settings and JSON step documents from disk (`loader.rs`).
//! - Validation into [`Settings`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_document, load_from_path, load_or_default};
pub use model::{ExchangeSection, InterpreterSection, RawSettings, Settings, SupervisorSection};
