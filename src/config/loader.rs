// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::config::model::{RawSettings, Settings};
use crate::errors::{exchange_io, BridgeError, Result};
use crate::types::Document;

/// Load a settings file and return the raw `RawSettings`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the checked form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| BridgeError::Config(format!("reading settings {:?}: {}", path, e)))?;

    let raw: RawSettings = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a settings file and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let raw = load_from_path(&path)?;
    Settings::try_from(raw)
}

/// Load settings from `path` if given, otherwise fall back to
/// `TASKBRIDGE_SETTINGS`, otherwise use the built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Settings> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("TASKBRIDGE_SETTINGS").map(PathBuf::from));

    match path {
        Some(p) => load_and_validate(p),
        None => Ok(Settings::default()),
    }
}

/// Read a JSON document (a top-level object) such as a step config or a
/// params file.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| exchange_io(path, e))?;
    Ok(codec::decode_document(&bytes)?)
}
