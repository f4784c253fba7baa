// src/codec.rs

//! JSON encoding of the state handed to the interpreter and of the result
//! it hands back.
//!
//! Input document: exactly `config`, `params`, `state`.
//! Output document: optional `sub`, `carry_params`, `inputs`, `outputs`.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{exchange_io, result_decode, Result};
use crate::types::Document;

/// Result attributes the generated code collects, in output order.
pub const RESULT_FIELDS: [&str; 4] = ["sub", "carry_params", "inputs", "outputs"];

#[derive(Debug, Serialize)]
struct InputDocument<'a> {
    config: &'a Document,
    params: &'a Document,
    state: &'a Document,
}

/// What the interpreter reported. A missing field contributes nothing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub sub: Option<Document>,
    #[serde(default)]
    pub carry_params: Option<Document>,
    #[serde(default)]
    pub inputs: Option<Vec<Document>>,
    #[serde(default)]
    pub outputs: Option<Vec<Document>>,
}

/// Serialize the three invocation mappings into `path`, replacing its
/// contents.
pub fn write_input(path: &Path, config: &Document, params: &Document, state: &Document) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| exchange_io(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(
        &mut writer,
        &InputDocument {
            config,
            params,
            state,
        },
    )
    .map_err(|e| exchange_io(path, e.into()))?;
    writer.flush().map_err(|e| exchange_io(path, e))?;

    debug!(path = ?path, "wrote input document");
    Ok(())
}

/// Read and decode the output document at `path`.
///
/// An unreadable file is an exchange error; an empty, truncated or
/// wrongly-shaped one is a decode error.
pub fn read_output(path: &Path) -> Result<ExecutionResult> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(result_decode(path, "output file does not exist"));
        }
        Err(e) => return Err(exchange_io(path, e)),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(result_decode(path, "interpreter wrote no result"));
    }

    let result = decode_result(&bytes).map_err(|e| result_decode(path, e.to_string()))?;
    debug!(path = ?path, "decoded result document");
    Ok(result)
}

pub fn decode_result(bytes: &[u8]) -> serde_json::Result<ExecutionResult> {
    serde_json::from_slice(bytes)
}

/// Decode a top-level JSON object, as used for step documents.
pub fn decode_document(bytes: &[u8]) -> serde_json::Result<Document> {
    serde_json::from_slice(bytes)
}
