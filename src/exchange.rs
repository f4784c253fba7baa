// src/exchange.rs

//! Per-invocation exchange files.
//!
//! Each invocation gets its own freshly created input and output file with
//! a random name, so concurrent invocations never share one. Both files are
//! removed when the [`ExchangeFiles`] value is dropped, whichever way the
//! invocation ended. A failed removal is logged and otherwise ignored.

use std::io;
use std::path::Path;

use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::config::ExchangeSection;
use crate::errors::{exchange_io, Result};

/// Borrowed view of the two exchange locations.
#[derive(Debug, Clone, Copy)]
pub struct ExchangePaths<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
}

#[derive(Debug)]
pub struct ExchangeFiles {
    input: Option<TempPath>,
    output: Option<TempPath>,
}

impl ExchangeFiles {
    /// Create both files (empty) under `[exchange].dir` or the system temp
    /// directory.
    pub fn allocate(section: &ExchangeSection) -> Result<Self> {
        let input = create(section, "in")?;
        // `input` is removed on drop if this fails.
        let output = create(section, "out")?;

        debug!(input = ?input, output = ?output, "allocated exchange files");
        Ok(Self {
            input: Some(input),
            output: Some(output),
        })
    }

    pub fn paths(&self) -> ExchangePaths<'_> {
        ExchangePaths {
            input: self.input_path(),
            output: self.output_path(),
        }
    }

    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or_else(|| Path::new(""))
    }

    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Remove both files now instead of at drop.
    pub fn release(mut self) {
        self.remove_all();
    }

    fn remove_all(&mut self) {
        for temp in [self.input.take(), self.output.take()].into_iter().flatten() {
            let path = temp.to_path_buf();
            match temp.close() {
                Ok(()) => debug!(path = ?path, "removed exchange file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = ?path, "exchange file already gone")
                }
                Err(e) => warn!(path = ?path, error = %e, "failed to remove exchange file"),
            }
        }
    }
}

impl Drop for ExchangeFiles {
    fn drop(&mut self) {
        self.remove_all();
    }
}

fn create(section: &ExchangeSection, direction: &str) -> Result<TempPath> {
    let prefix = format!("{}-{}-", section.prefix, direction);
    let mut builder = Builder::new();
    builder.prefix(&prefix).suffix(".tmp");

    let file = match &section.dir {
        Some(dir) => builder.tempfile_in(dir).map_err(|e| exchange_io(dir, e))?,
        None => builder
            .tempfile()
            .map_err(|e| exchange_io(&std::env::temp_dir(), e))?,
    };
    let path = file.into_temp_path();

    // The path is spliced into generated source as a string literal.
    if path.to_str().is_none() {
        return Err(exchange_io(
            &path,
            io::Error::new(io::ErrorKind::InvalidData, "exchange path is not valid UTF-8"),
        ));
    }

    Ok(path)
}
