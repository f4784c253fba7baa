// src/codegen/command_ref.rs

//! Parsing of the `command` shorthand (`pkg.sub.ClassName`) and of
//! lifecycle method names.
//!
//! Every segment ends up spliced into interpreter source, so each one must
//! be a plain identifier. Anything else is rejected before a file is
//! allocated or a process is launched.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{BridgeError, Result};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid")
});

const RESERVED_WORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s) && !RESERVED_WORDS.contains(&s)
}

/// A parsed dotted class reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRef {
    module_path: Vec<String>,
    symbol: String,
}

impl CommandRef {
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |reason: String| BridgeError::InvalidCommandReference {
            reference: reference.to_string(),
            reason,
        };

        let mut segments: Vec<String> = reference.split('.').map(str::to_string).collect();

        if let Some(bad) = segments.iter().find(|s| !is_identifier(s)) {
            let reason = if bad.is_empty() {
                "empty segment".to_string()
            } else {
                format!("'{}' is not an identifier", bad)
            };
            return Err(invalid(reason));
        }

        // split() always yields at least one segment.
        let symbol = segments.pop().unwrap_or_default();
        Ok(Self {
            module_path: segments,
            symbol,
        })
    }

    /// Module path joined with `.`, or `None` for a bare symbol.
    pub fn module(&self) -> Option<String> {
        if self.module_path.is_empty() {
            None
        } else {
            Some(self.module_path.join("."))
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// Name of the method called on the constructed task object.
///
/// Only `run` is used by the bundled executor; other names are accepted so
/// that further lifecycle phases can be driven through the same generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleMethod(String);

impl LifecycleMethod {
    pub fn run() -> Self {
        Self("run".to_string())
    }

    pub fn parse(name: &str) -> Result<Self> {
        if is_identifier(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(BridgeError::InvalidLifecycleMethod(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LifecycleMethod {
    fn default() -> Self {
        Self::run()
    }
}

impl fmt::Display for LifecycleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
