// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("task config has neither `command` nor `script`")]
    MissingExecutableSpecification,

    #[error("invalid command reference '{reference}': {reason}")]
    InvalidCommandReference { reference: String, reason: String },

    #[error("invalid lifecycle method name '{0}'")]
    InvalidLifecycleMethod(String),

    #[error("unknown task type '{0}'")]
    UnknownTaskType(String),

    #[error("could not start interpreter '{program}': {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("interpreter exited with code {exit_code}")]
    ForeignProcessFailed { exit_code: i32, output: Vec<String> },

    #[error("I/O error on interpreter {stream}: {source}")]
    ProcessIo {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode result at {path}: {reason}")]
    ResultDecode { path: String, reason: String },

    #[error("exchange file I/O error at {path}: {source}")]
    ExchangeIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invocation cancelled")]
    Cancelled,

    #[error("invocation timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`BridgeError`], for callers that only need
/// to know which stage of the invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeErrorKind {
    /// The step definition or bridge settings are unusable. Nothing ran.
    Configuration,
    /// The interpreter never started.
    Launch,
    /// The interpreter ran and failed, or its pipes broke.
    Process,
    /// The interpreter ran but left no usable result.
    Decode,
    /// An exchange artifact could not be created, written or read.
    Exchange,
    /// Stopped from outside (cancel or timeout).
    Interrupted,
    Other,
}

impl BridgeError {
    pub fn kind(&self) -> BridgeErrorKind {
        match self {
            BridgeError::MissingExecutableSpecification
            | BridgeError::InvalidCommandReference { .. }
            | BridgeError::InvalidLifecycleMethod(_)
            | BridgeError::UnknownTaskType(_)
            | BridgeError::Config(_)
            | BridgeError::Toml(_) => BridgeErrorKind::Configuration,
            BridgeError::ProcessLaunch { .. } => BridgeErrorKind::Launch,
            BridgeError::ForeignProcessFailed { .. } | BridgeError::ProcessIo { .. } => {
                BridgeErrorKind::Process
            }
            BridgeError::ResultDecode { .. } => BridgeErrorKind::Decode,
            BridgeError::ExchangeIo { .. } => BridgeErrorKind::Exchange,
            BridgeError::Cancelled | BridgeError::TimedOut { .. } => BridgeErrorKind::Interrupted,
            BridgeError::Json(_) | BridgeError::Other(_) => BridgeErrorKind::Other,
        }
    }
}

pub(crate) fn exchange_io(path: &Path, source: std::io::Error) -> BridgeError {
    BridgeError::ExchangeIo {
        path: path.display().to_string(),
        source,
    }
}

pub(crate) fn result_decode(path: &Path, reason: impl Into<String>) -> BridgeError {
    BridgeError::ResultDecode {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BridgeError>;
