// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::OutputForward;

/// Bridge settings as read from a TOML file.
///
/// ```toml
/// [interpreter]
/// program = "python3"
/// args = ["-"]
///
/// [exchange]
/// dir = "/var/tmp/taskbridge"
///
/// [supervisor]
/// forward_output = "log"
/// output_tail_lines = 20
/// timeout = "10m"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    #[serde(default)]
    pub interpreter: InterpreterSection,

    #[serde(default)]
    pub exchange: ExchangeSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,
}

/// `[interpreter]` section: how the foreign runtime is launched.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterpreterSection {
    /// Executable to run. Looked up on `PATH` when not absolute.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments passed before anything else. Must not name a script file;
    /// the generated source always arrives on stdin.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Extra environment variables for the child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Working directory for the child; inherits the host's when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    vec!["-".to_string()]
}

impl Default for InterpreterSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            env: BTreeMap::new(),
            working_dir: None,
        }
    }
}

/// `[exchange]` section: where the per-invocation input/output files live.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExchangeSection {
    /// Directory for exchange files; the system temp dir when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// File name prefix, followed by `-in-` / `-out-` and a random suffix.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "taskbridge".to_string()
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: default_prefix(),
        }
    }
}

/// `[supervisor]` section: output handling and the optional wait bound.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupervisorSection {
    #[serde(default)]
    pub forward_output: OutputForward,

    /// How many trailing output lines are kept for failure reports.
    #[serde(default = "default_output_tail_lines")]
    pub output_tail_lines: usize,

    /// Duration string (e.g. `"30s"`); no bound when unset.
    #[serde(default)]
    pub timeout: Option<String>,
}

fn default_output_tail_lines() -> usize {
    20
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            forward_output: OutputForward::default(),
            output_tail_lines: default_output_tail_lines(),
            timeout: None,
        }
    }
}

/// Validated bridge settings. Build one with `Settings::try_from(raw)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub interpreter: InterpreterSection,
    pub exchange: ExchangeSection,
    pub supervisor: SupervisorSection,
    timeout: Option<Duration>,
}

impl Settings {
    pub(crate) fn new_unchecked(raw: RawSettings, timeout: Option<Duration>) -> Self {
        Self {
            interpreter: raw.interpreter,
            exchange: raw.exchange,
            supervisor: raw.supervisor,
            timeout,
        }
    }

    /// Parsed `[supervisor].timeout`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new_unchecked(RawSettings::default(), None)
    }
}
