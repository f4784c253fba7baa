// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::OutputForward;

/// Command-line arguments for `taskbridge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskbridge",
    version,
    about = "Run one workflow step in an external interpreter and print its result.",
    long_about = None
)]
pub struct CliArgs {
    /// Step configuration (JSON object with `command` or `script`).
    #[arg(long, value_name = "PATH")]
    pub step: PathBuf,

    /// Step parameters (JSON object). Empty when omitted.
    #[arg(long, value_name = "PATH")]
    pub params: Option<PathBuf>,

    /// Resumable step state (JSON object). Empty when omitted.
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Task type to run the step with.
    #[arg(long = "type", value_name = "TYPE", default_value = "py")]
    pub task_type: String,

    /// Bridge settings (TOML). Falls back to `TASKBRIDGE_SETTINGS`, then
    /// built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Lifecycle method called on `command` task objects.
    #[arg(long, value_name = "NAME", default_value = "run")]
    pub method: String,

    /// Where interpreter output goes (log, stderr, discard). Overrides the
    /// settings file.
    #[arg(long, value_name = "MODE")]
    pub forward_output: Option<OutputForward>,

    /// Print the generated source without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKBRIDGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let args = CliArgs::try_parse_from(["taskbridge", "--step", "step.json"]).unwrap();
        assert_eq!(args.step, PathBuf::from("step.json"));
        assert_eq!(args.task_type, "py");
        assert_eq!(args.method, "run");
        assert!(!args.dry_run);
        assert!(args.params.is_none());
    }

    #[test]
    fn forward_output_parses() {
        let args = CliArgs::try_parse_from([
            "taskbridge",
            "--step",
            "step.json",
            "--forward-output",
            "stderr",
        ])
        .unwrap();
        assert_eq!(args.forward_output, Some(OutputForward::Stderr));

        assert!(CliArgs::try_parse_from([
            "taskbridge",
            "--step",
            "step.json",
            "--forward-output",
            "stdout",
        ])
        .is_err());
    }

    #[test]
    fn step_is_required() {
        assert!(CliArgs::try_parse_from(["taskbridge"]).is_err());
    }
}
