// src/lib.rs

pub mod cli;
pub mod codec;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod exec;
pub mod executor;
pub mod logging;
pub mod merge;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::codegen::{generate, LifecycleMethod};
use crate::config::{load_document, load_or_default};
use crate::exchange::ExchangePaths;
use crate::exec::cancel_pair;
use crate::executor::ExecutorRegistry;
use crate::types::Document;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings and step document loading
/// - the executor registry
/// - one executor invocation
/// - Ctrl-C handling (cancels the invocation)
pub async fn run(args: CliArgs) -> Result<()> {
    let mut settings = load_or_default(args.settings.as_deref())?;
    if let Some(forward) = args.forward_output {
        settings.supervisor.forward_output = forward;
    }
    let settings = Arc::new(settings);
    let method = LifecycleMethod::parse(&args.method)?;

    let config = load_document(&args.step)
        .with_context(|| format!("loading step config {:?}", args.step))?;
    let params = load_optional_document(args.params.as_ref())?;
    let state = load_optional_document(args.state.as_ref())?;

    if args.dry_run {
        print_dry_run(&config, &method)?;
        return Ok(());
    }

    let registry = ExecutorRegistry::with_defaults(Arc::clone(&settings), method)?;
    let executor = registry.new_executor(&args.task_type, config, params, state)?;

    let (cancel_handle, cancel) = cancel_pair();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; cancelling step");
        cancel_handle.cancel();
    });

    info!(task_type = %args.task_type, step = ?args.step, "running step");
    let result = executor.run(cancel).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn load_optional_document(path: Option<&PathBuf>) -> Result<Document> {
    match path {
        Some(p) => load_document(p).with_context(|| format!("loading document {:?}", p)),
        None => Ok(Document::new()),
    }
}

/// Print the program the interpreter would receive, with placeholder
/// exchange paths.
fn print_dry_run(config: &Document, method: &LifecycleMethod) -> Result<()> {
    let source = generate(
        config,
        method,
        ExchangePaths {
            input: Path::new("<input file>"),
            output: Path::new("<output file>"),
        },
    )?;

    println!("taskbridge dry-run (method: {method})");
    println!();
    print!("{}", source.text());
    if !source.text().ends_with('\n') {
        println!();
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
