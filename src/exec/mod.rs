// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`supervisor`] launches the interpreter, streams the generated source
//!   into it and drains its output concurrently.
//! - [`cancel`] carries orchestrator-side cancellation into a running
//!   invocation.

pub mod cancel;
pub mod supervisor;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use supervisor::{run_interpreter, ProcessOutcome};
