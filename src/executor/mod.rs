// src/executor/mod.rs

//! Task executors: the orchestrator-facing side of the bridge.
//!
//! - [`TaskExecutorFactory`] builds one [`TaskExecutor`] per task
//!   invocation, bound to that invocation's `config`, `params` and `state`.
//! - [`registry`] maps task type names (e.g. `"py"`) to factories.
//! - [`py`] is the factory for the Python interpreter bridge.
//!
//! Additional foreign runtimes plug in by implementing the factory trait and
//! registering it.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::exec::CancelToken;
use crate::merge::TaskResult;
use crate::types::Document;

pub mod py;
pub mod registry;

pub use py::{PyTaskExecutor, PyTaskExecutorFactory};
pub use registry::{ExecutorRegistry, RegistryBuilder};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One bound task invocation.
///
/// `config`, `params` and `state` are bound when the factory builds the
/// executor. [`TaskExecutor::run_with`] runs the step with an explicit
/// `config` and `params`; `state` always stays the bound one.
pub trait TaskExecutor: Send + Sync {
    /// The `config` and `params` bound at construction.
    fn bound(&self) -> (&Document, &Document);

    /// Run the step described by `config` with `params`. Resolves once the
    /// work is done or failed, or `cancel` fires.
    fn run_with<'a>(
        &'a self,
        config: &'a Document,
        params: &'a Document,
        cancel: CancelToken,
    ) -> BoxFuture<'a, Result<TaskResult>>;

    /// Run the step with the bound `config` and `params`.
    fn run(&self, cancel: CancelToken) -> BoxFuture<'_, Result<TaskResult>> {
        let (config, params) = self.bound();
        self.run_with(config, params, cancel)
    }
}

/// Builds executors for one task type.
pub trait TaskExecutorFactory: Send + Sync {
    /// Stable type identifier, e.g. `"py"`.
    fn type_name(&self) -> &str;

    fn new_executor(
        &self,
        config: Document,
        params: Document,
        state: Document,
    ) -> Box<dyn TaskExecutor>;
}
