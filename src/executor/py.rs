// src/executor/py.rs

//! `py` task type: runs one step in a Python interpreter.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::codec::{self, ExecutionResult};
use crate::codegen::{render_source, resolve_body, LifecycleMethod};
use crate::config::Settings;
use crate::errors::Result;
use crate::exchange::ExchangeFiles;
use crate::exec::{run_interpreter, CancelToken};
use crate::executor::{BoxFuture, TaskExecutor, TaskExecutorFactory};
use crate::merge::{merge, TaskExecutionRecord, TaskResult};
use crate::types::Document;

pub const PY_TASK_TYPE: &str = "py";

#[derive(Debug, Clone)]
pub struct PyTaskExecutorFactory {
    settings: Arc<Settings>,
    method: LifecycleMethod,
}

impl PyTaskExecutorFactory {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            method: LifecycleMethod::run(),
        }
    }

    /// Lifecycle method called on `command` task objects (default `run`).
    pub fn with_method(mut self, method: LifecycleMethod) -> Self {
        self.method = method;
        self
    }
}

impl TaskExecutorFactory for PyTaskExecutorFactory {
    fn type_name(&self) -> &str {
        PY_TASK_TYPE
    }

    fn new_executor(
        &self,
        config: Document,
        params: Document,
        state: Document,
    ) -> Box<dyn TaskExecutor> {
        Box::new(PyTaskExecutor {
            settings: Arc::clone(&self.settings),
            method: self.method.clone(),
            config,
            params,
            state,
        })
    }
}

/// Executor bound to one invocation's `config`, `params` and `state`.
#[derive(Debug)]
pub struct PyTaskExecutor {
    settings: Arc<Settings>,
    method: LifecycleMethod,
    config: Document,
    params: Document,
    state: Document,
}

impl PyTaskExecutor {
    /// Run the step described by `config` with `params` and fold the
    /// interpreter's result into a fresh record.
    pub async fn run_task(
        &self,
        config: &Document,
        params: &Document,
        cancel: CancelToken,
    ) -> Result<TaskResult> {
        let result = self.run_code(config, params, &self.method, cancel).await?;
        let record = merge(TaskExecutionRecord::default(), result);

        debug!(
            inputs = record.inputs.len(),
            outputs = record.outputs.len(),
            has_sub = !record.subtask_config.is_empty(),
            "merged interpreter result"
        );
        Ok(record.into_result())
    }

    /// One interpreter round trip for `method`.
    ///
    /// Exchange files are removed when this returns, on every path.
    async fn run_code(
        &self,
        config: &Document,
        params: &Document,
        method: &LifecycleMethod,
        mut cancel: CancelToken,
    ) -> Result<ExecutionResult> {
        // Fails before anything is allocated or launched.
        let body = resolve_body(config, method)?;

        let exchange = ExchangeFiles::allocate(&self.settings.exchange)?;
        let source = render_source(body, exchange.paths());

        // The interpreter sees the body it runs under `config['script']`.
        let mut config = config.clone();
        config.insert("script".to_string(), Value::String(source.body().to_string()));
        codec::write_input(exchange.input_path(), &config, params, &self.state)?;

        debug!(method = %method, source = %source.text(), "generated interpreter source");

        let outcome = match run_interpreter(&self.settings, source.into_text(), &mut cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(method = %method, error = %e, kind = ?e.kind(), "interpreter invocation failed");
                return Err(e);
            }
        };

        let result = codec::read_output(exchange.output_path())?;
        info!(
            method = %method,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "interpreter step finished"
        );

        exchange.release();
        Ok(result)
    }
}

impl TaskExecutor for PyTaskExecutor {
    fn bound(&self) -> (&Document, &Document) {
        (&self.config, &self.params)
    }

    fn run_with<'a>(
        &'a self,
        config: &'a Document,
        params: &'a Document,
        cancel: CancelToken,
    ) -> BoxFuture<'a, Result<TaskResult>> {
        Box::pin(self.run_task(config, params, cancel))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::config::RawSettings;
    use crate::errors::BridgeError;

    fn settings_in(dir: &std::path::Path) -> Arc<Settings> {
        let mut raw = RawSettings::default();
        raw.exchange.dir = Some(dir.to_path_buf());
        raw.interpreter.program = "taskbridge-no-such-interpreter".to_string();
        Arc::new(Settings::try_from(raw).unwrap())
    }

    #[tokio::test]
    async fn missing_command_and_script_fails_before_allocating_files() {
        let dir = tempdir().unwrap();
        let factory = PyTaskExecutorFactory::new(settings_in(dir.path()));
        let executor = factory.new_executor(Document::new(), Document::new(), Document::new());

        let err = executor.run(CancelToken::never()).await.unwrap_err();
        assert!(matches!(err, BridgeError::MissingExecutableSpecification));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn launch_failure_cleans_up_exchange_files() {
        let dir = tempdir().unwrap();
        let factory = PyTaskExecutorFactory::new(settings_in(dir.path()));
        let config = match json!({ "script": "pass\n" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let executor = factory.new_executor(config, Document::new(), Document::new());

        let err = executor.run(CancelToken::never()).await.unwrap_err();
        assert!(matches!(err, BridgeError::ProcessLaunch { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
