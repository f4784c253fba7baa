use std::sync::{Arc, Mutex};

use taskbridge::errors::{BridgeError, Result};
use taskbridge::exec::CancelToken;
use taskbridge::executor::{BoxFuture, TaskExecutor, TaskExecutorFactory};
use taskbridge::merge::TaskResult;
use taskbridge::types::Document;

/// One recorded invocation: the bound `(config, params, state)`.
pub type Invocation = (Document, Document, Document);

/// A fake factory that:
/// - records every executor it hands out
/// - makes each executor return a fixed result (or fail when the config it
///   runs with has `"fail": true`).
pub struct FakeExecutorFactory {
    type_name: String,
    result: TaskResult,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeExecutorFactory {
    pub fn new(
        type_name: &str,
        result: TaskResult,
        invocations: Arc<Mutex<Vec<Invocation>>>,
    ) -> Self {
        Self {
            type_name: type_name.to_string(),
            result,
            invocations,
        }
    }
}

impl TaskExecutorFactory for FakeExecutorFactory {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn new_executor(
        &self,
        config: Document,
        params: Document,
        state: Document,
    ) -> Box<dyn TaskExecutor> {
        self.invocations
            .lock()
            .unwrap()
            .push((config.clone(), params.clone(), state));

        Box::new(FakeExecutor {
            config,
            params,
            result: self.result.clone(),
        })
    }
}

struct FakeExecutor {
    config: Document,
    params: Document,
    result: TaskResult,
}

impl TaskExecutor for FakeExecutor {
    fn bound(&self) -> (&Document, &Document) {
        (&self.config, &self.params)
    }

    fn run_with<'a>(
        &'a self,
        config: &'a Document,
        _params: &'a Document,
        cancel: CancelToken,
    ) -> BoxFuture<'a, Result<TaskResult>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(BridgeError::Cancelled);
            }
            if config.get("fail").and_then(|v| v.as_bool()).unwrap_or(false) {
                return Err(BridgeError::ForeignProcessFailed {
                    exit_code: 1,
                    output: vec!["fake failure".to_string()],
                });
            }
            Ok(self.result.clone())
        })
    }
}
