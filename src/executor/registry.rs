// src/executor/registry.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::codegen::LifecycleMethod;
use crate::config::Settings;
use crate::errors::{BridgeError, Result};
use crate::executor::py::PyTaskExecutorFactory;
use crate::executor::{TaskExecutor, TaskExecutorFactory};
use crate::types::Document;

/// Lookup table from task type name to factory.
///
/// Filled once through [`RegistryBuilder`] and read-only afterwards.
#[derive(Clone)]
pub struct ExecutorRegistry {
    factories: BTreeMap<String, Arc<dyn TaskExecutorFactory>>,
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExecutorRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with the bundled `py` executor.
    pub fn with_defaults(settings: Arc<Settings>, method: LifecycleMethod) -> Result<Self> {
        Ok(Self::builder()
            .register(PyTaskExecutorFactory::new(settings).with_method(method))?
            .build())
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn factory(&self, task_type: &str) -> Result<&Arc<dyn TaskExecutorFactory>> {
        self.factories
            .get(task_type)
            .ok_or_else(|| BridgeError::UnknownTaskType(task_type.to_string()))
    }

    /// Build an executor for one invocation of a `task_type` step.
    pub fn new_executor(
        &self,
        task_type: &str,
        config: Document,
        params: Document,
        state: Document,
    ) -> Result<Box<dyn TaskExecutor>> {
        let factory = self.factory(task_type)?;
        debug!(task_type, "creating task executor");
        Ok(factory.new_executor(config, params, state))
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    factories: BTreeMap<String, Arc<dyn TaskExecutorFactory>>,
}

impl RegistryBuilder {
    /// Add a factory. Registering the same type name twice is an error.
    pub fn register<F>(mut self, factory: F) -> Result<Self>
    where
        F: TaskExecutorFactory + 'static,
    {
        let name = factory.type_name().to_string();
        if self.factories.contains_key(&name) {
            return Err(BridgeError::Config(format!(
                "task type '{}' registered twice",
                name
            )));
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(self)
    }

    pub fn build(self) -> ExecutorRegistry {
        ExecutorRegistry {
            factories: self.factories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_contain_py() {
        let registry =
            ExecutorRegistry::with_defaults(Arc::new(Settings::default()), LifecycleMethod::run())
                .unwrap();
        assert_eq!(registry.types().collect::<Vec<_>>(), vec!["py"]);
        assert!(registry
            .new_executor("py", Document::new(), Document::new(), Document::new())
            .is_ok());
    }

    #[test]
    fn unknown_type_is_reported() {
        let registry = ExecutorRegistry::builder().build();
        match registry.new_executor("rb", Document::new(), Document::new(), Document::new()) {
            Err(BridgeError::UnknownTaskType(name)) => assert_eq!(name, "rb"),
            Err(other) => panic!("expected UnknownTaskType, got {other:?}"),
            Ok(_) => panic!("expected UnknownTaskType, got an executor"),
        }
    }

    #[test]
    fn duplicate_registration_fails() {
        let settings = Arc::new(Settings::default());
        let res = ExecutorRegistry::builder()
            .register(PyTaskExecutorFactory::new(settings.clone()))
            .and_then(|b| b.register(PyTaskExecutorFactory::new(settings)));
        assert!(matches!(res, Err(BridgeError::Config(_))));
    }
}
