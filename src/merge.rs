// src/merge.rs

//! Folding an [`ExecutionResult`] into the per-invocation record.

use serde::Serialize;

use crate::codec::ExecutionResult;
use crate::types::Document;

/// Everything one invocation contributed.
///
/// Built fresh per invocation and returned by value; nothing here is shared
/// with other invocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskExecutionRecord {
    /// Configuration of a child step to schedule, empty when none.
    pub subtask_config: Document,
    pub inputs: Vec<Document>,
    pub outputs: Vec<Document>,
    pub carry_params: Document,
}

/// Side effects of a step besides its carry parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SideEffects {
    #[serde(rename = "sub")]
    pub subtask_config: Document,
    pub inputs: Vec<Document>,
    pub outputs: Vec<Document>,
}

/// What an executor hands back to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskResult {
    pub carry_params: Document,
    #[serde(flatten)]
    pub side_effects: SideEffects,
}

impl TaskExecutionRecord {
    pub fn into_result(self) -> TaskResult {
        TaskResult {
            carry_params: self.carry_params,
            side_effects: SideEffects {
                subtask_config: self.subtask_config,
                inputs: self.inputs,
                outputs: self.outputs,
            },
        }
    }
}

/// Apply `result` to `record`.
///
/// - `sub`: keys overwrite the sub-task configuration.
/// - `inputs` / `outputs`: appended in order.
/// - `carry_params`: replaces the carry parameters.
///
/// Absent fields leave the record untouched. Consumes both values, so the
/// raw result cannot be merged twice.
pub fn merge(mut record: TaskExecutionRecord, result: ExecutionResult) -> TaskExecutionRecord {
    let ExecutionResult {
        sub,
        carry_params,
        inputs,
        outputs,
    } = result;

    if let Some(sub) = sub {
        record.subtask_config.extend(sub);
    }
    if let Some(inputs) = inputs {
        record.inputs.extend(inputs);
    }
    if let Some(outputs) = outputs {
        record.outputs.extend(outputs);
    }
    if let Some(carry_params) = carry_params {
        record.carry_params = carry_params;
    }

    record
}
