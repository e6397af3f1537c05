//! Params de las tareas. El campo `Input` lo completa
//! `RunParametersInjector`; el resto son defaults del step.

use pipeline_core::run::{RunContext, TaskInput, TaskPayload};
use pipeline_core::CoreEngineError;
use serde::{Deserialize, Serialize};

fn run_context_of(input: &Option<TaskInput>) -> Result<RunContext, CoreEngineError> {
    let input = input.clone()
                     .ok_or_else(|| CoreEngineError::MissingInputs("Input.RunParameters".into()))?;
    TaskPayload { input }.run_context()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskParams {
    #[serde(rename = "Input", default, skip_serializing_if = "Option::is_none")]
    pub input: Option<TaskInput>,
}

impl TaskParams {
    pub fn run_context(&self) -> Result<RunContext, CoreEngineError> {
        run_context_of(&self.input)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateParams {
    #[serde(rename = "Input", default, skip_serializing_if = "Option::is_none")]
    pub input: Option<TaskInput>,
    #[serde(default)]
    pub min_improvement: f64,
}

impl EvaluateParams {
    pub fn run_context(&self) -> Result<RunContext, CoreEngineError> {
        run_context_of(&self.input)
    }
}
