use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{errors::CoreEngineError, model::Artifact};

/// Señal ligera emitida por un step (se registra como `StepSignal`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSignal {
    pub signal: String,
    pub data: Value,
}

impl StepSignal {
    pub fn new(signal: impl Into<String>, data: Value) -> Self {
        Self { signal: signal.into(),
               data }
    }
}

/// Resultado abstracto de ejecutar un step.
#[derive(Debug)]
pub enum StepRunResult {
    Success { outputs: Vec<Artifact> },
    SuccessWithSignals { outputs: Vec<Artifact>, signals: Vec<StepSignal> },
    Failure { error: CoreEngineError },
}
