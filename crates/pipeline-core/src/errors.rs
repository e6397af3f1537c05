//! Errores del motor de workflow.
//!
//! Los errores de tarea (`ShapeMismatch`, `InsufficientData`, `ModelNotFound`,
//! `TaskTimeout`) viajan dentro del evento `StepFailed`, por eso el enum es
//! serializable y `Clone`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("flow already completed")] FlowCompleted,
    #[error("invalid step index")] InvalidStepIndex,
    #[error("missing required inputs: {0}")] MissingInputs(String),
    #[error("first step must be source kind")] FirstStepMustBeSource,
    #[error("flow has failed previously (stop-on-failure invariant)")] FlowHasFailed,
    #[error("shape mismatch: {0}")] ShapeMismatch(String),
    #[error("insufficient data: {0}")] InsufficientData(String),
    #[error("model not found at '{0}'")] ModelNotFound(String),
    #[error("task '{step_id}' exceeded its timeout of {timeout_ms} ms")]
    TaskTimeout { step_id: String, timeout_ms: u64 },
    #[error("storage: {0}")] Storage(String),
    #[error("internal: {0}")] Internal(String),
}

impl CoreEngineError {
    /// Nombre estable de la variante, útil para logs y reportes de diagnóstico.
    pub fn code(&self) -> &'static str {
        match self {
            CoreEngineError::FlowCompleted => "FlowCompleted",
            CoreEngineError::InvalidStepIndex => "InvalidStepIndex",
            CoreEngineError::MissingInputs(_) => "MissingInputs",
            CoreEngineError::FirstStepMustBeSource => "FirstStepMustBeSource",
            CoreEngineError::FlowHasFailed => "FlowHasFailed",
            CoreEngineError::ShapeMismatch(_) => "ShapeMismatch",
            CoreEngineError::InsufficientData(_) => "InsufficientData",
            CoreEngineError::ModelNotFound(_) => "ModelNotFound",
            CoreEngineError::TaskTimeout { .. } => "TaskTimeout",
            CoreEngineError::Storage(_) => "Storage",
            CoreEngineError::Internal(_) => "Internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_timeout_message_names_the_step() {
        let e = CoreEngineError::TaskTimeout { step_id: "train".into(), timeout_ms: 1500 };
        assert_eq!(e.to_string(), "task 'train' exceeded its timeout of 1500 ms");
        assert_eq!(e.code(), "TaskTimeout");
    }

    #[test]
    fn errors_roundtrip_through_json() {
        let e = CoreEngineError::ModelNotFound("proj/models/LinearRegression_Model.json".into());
        let v = serde_json::to_value(&e).unwrap();
        let back: CoreEngineError = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
    }
}
