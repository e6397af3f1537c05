//! Traducción de errores de dominio al error del motor.

use pipeline_core::CoreEngineError;
use pipeline_domain::DomainError;
use pipeline_persistence::PersistenceError;

pub fn from_domain(err: DomainError) -> CoreEngineError {
    match err {
        DomainError::ShapeMismatch(m) => CoreEngineError::ShapeMismatch(m),
        DomainError::InsufficientData(m) => CoreEngineError::InsufficientData(m),
        DomainError::Validation(m) => CoreEngineError::Internal(format!("validation: {m}")),
        DomainError::Serialization(m) => CoreEngineError::Storage(format!("corrupt object: {m}")),
    }
}

/// Como `From<PersistenceError>`, pero un `NotFound` del modelo es
/// `ModelNotFound`.
pub fn model_read_error(err: PersistenceError) -> CoreEngineError {
    match err {
        PersistenceError::NotFound { bucket, key } => CoreEngineError::ModelNotFound(format!("{bucket}/{key}")),
        other => other.into(),
    }
}
