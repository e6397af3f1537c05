use thiserror::Error;

/// Errores del dominio de entrenamiento/evaluación.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Serialization(e.to_string())
    }
}
