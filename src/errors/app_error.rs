use pipeline_core::CoreEngineError;
use pipeline_infra::DeliveryError;
use pipeline_persistence::PersistenceError;
use thiserror::Error;

/// Errores de la aplicación (configuración, wiring, CLI).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error interno: {0}")]
    Internal(String),
    #[error(transparent)]
    Engine(#[from] CoreEngineError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
