//! Retraining Pipeline
//!
//! Librería de la aplicación que une los crates del workspace:
//! - `config`: configuración desde .env / variables `PIPELINE_*`.
//! - `errors`: errores de aplicación.
//! - `logging`: inicialización de `env_logger`.
//! - `app`: el workflow de entrenamiento como stage de test del pipeline de
//!   entrega, con colaboradores locales.

pub mod app;
pub mod config;
pub mod errors;
pub mod logging;

pub use app::{run_delivery_pipeline, run_workflow, TrainingWorkflowInvoker};
pub use config::AppConfig;
pub use errors::AppError;
