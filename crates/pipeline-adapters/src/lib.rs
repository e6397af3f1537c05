//! pipeline-adapters: capa de adaptación Dominio ↔ Core.
//!
//! Este crate provee:
//! - Artifacts tipados que viajan entre las tareas del workflow.
//! - Las tareas `Init`, `Prepare`, `Train` y `Evaluate` como `TypedStep`.
//! - `RunParametersInjector`, que entrega a cada tarea el payload
//!   `{"Input": {"RunParameters": ...}}`.
//! - El ensamblado del workflow de reentrenamiento (`workflow`).
//!
//! Los datasets y el modelo no pasan por el engine: se escriben en el
//! `ObjectStore` bajo claves derivadas del `RunContext` y los artifacts sólo
//! transportan esas claves.

pub mod artifacts;
pub mod errors;
pub mod injectors;
pub mod params;
pub mod source;
pub mod steps;
pub mod workflow;

pub use artifacts::{DatasetKeys, DatasetManifest, EvaluationReport, ModelManifest, RunParametersArtifact};
pub use injectors::RunParametersInjector;
pub use source::{DataSource, RawData, StaticDataSource};
pub use steps::{EvaluateStep, InitStep, PrepareStep, TrainStep};
pub use workflow::{build_training_engine, run_training_workflow, TrainingEngine, WorkflowOutcome, WorkflowSettings};

/// Etapa bajo la que Prepare escribe los datasets.
pub const DATA_PREPARATION_STAGE: &str = "data-preparation";
/// Nombre del archivo de modelo en el slot compartido y en cada versión.
pub const MODEL_FILE: &str = "LinearRegression_Model.json";

pub const TRAIN_FEATURES: &str = "train-features.json";
pub const TRAIN_LABELS: &str = "train-labels.json";
pub const TEST_FEATURES: &str = "test-features.json";
pub const TEST_LABELS: &str = "test-labels.json";
pub const INFERENCE_DATA: &str = "inference-data.json";
