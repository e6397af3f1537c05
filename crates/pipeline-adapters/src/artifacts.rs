//! Artifacts tipados del workflow de reentrenamiento.
//!
//! Todos llevan los `RunParameters` de la ejecución para que cada tarea
//! pueda verificar que trabaja sobre la misma corrida.

use pipeline_core::model::ArtifactKind;
use pipeline_core::run::RunParameters;
use pipeline_core::typed_artifact;
use pipeline_domain::EvaluationResult;
use pipeline_policies::PromotionDecision;
use serde::{Deserialize, Serialize};

// Salida de Init.
typed_artifact!(RunParametersArtifact { run_parameters: RunParameters } kind: ArtifactKind::RunParameters);

/// Claves (dentro del bucket del proyecto) de los datasets de una ejecución.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetKeys {
    pub train_features: String,
    pub train_labels: String,
    pub test_features: String,
    pub test_labels: String,
    pub inference: Option<String>,
}

// Salida de Prepare.
typed_artifact!(DatasetManifest {
    run_parameters: RunParameters,
    bucket: String,
    prefix: String,
    keys: DatasetKeys,
    train_rows: usize,
    test_rows: usize,
} kind: ArtifactKind::DatasetManifest);

// Salida de Train. `model_version` es el run id que entrenó el modelo;
// `model_key` es su clave versionada e inmutable.
typed_artifact!(ModelManifest {
    run_parameters: RunParameters,
    bucket: String,
    keys: DatasetKeys,
    model_version: String,
    model_key: String,
    latest_key: String,
    n_features: usize,
} kind: ArtifactKind::ModelManifest);

// Salida de Evaluate.
typed_artifact!(EvaluationReport {
    run_parameters: RunParameters,
    model_version: String,
    result: EvaluationResult,
    decision: PromotionDecision,
    inference_predictions: Option<usize>,
} kind: ArtifactKind::EvaluationReport);
