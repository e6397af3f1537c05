//! Artifact neutral del flujo.
//!
//! Un `Artifact` es la unidad de datos intercambiada entre steps:
//! - `payload` es JSON; el motor no interpreta su semántica.
//! - `hash` lo calcula el engine sobre el JSON canonicalizado (ver
//!   `hashing::to_canonical_json`) y sirve como identidad del output.
//! - `metadata` anota información auxiliar que no entra al hash.
//!
//! Los datasets y el modelo no viajan aquí: viven en el object store y el
//! artifact sólo lleva sus claves.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tipos de artifact que circulan por el workflow de reentrenamiento.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// JSON genérico sin semántica.
    GenericJson,
    /// Salida de Init: los `RunParameters` de la ejecución.
    RunParameters,
    /// Salida de Prepare: claves de los datasets escritos.
    DatasetManifest,
    /// Salida de Train: versión y claves del modelo.
    ModelManifest,
    /// Salida de Evaluate: scores y decisión.
    EvaluationReport,
}

/// Artifact neutral producido/consumido por Steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub hash: String,            // asignado por el engine
    pub payload: Value,
    pub metadata: Option<Value>, // no entra al hash
}

impl Artifact {
    /// Constructor sin hash; el engine lo completa al aceptar outputs.
    pub fn new_unhashed(kind: ArtifactKind, payload: Value, metadata: Option<Value>) -> Self {
        Self { kind,
               hash: String::new(),
               payload,
               metadata }
    }
}
