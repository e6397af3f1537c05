//! Esquema de claves de artifacts.
//!
//! - Datos por ejecución: `{project}/{stage}/{run_date}/{run_id}/{artifact_name}`
//!   (write-once, únicos por `run_id`).
//! - Modelo: un slot compartido por proyecto (`{project}/models/{file}`) más una
//!   versión por ejecución (`{project}/models/{run_id}/{file}`).

use std::fmt;

use super::{Environment, RunContext, RunId};
use crate::errors::CoreEngineError;

/// Bucket del proyecto para un entorno.
pub fn project_bucket(environment: Environment, project: &str) -> String {
    format!("pr-{environment}-{project}-bucket")
}

/// Clave derivada de un `RunContext`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    project: String,
    stage: String,
    run_date: String,
    run_id: RunId,
    artifact_name: String,
}

impl ArtifactKey {
    pub fn for_run(ctx: &RunContext, stage: &str, artifact_name: &str) -> Result<Self, CoreEngineError> {
        for (what, seg) in [("stage", stage), ("artifact name", artifact_name)] {
            if seg.is_empty() || seg.contains('/') || seg == "." || seg == ".." {
                return Err(CoreEngineError::Internal(format!("invalid {what} segment '{seg}'")));
            }
        }
        Ok(Self { project: ctx.project().to_string(),
                  stage: stage.to_string(),
                  run_date: ctx.run_date().format("%Y-%m-%d").to_string(),
                  run_id: ctx.run_id().clone(),
                  artifact_name: artifact_name.to_string() })
    }

    /// Prefijo común a todos los artifacts de la misma ejecución y etapa.
    pub fn prefix(&self) -> String {
        format!("{}/{}/{}/{}", self.project, self.stage, self.run_date, self.run_id)
    }

    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix(), self.artifact_name)
    }
}

/// Claves del modelo serializado de un proyecto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelKey {
    project: String,
    file_name: String,
}

impl ModelKey {
    pub fn new(project: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self { project: project.into(),
               file_name: file_name.into() }
    }

    /// Slot compartido ("modelo actual"), mutable.
    pub fn latest(&self) -> String {
        format!("{}/models/{}", self.project, self.file_name)
    }

    /// Versión escrita por la ejecución `run_id`, inmutable.
    pub fn versioned(&self, run_id: &RunId) -> String {
        format!("{}/models/{}/{}", self.project, run_id, self.file_name)
    }

    /// Score persistido del champion en producción (insumo externo).
    pub fn champion_score(&self) -> String {
        format!("{}/champion/score.json", self.project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx(run_id: &str) -> RunContext {
        RunContext::new(RunId::parse(run_id).unwrap(),
                        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                        Environment::Test,
                        "regression")
    }

    #[test]
    fn key_layout_is_project_stage_date_run_name() {
        let k = ArtifactKey::for_run(&ctx("ab12cd34"), "data-preparation", "train-features.json").unwrap();
        assert_eq!(k.to_string(), "regression/data-preparation/2024-01-02/ab12cd34/train-features.json");
        assert_eq!(k.prefix(), "regression/data-preparation/2024-01-02/ab12cd34");
    }

    #[test]
    fn prefixes_differ_for_distinct_run_ids_on_same_day() {
        let a = ArtifactKey::for_run(&ctx("aaaaaaaa"), "data-preparation", "x").unwrap();
        let b = ArtifactKey::for_run(&ctx("bbbbbbbb"), "data-preparation", "x").unwrap();
        assert_ne!(a.prefix(), b.prefix());
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_path_like_segments() {
        assert!(ArtifactKey::for_run(&ctx("aaaaaaaa"), "a/b", "x").is_err());
        assert!(ArtifactKey::for_run(&ctx("aaaaaaaa"), "stage", "..").is_err());
        assert!(ArtifactKey::for_run(&ctx("aaaaaaaa"), "", "x").is_err());
    }

    #[test]
    fn bucket_and_model_keys() {
        assert_eq!(project_bucket(Environment::Prod, "regression"), "pr-prod-regression-bucket");
        let mk = ModelKey::new("regression", "LinearRegression_Model.json");
        assert_eq!(mk.latest(), "regression/models/LinearRegression_Model.json");
        assert_eq!(mk.versioned(&RunId::parse("ab12cd34").unwrap()),
                   "regression/models/ab12cd34/LinearRegression_Model.json");
        assert_eq!(mk.champion_score(), "regression/champion/score.json");
    }
}
