//! Colaboradores externos del pipeline de entrega: repositorio de fuentes,
//! ejecutor de builds, registro de imágenes e invocador del workflow.
//!
//! Cada uno trae una implementación en memoria para pruebas y ejecución
//! local.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pipeline_core::FlowTerminalState;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::stage::PipelineArtifact;

/// Resuelve la revisión de cabeza de una rama.
#[async_trait]
pub trait SourceRepository: Send + Sync + std::fmt::Debug {
    async fn head(&self, repository: &str, branch: &str) -> Result<Option<String>, String>;
}

#[derive(Debug, Default)]
pub struct InMemorySourceRepository {
    heads: Mutex<HashMap<(String, String), String>>,
}

impl InMemorySourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, repository: &str, branch: &str, revision: &str) {
        self.heads
            .lock()
            .await
            .insert((repository.to_string(), branch.to_string()), revision.to_string());
    }
}

#[async_trait]
impl SourceRepository for InMemorySourceRepository {
    async fn head(&self, repository: &str, branch: &str) -> Result<Option<String>, String> {
        Ok(self.heads
               .lock()
               .await
               .get(&(repository.to_string(), branch.to_string()))
               .cloned())
    }
}

/// Pedido a un proyecto de build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub project_name: String,
    pub action: String,
    pub inputs: Vec<PipelineArtifact>,
    pub assume_role: Option<String>,
}

#[async_trait]
pub trait BuildRunner: Send + Sync + std::fmt::Debug {
    /// Devuelve el payload del artifact de salida.
    async fn run(&self, request: BuildRequest) -> Result<serde_json::Value, String>;
}

/// Registra cada pedido y responde con un resumen del build.
#[derive(Debug, Default)]
pub struct RecordingBuildRunner {
    requests: Mutex<Vec<BuildRequest>>,
}

impl RecordingBuildRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn requests(&self) -> Vec<BuildRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl BuildRunner for RecordingBuildRunner {
    async fn run(&self, request: BuildRequest) -> Result<serde_json::Value, String> {
        let summary = serde_json::json!({
            "project": request.project_name,
            "inputs": request.inputs.iter().map(|a| a.name.clone()).collect::<Vec<_>>(),
        });
        self.requests.lock().await.push(request);
        Ok(summary)
    }
}

/// Imagen publicada en un repositorio del registro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
    pub pushed_at: DateTime<Utc>,
}

impl ImageRef {
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

#[async_trait]
pub trait ImageRegistry: Send + Sync + std::fmt::Debug {
    /// Última imagen del repositorio por fecha de push.
    async fn latest(&self, repository: &str) -> Result<Option<ImageRef>, String>;
}

#[derive(Debug, Default)]
pub struct InMemoryImageRegistry {
    images: Mutex<Vec<ImageRef>>,
}

impl InMemoryImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, repository: &str, tag: &str, pushed_at: DateTime<Utc>) {
        self.images.lock().await.push(ImageRef { repository: repository.to_string(),
                                                 tag: tag.to_string(),
                                                 pushed_at });
    }
}

#[async_trait]
impl ImageRegistry for InMemoryImageRegistry {
    async fn latest(&self, repository: &str) -> Result<Option<ImageRef>, String> {
        Ok(self.images
               .lock()
               .await
               .iter()
               .filter(|i| i.repository == repository)
               .max_by_key(|i| i.pushed_at)
               .cloned())
    }
}

/// Resultado terminal de una ejecución del workflow de entrenamiento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub flow_id: Uuid,
    pub state: FlowTerminalState,
    pub summary: serde_json::Value,
}

/// Sustrato de ejecución que corre el workflow para el stage de test.
#[async_trait]
pub trait WorkflowInvoker: Send + Sync + std::fmt::Debug {
    async fn invoke(&self, workflow: &str, inputs: &[PipelineArtifact]) -> Result<WorkflowReport, String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn registry_resolves_latest_push_per_repository() {
        let registry = InMemoryImageRegistry::new();
        tokio_test::block_on(async {
            let t = |h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap();
            registry.push("train", "v2", t(12)).await;
            registry.push("train", "v1", t(9)).await;
            registry.push("prepare", "v7", t(23)).await;
            let latest = registry.latest("train").await.unwrap().unwrap();
            assert_eq!(latest.reference(), "train:v2");
            assert!(registry.latest("evaluate").await.unwrap().is_none());
        });
    }

    #[test]
    fn source_heads_are_per_branch() {
        let repo = InMemorySourceRepository::new();
        tokio_test::block_on(async {
            repo.push("app", "main", "abc123").await;
            assert_eq!(repo.head("app", "main").await.unwrap().as_deref(), Some("abc123"));
            assert_eq!(repo.head("app", "dev").await.unwrap(), None);
        });
    }
}
