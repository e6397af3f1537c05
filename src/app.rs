//! Wiring de la aplicación: el workflow de entrenamiento como sustrato del
//! stage de test y el pipeline de entrega con colaboradores locales.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use pipeline_adapters::{build_training_engine, run_training_workflow, DataSource, StaticDataSource, WorkflowOutcome,
                        WorkflowSettings};
use pipeline_core::Environment;
use pipeline_infra::{build_standard_pipeline, Collaborators, CommitEvent, InMemoryImageRegistry, InMemorySourceRepository,
                     PipelineArtifact, PipelineExecution, RecordingBuildRunner, StandardPipelineConfig, WorkflowInvoker,
                     WorkflowReport};
use pipeline_persistence::{build_store, ObjectStore};

use crate::config::AppConfig;
use crate::errors::AppError;

/// Corre una ejecución completa del workflow de entrenamiento por invocación.
#[derive(Debug, Clone)]
pub struct TrainingWorkflowInvoker {
    store: Arc<dyn ObjectStore>,
    source: Arc<dyn DataSource>,
    settings: WorkflowSettings,
}

impl TrainingWorkflowInvoker {
    pub fn new(store: Arc<dyn ObjectStore>, source: Arc<dyn DataSource>, settings: WorkflowSettings) -> Self {
        Self { store,
               source,
               settings }
    }

    pub async fn run_once(&self) -> WorkflowOutcome {
        let mut engine = build_training_engine(self.store.clone(), self.source.clone(), &self.settings);
        run_training_workflow(&mut engine).await
    }
}

#[async_trait]
impl WorkflowInvoker for TrainingWorkflowInvoker {
    async fn invoke(&self, workflow: &str, inputs: &[PipelineArtifact]) -> Result<WorkflowReport, String> {
        info!("invoking {workflow} with {} input artifacts", inputs.len());
        let outcome = self.run_once().await;
        let summary = serde_json::json!({
            "run_parameters": outcome.run_parameters,
            "evaluation": outcome.evaluation.as_ref().map(|e| &e.result),
        });
        Ok(WorkflowReport { flow_id: outcome.flow_id,
                            state: outcome.state,
                            summary })
    }
}

/// Corre el workflow de entrenamiento una vez con el store configurado.
pub async fn run_workflow(cfg: &AppConfig, environment: Environment) -> WorkflowOutcome {
    TrainingWorkflowInvoker::new(build_store(&cfg.store),
                                 Arc::new(StaticDataSource::canonical()),
                                 cfg.workflow_settings(environment)).run_once()
                                                                    .await
}

/// Colaboradores en memoria: ambos repositorios apuntan al commit recibido
/// y cada task runner tiene una imagen etiquetada con él.
pub async fn local_collaborators(pipeline: &StandardPipelineConfig,
                                 commit: &str,
                                 workflow: Arc<dyn WorkflowInvoker>)
                                 -> Collaborators {
    let sources = Arc::new(InMemorySourceRepository::new());
    sources.push(&pipeline.repository, &pipeline.branch, commit).await;
    sources.push(&pipeline.cdk_repository, &pipeline.branch, commit).await;
    let images = Arc::new(InMemoryImageRegistry::new());
    for repository in pipeline.image_repositories() {
        images.push(&repository, commit, Utc::now()).await;
    }
    Collaborators { sources,
                    builds: Arc::new(RecordingBuildRunner::new()),
                    images,
                    workflow }
}

/// Ejecuta el pipeline de entrega para un commit. `Ok(None)` si el commit no
/// corresponde a la rama y repositorio configurados.
pub async fn run_delivery_pipeline(cfg: &AppConfig,
                                   environment: Environment,
                                   event: &CommitEvent)
                                   -> Result<Option<PipelineExecution>, AppError> {
    let pipeline_cfg = cfg.pipeline_config(environment);
    if !pipeline_cfg.trigger().accepts(event) {
        return Ok(None);
    }
    let invoker = TrainingWorkflowInvoker::new(build_store(&cfg.store),
                                               Arc::new(StaticDataSource::canonical()),
                                               cfg.workflow_settings(environment));
    let collaborators = local_collaborators(&pipeline_cfg, &event.commit, Arc::new(invoker)).await;
    let pipeline = build_standard_pipeline(&pipeline_cfg, &collaborators)?;
    let execution = pipeline.execute(&event.commit).await;
    if !execution.succeeded() {
        warn!("pipeline execution {} did not succeed: {:?}", execution.execution_id, execution.status);
    }
    Ok(Some(execution))
}
