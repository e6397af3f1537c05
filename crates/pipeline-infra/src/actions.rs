//! Acciones concretas del pipeline estándar.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use log::info;
use pipeline_core::FlowTerminalState;

use crate::action::{ActionInvocation, StageAction};
use crate::collaborators::{BuildRequest, BuildRunner, ImageRegistry, SourceRepository, WorkflowInvoker};
use crate::errors::DeliveryError;

/// Toma la cabeza de una rama del repositorio.
#[derive(Debug, Clone)]
pub struct SourceAction {
    repositories: Arc<dyn SourceRepository>,
    repository: String,
    branch: String,
}

impl SourceAction {
    pub fn new(repositories: Arc<dyn SourceRepository>, repository: impl Into<String>, branch: impl Into<String>) -> Self {
        Self { repositories,
               repository: repository.into(),
               branch: branch.into() }
    }
}

#[async_trait]
impl StageAction for SourceAction {
    async fn execute(&self, inv: &ActionInvocation) -> Result<serde_json::Value, DeliveryError> {
        let revision = self.repositories
                           .head(&self.repository, &self.branch)
                           .await
                           .map_err(|e| inv.fail(e))?
                           .ok_or_else(|| inv.fail(format!("branch '{}' of '{}' has no commits", self.branch, self.repository)))?;
        Ok(serde_json::json!({ "repository": self.repository, "branch": self.branch, "revision": revision }))
    }
}

/// Corre un proyecto de build con los artifacts de entrada.
#[derive(Debug, Clone)]
pub struct BuildAction {
    runner: Arc<dyn BuildRunner>,
    project_name: String,
}

impl BuildAction {
    pub fn new(runner: Arc<dyn BuildRunner>, project_name: impl Into<String>) -> Self {
        Self { runner,
               project_name: project_name.into() }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }
}

#[async_trait]
impl StageAction for BuildAction {
    async fn execute(&self, inv: &ActionInvocation) -> Result<serde_json::Value, DeliveryError> {
        let request = BuildRequest { project_name: self.project_name.clone(),
                                     action: inv.action.clone(),
                                     inputs: inv.inputs.clone(),
                                     assume_role: inv.role_arn.clone() };
        self.runner.run(request).await.map_err(|e| inv.fail(e))
    }
}

/// Build de empaquetado: además del build, resuelve la última imagen de
/// cada task runner y publica las referencias en su artifact.
#[derive(Debug, Clone)]
pub struct FactoryAction {
    build: BuildAction,
    registry: Arc<dyn ImageRegistry>,
    image_repositories: Vec<String>,
}

impl FactoryAction {
    pub fn new(build: BuildAction, registry: Arc<dyn ImageRegistry>, image_repositories: Vec<String>) -> Self {
        Self { build,
               registry,
               image_repositories }
    }
}

#[async_trait]
impl StageAction for FactoryAction {
    async fn execute(&self, inv: &ActionInvocation) -> Result<serde_json::Value, DeliveryError> {
        let build = self.build.execute(inv).await?;
        let mut images = IndexMap::new();
        for repository in &self.image_repositories {
            let image = self.registry
                            .latest(repository)
                            .await
                            .map_err(|e| inv.fail(e))?
                            .ok_or_else(|| inv.fail(format!("no image pushed to '{repository}'")))?;
            images.insert(repository.clone(), image.reference());
        }
        info!("{}: resolved {} task runner images", inv.action, images.len());
        Ok(serde_json::json!({ "build": build, "images": images }))
    }
}

/// Corre el workflow de entrenamiento; sólo `Done` deja avanzar el pipeline.
#[derive(Debug, Clone)]
pub struct SystemTestAction {
    invoker: Arc<dyn WorkflowInvoker>,
    workflow: String,
}

impl SystemTestAction {
    pub fn new(invoker: Arc<dyn WorkflowInvoker>, workflow: impl Into<String>) -> Self {
        Self { invoker,
               workflow: workflow.into() }
    }
}

#[async_trait]
impl StageAction for SystemTestAction {
    async fn execute(&self, inv: &ActionInvocation) -> Result<serde_json::Value, DeliveryError> {
        let report = self.invoker
                         .invoke(&self.workflow, &inv.inputs)
                         .await
                         .map_err(|e| inv.fail(e))?;
        match report.state {
            FlowTerminalState::Done { fingerprint } => Ok(serde_json::json!({
                "workflow": self.workflow,
                "flow_id": report.flow_id,
                "fingerprint": fingerprint,
                "summary": report.summary,
            })),
            FlowTerminalState::Failed { step_id, error } => {
                Err(inv.fail(format!("workflow {} failed at '{step_id}': {error}", report.flow_id)))
            }
            FlowTerminalState::Running { next_step } => {
                Err(inv.fail(format!("workflow {} did not finish (next step {next_step:?})", report.flow_id)))
            }
        }
    }
}
