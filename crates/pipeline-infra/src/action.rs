//! Contrato de una acción de stage y el registro que asocia cada acción
//! declarada con su implementación.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DeliveryError;
use crate::stage::{PipelineArtifact, PipelineDefinition};

/// Lo que recibe una acción al ejecutarse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub execution_id: Uuid,
    pub commit: String,
    pub stage: String,
    pub action: String,
    pub inputs: Vec<PipelineArtifact>,
    pub role_arn: Option<String>,
}

impl ActionInvocation {
    pub fn fail(&self, reason: impl Into<String>) -> DeliveryError {
        DeliveryError::action_failure(&self.stage, &self.action, reason)
    }
}

/// Una acción devuelve el payload de sus artifacts de salida; el pipeline
/// los nombra según la declaración.
#[async_trait]
pub trait StageAction: Send + Sync + std::fmt::Debug {
    async fn execute(&self, invocation: &ActionInvocation) -> Result<serde_json::Value, DeliveryError>;
}

#[derive(Debug, Default, Clone)]
pub struct ActionRegistry {
    actions: IndexMap<String, Arc<dyn StageAction>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, action: Arc<dyn StageAction>) -> &mut Self {
        self.actions.insert(name.into(), action);
        self
    }

    pub fn with(mut self, name: impl Into<String>, action: Arc<dyn StageAction>) -> Self {
        self.register(name, action);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn StageAction>> {
        self.actions.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Acciones declaradas sin implementación registrada.
    pub fn missing_for(&self, definition: &PipelineDefinition) -> Vec<String> {
        definition.action_names()
                  .filter(|n| !self.actions.contains_key(*n))
                  .map(str::to_string)
                  .collect()
    }
}
