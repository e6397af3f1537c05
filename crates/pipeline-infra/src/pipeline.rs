//! Ejecutor del pipeline de entrega.
//!
//! Los stages corren en orden y cada transición es una barrera. Dentro de un
//! stage, los grupos de `run_order` corren en orden ascendente y las acciones
//! de un mismo grupo se lanzan como tareas concurrentes. La primera acción
//! fallida detiene el pipeline al cerrar su grupo: no hay rollback ni
//! reintento.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{error, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::{ActionInvocation, ActionRegistry, StageAction};
use crate::errors::DeliveryError;
use crate::stage::{ActionDeclaration, PipelineArtifact, PipelineDefinition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Succeeded,
    Failed { stage: String, action: String, error: DeliveryError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Succeeded,
    Failed { error: DeliveryError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub stage: String,
    pub action: String,
    pub run_order: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineExecution {
    pub execution_id: Uuid,
    pub commit: String,
    pub status: ExecutionStatus,
    pub artifacts: IndexMap<String, PipelineArtifact>,
    pub records: Vec<ActionRecord>,
}

impl PipelineExecution {
    pub fn succeeded(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }

    pub fn record(&self, action: &str) -> Option<&ActionRecord> {
        self.records.iter().find(|r| r.action == action)
    }

    /// Stages que llegaron a ejecutar alguna acción, en orden.
    pub fn stages_started(&self) -> Vec<&str> {
        let mut stages: Vec<&str> = Vec::new();
        for r in &self.records {
            if stages.last() != Some(&r.stage.as_str()) {
                stages.push(&r.stage);
            }
        }
        stages
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryPipeline {
    definition: PipelineDefinition,
    registry: ActionRegistry,
}

impl DeliveryPipeline {
    /// Valida la definición y que cada acción declarada esté registrada.
    pub fn new(definition: PipelineDefinition, registry: ActionRegistry) -> Result<Self, DeliveryError> {
        definition.validate()?;
        let missing = registry.missing_for(&definition);
        if !missing.is_empty() {
            return Err(DeliveryError::InvalidDefinition(format!("actions without implementation: {}",
                                                                missing.join(", "))));
        }
        Ok(Self { definition, registry })
    }

    pub fn definition(&self) -> &PipelineDefinition {
        &self.definition
    }

    pub async fn execute(&self, commit: &str) -> PipelineExecution {
        let execution_id = Uuid::new_v4();
        info!("pipeline '{}' execution {execution_id} started for commit {commit}", self.definition.name);
        let mut execution = PipelineExecution { execution_id,
                                                commit: commit.to_string(),
                                                status: ExecutionStatus::Succeeded,
                                                artifacts: IndexMap::new(),
                                                records: Vec::new() };

        for stage in &self.definition.stages {
            info!("execution {execution_id}: entering stage '{}'", stage.name);
            for (run_order, group) in stage.run_order_groups() {
                let mut handles = Vec::with_capacity(group.len());
                for decl in group {
                    let invocation = ActionInvocation { execution_id,
                                                        commit: commit.to_string(),
                                                        stage: stage.name.clone(),
                                                        action: decl.name.clone(),
                                                        inputs: decl.inputs
                                                                    .iter()
                                                                    .filter_map(|n| execution.artifacts.get(n).cloned())
                                                                    .collect(),
                                                        role_arn: decl.role_arn.clone() };
                    // `new` garantiza que cada acción declarada está registrada.
                    let Some(action) = self.registry.get(&decl.name) else {
                        continue;
                    };
                    let timeout = decl.timeout;
                    let started_at = Utc::now();
                    let handle = tokio::spawn(async move { run_action(action, invocation, timeout).await });
                    handles.push((decl, started_at, handle));
                }

                let mut failure: Option<(String, DeliveryError)> = None;
                for (decl, started_at, handle) in handles {
                    let result = match handle.await {
                        Ok(result) => result,
                        Err(join) => Err(DeliveryError::action_failure(&stage.name, &decl.name, format!("task aborted: {join}"))),
                    };
                    let outcome = match result {
                        Ok(payload) => {
                            publish_outputs(&mut execution.artifacts, decl, commit, payload);
                            info!("execution {execution_id}: action '{}' succeeded", decl.name);
                            ActionOutcome::Succeeded
                        }
                        Err(e) => {
                            error!("execution {execution_id}: action '{}' failed: {e}", decl.name);
                            if failure.is_none() {
                                failure = Some((decl.name.clone(), e.clone()));
                            }
                            ActionOutcome::Failed { error: e }
                        }
                    };
                    execution.records.push(ActionRecord { stage: stage.name.clone(),
                                                          action: decl.name.clone(),
                                                          run_order,
                                                          started_at,
                                                          finished_at: Utc::now(),
                                                          outcome });
                }

                if let Some((action, error)) = failure {
                    error!("execution {execution_id}: halted at stage '{}'", stage.name);
                    execution.status = ExecutionStatus::Failed { stage: stage.name.clone(),
                                                                 action,
                                                                 error };
                    return execution;
                }
            }
        }
        info!("execution {execution_id}: succeeded");
        execution
    }
}

async fn run_action(action: Arc<dyn StageAction>,
                    invocation: ActionInvocation,
                    timeout: Duration)
                    -> Result<serde_json::Value, DeliveryError> {
    match tokio::time::timeout(timeout, action.execute(&invocation)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::TaskTimeout { stage: invocation.stage.clone(),
                                                   action: invocation.action.clone(),
                                                   timeout_ms: timeout.as_millis() as u64 }),
    }
}

fn publish_outputs(artifacts: &mut IndexMap<String, PipelineArtifact>,
                   decl: &ActionDeclaration,
                   commit: &str,
                   payload: serde_json::Value) {
    for name in &decl.outputs {
        artifacts.insert(name.clone(), PipelineArtifact::new(name.clone(), commit, payload.clone()));
    }
}
