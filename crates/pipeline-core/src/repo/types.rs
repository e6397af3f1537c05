//! Tipos de repositorio: estado reconstruido (FlowInstance) y definición
//! (FlowDefinition).
//!
//! El repositorio aplica un replay lineal: consume eventos en orden y
//! actualiza un `FlowInstance`. No almacena artifacts completos (sólo
//! hashes).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreEngineError;
use crate::event::{FlowEvent, FlowEventKind};
use crate::step::{StepDefinition, StepStatus};

#[derive(Debug)]
pub struct FlowInstance {
    pub id: Uuid,
    pub steps: Vec<StepSlot>,
    pub cursor: usize,
    pub completed: bool,
    pub failure: Option<FlowFailure>,
    pub flow_fingerprint: Option<String>,
}

impl FlowInstance {
    /// Estado terminal observable del flow (o el próximo step pendiente).
    pub fn terminal_state(&self) -> FlowTerminalState {
        if let Some(f) = &self.failure {
            return FlowTerminalState::Failed { step_id: f.step_id.clone(),
                                               error: f.error.clone() };
        }
        if self.completed {
            return FlowTerminalState::Done { fingerprint: self.flow_fingerprint.clone().unwrap_or_default() };
        }
        FlowTerminalState::Running { next_step: self.steps.get(self.cursor).map(|s| s.step_id.clone()) }
    }
}

/// Primer fallo registrado en el flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowFailure {
    pub step_index: usize,
    pub step_id: String,
    pub error: CoreEngineError,
}

/// `Done` y `Failed` son terminales; `Running` indica el siguiente step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowTerminalState {
    Running { next_step: Option<String> },
    Done { fingerprint: String },
    Failed { step_id: String, error: CoreEngineError },
}

impl FlowTerminalState {
    pub fn is_done(&self) -> bool {
        matches!(self, FlowTerminalState::Done { .. })
    }
}

/// Estado de un step en la instancia.
#[derive(Debug)]
pub struct StepSlot {
    pub step_id: String,
    pub status: StepStatus,
    pub fingerprint: Option<String>,
    pub outputs: Vec<String>, // sólo hashes
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Trait para reconstruir (`replay`) estado de un flow a partir de eventos.
pub trait FlowRepository: Send + Sync {
    fn load(&self, flow_id: Uuid, events: &[FlowEvent], definition: &FlowDefinition) -> FlowInstance;
}

/// Definición inmutable del Flow.
#[derive(Debug)]
pub struct FlowDefinition {
    pub steps: Vec<Box<dyn StepDefinition>>,
    pub definition_hash: String,
}

impl FlowDefinition {
    pub fn new(steps: Vec<Box<dyn StepDefinition>>, definition_hash: String) -> Self {
        Self { steps, definition_hash }
    }
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFlowRepository;
impl InMemoryFlowRepository {
    pub fn new() -> Self {
        Self
    }
}

impl FlowRepository for InMemoryFlowRepository {
    fn load(&self, flow_id: Uuid, events: &[FlowEvent], definition: &FlowDefinition) -> FlowInstance {
        let mut steps: Vec<StepSlot> = definition.steps
                                                 .iter()
                                                 .map(|s| StepSlot { step_id: s.id().to_string(),
                                                                     status: StepStatus::Pending,
                                                                     fingerprint: None,
                                                                     outputs: vec![],
                                                                     started_at: None,
                                                                     finished_at: None })
                                                 .collect();
        let mut completed = false;
        let mut failure = None;
        let mut flow_fingerprint = None;
        for ev in events {
            match &ev.kind {
                FlowEventKind::FlowInitialized { .. } | FlowEventKind::StepSignal { .. } => {}
                FlowEventKind::StepStarted { step_index, .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::Running;
                        slot.started_at = Some(ev.ts);
                    }
                }
                FlowEventKind::StepFinished { step_index,
                                              fingerprint,
                                              outputs,
                                              .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::FinishedOk;
                        slot.fingerprint = Some(fingerprint.clone());
                        slot.outputs = outputs.clone();
                        slot.finished_at = Some(ev.ts);
                    }
                }
                FlowEventKind::StepFailed { step_index,
                                            step_id,
                                            error,
                                            fingerprint, } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::Failed;
                        slot.fingerprint = Some(fingerprint.clone());
                        slot.finished_at = Some(ev.ts);
                    }
                    if failure.is_none() {
                        failure = Some(FlowFailure { step_index: *step_index,
                                                     step_id: step_id.clone(),
                                                     error: error.clone() });
                    }
                }
                FlowEventKind::FlowCompleted { flow_fingerprint: fp } => {
                    completed = true;
                    flow_fingerprint = Some(fp.clone());
                }
            }
        }
        let cursor = steps.iter()
                          .position(|s| !s.status.is_success())
                          .unwrap_or(steps.len());
        FlowInstance { id: flow_id,
                       steps,
                       cursor,
                       completed,
                       failure,
                       flow_fingerprint }
    }
}

pub fn build_flow_definition(step_ids: &[&str], steps: Vec<Box<dyn StepDefinition>>) -> FlowDefinition {
    use crate::hashing::hash_value;
    let definition_hash = hash_value(&serde_json::json!(step_ids));
    FlowDefinition::new(steps, definition_hash)
}

/// Variante que extrae los ids de los steps en orden.
pub fn build_flow_definition_auto(steps: Vec<Box<dyn StepDefinition>>) -> FlowDefinition {
    let ids: Vec<String> = steps.iter().map(|s| s.id().to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
    build_flow_definition(&id_refs, steps)
}
