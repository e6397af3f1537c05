//! Eventos de una ejecución del workflow.
//!
//! El log de un `flow_id` es la única fuente de verdad: el repositorio
//! reconstruye cursor, fallo y fingerprint final reproduciéndolo en orden.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreEngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Primer evento de todo flujo. Fija la definición (hash y cantidad de
    /// tareas) contra la que se reproduce el resto del log.
    FlowInitialized { definition_hash: String, step_count: usize },
    StepStarted { step_index: usize, step_id: String },
    /// `outputs` son hashes de artifacts, nunca los payloads.
    StepFinished {
        step_index: usize,
        step_id: String,
        outputs: Vec<String>,
        fingerprint: String,
    },
    /// Fallo terminal (incluye `TaskTimeout`); ninguna tarea posterior
    /// arranca.
    StepFailed {
        step_index: usize,
        step_id: String,
        error: CoreEngineError,
        fingerprint: String,
    },
    /// Hito informativo de una tarea, p.ej. `PROMOTION_DECISION` de evaluate.
    /// No mueve el cursor.
    StepSignal {
        step_index: usize,
        step_id: String,
        signal: String,
        data: serde_json::Value,
    },
    /// Cierre tras la última tarea, con el fingerprint agregado.
    FlowCompleted { flow_fingerprint: String },
}

impl FlowEventKind {
    /// Código de una letra para comparar secuencias en tests y logs.
    pub fn code(&self) -> &'static str {
        match self {
            FlowEventKind::FlowInitialized { .. } => "I",
            FlowEventKind::StepStarted { .. } => "S",
            FlowEventKind::StepFinished { .. } => "F",
            FlowEventKind::StepFailed { .. } => "X",
            FlowEventKind::StepSignal { .. } => "G",
            FlowEventKind::FlowCompleted { .. } => "C",
        }
    }

    /// Tarea a la que se refiere el evento, si es de tarea.
    pub fn step_id(&self) -> Option<&str> {
        match self {
            FlowEventKind::StepStarted { step_id, .. }
            | FlowEventKind::StepFinished { step_id, .. }
            | FlowEventKind::StepFailed { step_id, .. }
            | FlowEventKind::StepSignal { step_id, .. } => Some(step_id),
            FlowEventKind::FlowInitialized { .. } | FlowEventKind::FlowCompleted { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    /// Orden de append dentro del store.
    pub seq: u64,
    pub flow_id: Uuid,
    pub kind: FlowEventKind,
    /// Metadato; no participa de ningún fingerprint.
    pub ts: DateTime<Utc>,
}
