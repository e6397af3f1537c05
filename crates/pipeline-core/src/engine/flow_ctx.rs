//! `FlowCtx`: vista de un único flujo (id + definición) sobre un engine.

use uuid::Uuid;

use crate::engine::FlowEngine;
use crate::errors::CoreEngineError;
use crate::event::EventStore;
use crate::repo::{FlowDefinition, FlowRepository, FlowTerminalState};
use crate::step::StepSignal;

pub struct FlowCtx<'a, E: EventStore, R: FlowRepository> {
    pub engine: &'a mut FlowEngine<E, R>,
    pub flow_id: Uuid,
    pub definition: &'a FlowDefinition,
}

impl<'a, E: EventStore, R: FlowRepository> FlowCtx<'a, E, R> {
    #[inline]
    pub fn new(engine: &'a mut FlowEngine<E, R>, flow_id: Uuid, definition: &'a FlowDefinition) -> Self {
        Self { engine,
               flow_id,
               definition }
    }

    /// Ejecuta la tarea bajo el cursor.
    pub async fn step(&mut self) -> Result<(), CoreEngineError> {
        self.engine.next_with(self.flow_id, self.definition).await
    }

    /// Corre hasta un estado terminal y lo devuelve. El fallo de una tarea
    /// queda en `Failed`, no en `Err`.
    pub async fn run_to_completion(&mut self) -> FlowTerminalState {
        if let Err(e) = self.engine.run_flow_to_completion(self.flow_id, self.definition).await {
            log::debug!("flow {} stopped: {e}", self.flow_id);
        }
        self.terminal_state()
    }

    pub fn terminal_state(&self) -> FlowTerminalState {
        self.engine.terminal_state(self.flow_id, self.definition)
    }

    pub fn signals(&self) -> Vec<(String, StepSignal)> {
        self.engine.signals_for(self.flow_id)
    }
}
