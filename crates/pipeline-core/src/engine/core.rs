//! Core FlowEngine implementation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use serde_json::json;
use uuid::Uuid;

use crate::engine::EngineBuilderInit;
use crate::errors::CoreEngineError;
use crate::event::{EventStore, FlowEvent, FlowEventKind};
use crate::hashing::hash_value;
use crate::injection::{apply_injectors, ParamInjector};
use crate::model::{Artifact, ExecutionContext, StepFingerprintInput};
use crate::repo::{FlowDefinition, FlowRepository, FlowTerminalState};
use crate::step::{StepDefinition, StepRunResult, StepSignal};

/// Motor de ejecución de flujos lineales.
///
/// Orquesta la ejecución de pasos en orden estricto, registra cada
/// transición como evento y se detiene ante el primer fallo (sin reintentos).
#[derive(Debug)]
pub struct FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    event_store: E,
    repository: R,
    artifact_store: HashMap<String, Artifact>,
    injectors: Vec<Box<dyn ParamInjector>>,
    default_step_timeout: Option<Duration>,
    default_flow_id: Option<Uuid>,
    default_definition: Option<Arc<FlowDefinition>>,
}

impl<E, R> FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    /// Crea un nuevo builder para configurar el engine
    #[inline]
    pub fn builder(event_store: E, repository: R) -> EngineBuilderInit<E, R> {
        EngineBuilderInit::new(event_store, repository)
    }

    /// Crea un nuevo motor con los stores proporcionados
    pub fn new_with_stores(event_store: E, repository: R) -> Self {
        Self { event_store,
               repository,
               artifact_store: HashMap::new(),
               injectors: Vec::new(),
               default_step_timeout: None,
               default_flow_id: None,
               default_definition: None }
    }

    /// Añade un inyector de parámetros
    pub fn add_injector(&mut self, injector: Box<dyn ParamInjector>) {
        self.injectors.push(injector);
    }

    /// Límite aplicado a steps que no declaran `timeout()` propio.
    pub fn set_default_step_timeout(&mut self, timeout: Option<Duration>) {
        self.default_step_timeout = timeout;
    }

    pub fn default_step_timeout(&self) -> Option<Duration> {
        self.default_step_timeout
    }

    /// Recupera un artifact por su hash
    pub fn get_artifact(&self, hash: &str) -> Option<&Artifact> {
        self.artifact_store.get(hash)
    }

    /// Almacena un artifact en la cache local
    pub fn store_artifact(&mut self, artifact: Artifact) {
        self.artifact_store.insert(artifact.hash.clone(), artifact);
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Garantiza un `FlowInitialized` y devuelve los eventos actuales del
    /// flujo (incluyendo el recién agregado).
    fn load_or_init(&mut self, flow_id: Uuid, definition: &FlowDefinition) -> Vec<FlowEvent> {
        let mut events = self.event_store.list(flow_id);
        let has_init = events.iter().any(|e| matches!(e.kind, FlowEventKind::FlowInitialized { .. }));
        if !has_init {
            info!("flow {flow_id} initialized with steps {:?}", definition.step_ids());
            let ev = self.event_store
                         .append_kind(flow_id,
                                      FlowEventKind::FlowInitialized { definition_hash: definition.definition_hash.clone(),
                                                                       step_count: definition.len() });
            events.push(ev);
        }
        events
    }

    /// Define/genera un `flow_id` por defecto si no existe aún y lo retorna.
    pub fn ensure_default_flow_id(&mut self) -> Uuid {
        *self.default_flow_id.get_or_insert_with(Uuid::new_v4)
    }

    /// Obtiene el `flow_id` por defecto si está configurado.
    pub fn default_flow_id(&self) -> Option<Uuid> {
        self.default_flow_id
    }

    /// Configura la definición por defecto del flujo
    pub fn set_default_definition(&mut self, definition: FlowDefinition) {
        self.default_definition = Some(Arc::new(definition));
    }

    pub fn default_definition(&self) -> Option<Arc<FlowDefinition>> {
        self.default_definition.clone()
    }

    fn require_default(&mut self) -> Result<(Uuid, Arc<FlowDefinition>), CoreEngineError> {
        let def = self.default_definition
                      .clone()
                      .ok_or_else(|| CoreEngineError::Internal("no default definition configured".into()))?;
        Ok((self.ensure_default_flow_id(), def))
    }

    fn hash_and_store_outputs(&mut self, outputs: &mut [Artifact]) -> Vec<String> {
        let mut hashes: Vec<String> = Vec::with_capacity(outputs.len());
        for o in outputs.iter_mut() {
            let h = hash_value(&o.payload);
            o.hash = h.clone();
            self.store_artifact(o.clone());
            hashes.push(h);
        }
        hashes
    }

    /// Ejecuta el flujo por defecto completo y retorna su id.
    pub async fn run(&mut self) -> Result<Uuid, CoreEngineError> {
        self.run_to_completion().await
    }

    /// Avanza un paso del flujo por defecto.
    pub async fn step(&mut self) -> Result<(), CoreEngineError> {
        self.next().await
    }

    /// Ejecuta el flujo completo usando la definición por defecto
    pub async fn run_to_completion(&mut self) -> Result<Uuid, CoreEngineError> {
        let (flow_id, def) = self.require_default()?;
        self.run_flow_to_completion(flow_id, &def).await
    }

    /// Ejecuta un flujo específico hasta su finalización
    pub async fn run_flow_to_completion(&mut self,
                                        flow_id: Uuid,
                                        definition: &FlowDefinition)
                                        -> Result<Uuid, CoreEngineError> {
        loop {
            match self.next_with(flow_id, definition).await {
                Ok(()) => continue,
                Err(CoreEngineError::FlowCompleted) => return Ok(flow_id),
                Err(e) => return Err(e),
            }
        }
    }

    /// Ejecuta el step en el cursor del flujo.
    pub(crate) async fn next_with(&mut self, flow_id: Uuid, definition: &FlowDefinition) -> Result<(), CoreEngineError> {
        let events = self.load_or_init(flow_id, definition);
        let instance = self.repository.load(flow_id, &events, definition);

        if instance.failure.is_some() {
            return Err(CoreEngineError::FlowHasFailed);
        }
        if instance.completed {
            return Err(CoreEngineError::FlowCompleted);
        }

        let cursor = instance.cursor;
        if cursor >= definition.len() {
            return Err(CoreEngineError::FlowCompleted);
        }

        let step_def = definition.steps
                                 .get(cursor)
                                 .ok_or(CoreEngineError::InvalidStepIndex)?
                                 .as_ref();
        let input = if cursor == 0 {
            None
        } else {
            let prev = instance.steps
                               .get(cursor - 1)
                               .and_then(|s| s.outputs.first())
                               .and_then(|h| self.artifact_store.get(h).cloned());
            if prev.is_none() {
                return self.record_failure(flow_id,
                                           cursor,
                                           step_def,
                                           &step_def.base_params(),
                                           CoreEngineError::MissingInputs(format!("no input for step '{}'",
                                                                                  step_def.id())));
            }
            prev
        };

        let mut ctx = ExecutionContext { step_id: step_def.id().to_string(),
                                         input,
                                         params: step_def.base_params() };
        ctx.params = apply_injectors(&self.injectors, &ctx.params, &ctx);

        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepStarted { step_index: cursor,
                                                                  step_id: step_def.id().to_string() });
        info!("flow {flow_id}: step '{}' started", step_def.id());

        let run_res = match step_def.timeout().or(self.default_step_timeout) {
            Some(limit) => match tokio::time::timeout(limit, step_def.run(&ctx)).await {
                Ok(res) => res,
                Err(_) => StepRunResult::Failure { error: CoreEngineError::TaskTimeout { step_id: step_def.id().to_string(),
                                                                                         timeout_ms: limit.as_millis() as u64 } },
            },
            None => step_def.run(&ctx).await,
        };

        match run_res {
            StepRunResult::Success { outputs } => {
                self.handle_step_success(flow_id, cursor, step_def, &ctx.params, outputs, vec![], definition)
            }
            StepRunResult::SuccessWithSignals { outputs, signals } => {
                self.handle_step_success(flow_id, cursor, step_def, &ctx.params, outputs, signals, definition)
            }
            StepRunResult::Failure { error } => self.record_failure(flow_id, cursor, step_def, &ctx.params, error),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_step_success(&mut self,
                           flow_id: Uuid,
                           cursor: usize,
                           step_def: &dyn StepDefinition,
                           params: &serde_json::Value,
                           mut outputs: Vec<Artifact>,
                           signals: Vec<StepSignal>,
                           definition: &FlowDefinition)
                           -> Result<(), CoreEngineError> {
        let output_hashes = self.hash_and_store_outputs(&mut outputs);

        for s in signals {
            info!("flow {flow_id}: step '{}' signal {}", step_def.id(), s.signal);
            self.event_store.append_kind(flow_id,
                                         FlowEventKind::StepSignal { step_index: cursor,
                                                                     step_id: step_def.id().to_string(),
                                                                     signal: s.signal,
                                                                     data: s.data });
        }

        let fp = self.calculate_step_fingerprint(cursor, &output_hashes, params, definition);
        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepFinished { step_index: cursor,
                                                                   step_id: step_def.id().to_string(),
                                                                   outputs: output_hashes,
                                                                   fingerprint: fp });
        info!("flow {flow_id}: step '{}' finished", step_def.id());

        if cursor + 1 == definition.len() {
            self.complete_flow(flow_id, definition);
        }
        Ok(())
    }

    fn record_failure(&mut self,
                      flow_id: Uuid,
                      cursor: usize,
                      step_def: &dyn StepDefinition,
                      params: &serde_json::Value,
                      error: CoreEngineError)
                      -> Result<(), CoreEngineError> {
        let fp = hash_value(&json!({
                                "engine_version": crate::constants::ENGINE_VERSION,
                                "definition_hash": step_def.definition_hash(),
                                "step_index": cursor,
                                "params": params
                            }));
        error!("flow {flow_id}: step '{}' failed: {error}", step_def.id());
        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepFailed { step_index: cursor,
                                                                 step_id: step_def.id().to_string(),
                                                                 error: error.clone(),
                                                                 fingerprint: fp });
        Err(error)
    }

    fn calculate_step_fingerprint(&self,
                                  cursor: usize,
                                  output_hashes: &[String],
                                  params: &serde_json::Value,
                                  definition: &FlowDefinition)
                                  -> String {
        let input = StepFingerprintInput { engine_version: crate::constants::ENGINE_VERSION,
                                           definition_hash: &definition.definition_hash,
                                           step_index: cursor,
                                           output_hashes,
                                           params };
        hash_value(&json!(input))
    }

    fn complete_flow(&mut self, flow_id: Uuid, definition: &FlowDefinition) {
        let step_fps: Vec<String> = self.event_store
                                        .list(flow_id)
                                        .iter()
                                        .filter_map(|e| match &e.kind {
                                            FlowEventKind::StepFinished { fingerprint, .. } => Some(fingerprint.clone()),
                                            _ => None,
                                        })
                                        .collect();

        let flow_fp = hash_value(&json!({
                                     "engine_version": crate::constants::ENGINE_VERSION,
                                     "definition_hash": definition.definition_hash,
                                     "step_fingerprints": step_fps
                                 }));
        info!("flow {flow_id} completed");
        self.event_store
            .append_kind(flow_id, FlowEventKind::FlowCompleted { flow_fingerprint: flow_fp });
    }

    /// Avanza un paso en el flujo por defecto
    pub async fn next(&mut self) -> Result<(), CoreEngineError> {
        let (flow_id, def) = self.require_default()?;
        self.next_with(flow_id, &def).await
    }

    /// Lista eventos del flujo por defecto
    pub fn events(&self) -> Option<Vec<FlowEvent>> {
        self.default_flow_id.map(|fid| self.event_store.list(fid))
    }

    /// Lista eventos de un flujo arbitrario.
    pub fn list_events_for(&self, flow_id: Uuid) -> Vec<FlowEvent> {
        self.event_store.list(flow_id)
    }

    /// Estado terminal (o siguiente step) de un flujo, vía replay.
    pub fn terminal_state(&self, flow_id: Uuid, definition: &FlowDefinition) -> FlowTerminalState {
        let events = self.event_store.list(flow_id);
        self.repository.load(flow_id, &events, definition).terminal_state()
    }

    /// `terminal_state` sobre el flujo y la definición por defecto.
    pub fn default_terminal_state(&self) -> Option<FlowTerminalState> {
        let flow_id = self.default_flow_id?;
        let def = self.default_definition.as_ref()?;
        Some(self.terminal_state(flow_id, def))
    }

    /// Señales emitidas en un flujo, en orden.
    pub fn signals_for(&self, flow_id: Uuid) -> Vec<(String, StepSignal)> {
        self.event_store
            .list(flow_id)
            .into_iter()
            .filter_map(|e| match e.kind {
                FlowEventKind::StepSignal { step_id, signal, data, .. } => Some((step_id, StepSignal { signal, data })),
                _ => None,
            })
            .collect()
    }

    /// Códigos de evento (`FlowEventKind::code`) del flujo por defecto.
    pub fn event_variants(&self) -> Option<Vec<&'static str>> {
        self.events().map(|events| events.iter().map(|e| e.kind.code()).collect())
    }

    /// Fingerprint del flujo por defecto si está presente
    pub fn flow_fingerprint(&self) -> Option<String> {
        let evs = self.events()?;
        evs.iter().rev().find_map(|e| match &e.kind {
                            FlowEventKind::FlowCompleted { flow_fingerprint } => Some(flow_fingerprint.clone()),
                            _ => None,
                        })
    }
}

impl FlowEngine<crate::event::InMemoryEventStore, crate::repo::InMemoryFlowRepository> {
    /// Builder con stores en memoria.
    #[inline]
    pub fn new() -> EngineBuilderInit<crate::event::InMemoryEventStore, crate::repo::InMemoryFlowRepository> {
        EngineBuilderInit::new(crate::event::InMemoryEventStore::default(),
                               crate::repo::InMemoryFlowRepository::new())
    }
}

impl Default for FlowEngine<crate::event::InMemoryEventStore, crate::repo::InMemoryFlowRepository> {
    fn default() -> Self {
        Self::new_with_stores(crate::event::InMemoryEventStore::default(),
                              crate::repo::InMemoryFlowRepository::new())
    }
}
