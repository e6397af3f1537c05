//! Engine module for FlowEngine implementation
//!
//! Provides the core engine, builder pattern, and flow context for linear
//! fail-stop workflow execution.

pub mod builder;
pub mod core;
pub mod flow_ctx;

pub use builder::{EngineBuilder, EngineBuilderInit};
pub use core::FlowEngine;
pub use flow_ctx::FlowCtx;

pub use crate::event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use crate::repo::{FlowDefinition, FlowRepository, FlowTerminalState, InMemoryFlowRepository};
pub use crate::step::{StepRunResult, StepStatus};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreEngineError;
    use crate::model::{ArtifactKind, ArtifactSpec, ExecutionContext};
    use crate::step::{StepKind, StepRunResultTyped, StepSignal, TypedStep};
    use crate::injection::ParamInjector;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Note {
        trail: Vec<String>,
        schema_version: u32,
    }

    impl ArtifactSpec for Note {
        const KIND: ArtifactKind = ArtifactKind::GenericJson;
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct NoteParams {
        tag: Option<String>,
    }

    /// Step de prueba: agrega su id al trail y registra la ejecución.
    #[derive(Debug)]
    struct Mark {
        id: &'static str,
        kind: StepKind,
        fail: bool,
        delay: Option<Duration>,
        timeout: Option<Duration>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Mark {
        fn new(id: &'static str, kind: StepKind, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self { id,
                   kind,
                   fail: false,
                   delay: None,
                   timeout: None,
                   log: log.clone() }
        }
    }

    #[async_trait]
    impl TypedStep for Mark {
        type Params = NoteParams;
        type Input = Note;
        type Output = Note;

        fn id(&self) -> &'static str {
            self.id
        }
        fn kind(&self) -> StepKind {
            self.kind
        }
        fn timeout(&self) -> Option<Duration> {
            self.timeout
        }

        async fn run_typed(&self, input: Option<Note>, params: NoteParams) -> StepRunResultTyped<Note> {
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            self.log.lock().unwrap().push(self.id.to_string());
            if self.fail {
                return StepRunResultTyped::Failure { error: CoreEngineError::InsufficientData("empty".into()) };
            }
            let mut trail = input.map(|n| n.trail).unwrap_or_default();
            trail.push(params.tag.unwrap_or_else(|| self.id.to_string()));
            let out = Note { trail, schema_version: 1 };
            if self.kind == StepKind::Check {
                return StepRunResultTyped::SuccessWithSignals { outputs: vec![out],
                                                                signals: vec![StepSignal::new("CHECKED", json!({"ok": true}))] };
            }
            StepRunResultTyped::Success { outputs: vec![out] }
        }
    }

    fn log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn runs_steps_in_order_and_completes() {
        let l = log();
        let mut engine = FlowEngine::new().first_step(Mark::new("init", StepKind::Source, &l))
                                          .add_step(Mark::new("prepare", StepKind::Transform, &l))
                                          .add_step(Mark::new("evaluate", StepKind::Check, &l))
                                          .build();

        let flow_id = engine.run().await.expect("flow completes");
        assert_eq!(*l.lock().unwrap(), vec!["init", "prepare", "evaluate"]);
        assert_eq!(engine.event_variants().unwrap(),
                   vec!["I", "S", "F", "S", "F", "S", "G", "F", "C"]);
        let def = engine.default_definition().unwrap();
        let state = engine.terminal_state(flow_id, &def);
        assert!(state.is_done());
        assert_eq!(engine.signals_for(flow_id)[0].0, "evaluate");
    }

    #[tokio::test]
    async fn step_by_step_then_flow_completed() {
        let l = log();
        let mut engine = FlowEngine::new().first_step(Mark::new("a", StepKind::Source, &l))
                                          .add_step(Mark::new("b", StepKind::Sink, &l))
                                          .build();
        assert!(engine.step().await.is_ok());
        assert_eq!(engine.default_terminal_state(),
                   Some(FlowTerminalState::Running { next_step: Some("b".into()) }));
        assert!(engine.step().await.is_ok());
        assert_eq!(engine.step().await, Err(CoreEngineError::FlowCompleted));
        assert!(engine.flow_fingerprint().is_some());
    }

    #[tokio::test]
    async fn failure_stops_the_flow() {
        let l = log();
        let mut failing = Mark::new("prepare", StepKind::Transform, &l);
        failing.fail = true;
        let mut engine = FlowEngine::new().first_step(Mark::new("init", StepKind::Source, &l))
                                          .add_step(failing)
                                          .add_step(Mark::new("train", StepKind::Transform, &l))
                                          .build();

        let err = engine.run().await.unwrap_err();
        assert_eq!(err.code(), "InsufficientData");
        assert_eq!(*l.lock().unwrap(), vec!["init", "prepare"]);
        assert!(matches!(engine.default_terminal_state(),
                         Some(FlowTerminalState::Failed { ref step_id, .. }) if step_id == "prepare"));
        // un flujo fallido no avanza
        assert_eq!(engine.step().await, Err(CoreEngineError::FlowHasFailed));
        assert_eq!(*l.lock().unwrap(), vec!["init", "prepare"]);
    }

    #[tokio::test]
    async fn slow_step_times_out() {
        let l = log();
        let mut slow = Mark::new("train", StepKind::Transform, &l);
        slow.delay = Some(Duration::from_millis(200));
        slow.timeout = Some(Duration::from_millis(20));
        let mut engine = FlowEngine::new().first_step(Mark::new("init", StepKind::Source, &l))
                                          .add_step(slow)
                                          .build();

        let err = engine.run().await.unwrap_err();
        assert_eq!(err,
                   CoreEngineError::TaskTimeout { step_id: "train".into(),
                                                  timeout_ms: 20 });
        assert_eq!(*l.lock().unwrap(), vec!["init"]);
        assert_eq!(engine.event_variants().unwrap().last(), Some(&"X"));
    }

    #[tokio::test]
    async fn default_timeout_applies_without_step_override() {
        let l = log();
        let mut slow = Mark::new("init", StepKind::Source, &l);
        slow.delay = Some(Duration::from_millis(200));
        let mut engine = FlowEngine::new().first_step(slow)
                                          .with_default_step_timeout(Duration::from_millis(10))
                                          .build();
        assert_eq!(engine.run().await.unwrap_err().code(), "TaskTimeout");
    }

    #[derive(Debug)]
    struct TagInjector;
    impl ParamInjector for TagInjector {
        fn inject(&self, _base: &Value, ctx: &ExecutionContext) -> Value {
            json!({"tag": format!("{}-injected", ctx.step_id)})
        }
    }

    #[tokio::test]
    async fn injectors_feed_step_params() {
        let l = log();
        let mut engine = FlowEngine::new().first_step(Mark::new("init", StepKind::Source, &l))
                                          .add_step(Mark::new("train", StepKind::Sink, &l))
                                          .with_injector(Box::new(TagInjector))
                                          .build();
        engine.run().await.unwrap();
        let events = engine.events().unwrap();
        let last_output = events.iter()
                                .rev()
                                .find_map(|e| match &e.kind {
                                    FlowEventKind::StepFinished { outputs, .. } => outputs.first().cloned(),
                                    _ => None,
                                })
                                .unwrap();
        let art = engine.get_artifact(&last_output).unwrap();
        assert_eq!(art.payload["trail"], json!(["init-injected", "train-injected"]));
    }

    #[tokio::test]
    async fn flow_ctx_drives_an_explicit_flow() {
        let l = log();
        let mut engine = FlowEngine::new().first_step(Mark::new("a", StepKind::Source, &l))
                                          .add_step(Mark::new("b", StepKind::Transform, &l))
                                          .add_step(Mark::new("c", StepKind::Sink, &l))
                                          .build();
        let definition = engine.default_definition().unwrap();
        let flow_id = uuid::Uuid::new_v4();
        let mut ctx = FlowCtx::new(&mut engine, flow_id, &definition);
        assert!(ctx.step().await.is_ok());
        assert!(matches!(ctx.terminal_state(), FlowTerminalState::Running { .. }));
        assert!(ctx.run_to_completion().await.is_done());
        assert_eq!(ctx.step().await, Err(CoreEngineError::FlowCompleted));
        assert!(ctx.signals().is_empty());
        assert_eq!(engine.list_events_for(flow_id).len(), 8);
    }
}
