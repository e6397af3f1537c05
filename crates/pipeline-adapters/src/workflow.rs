//! Ensamblado del workflow de reentrenamiento:
//! `init → prepare → train → evaluate`.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use pipeline_core::run::{Environment, RunContextGenerator, RunParameters};
use pipeline_core::{ArtifactSpec, FlowCtx, FlowEngine, FlowEventKind, FlowTerminalState, InMemoryEventStore,
                    InMemoryFlowRepository};
use pipeline_persistence::ObjectStore;
use uuid::Uuid;

use crate::artifacts::{EvaluationReport, RunParametersArtifact};
use crate::source::DataSource;
use crate::{EvaluateStep, InitStep, PrepareStep, RunParametersInjector, TrainStep};

pub type TrainingEngine = FlowEngine<InMemoryEventStore, InMemoryFlowRepository>;

/// Parámetros de despliegue del workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub environment: Environment,
    pub project: String,
    pub init_timeout: Duration,
    pub task_timeout: Duration,
    pub min_improvement: f64,
}

impl WorkflowSettings {
    pub fn new(environment: Environment, project: impl Into<String>) -> Self {
        Self { environment,
               project: project.into(),
               init_timeout: Duration::from_secs(30),
               task_timeout: Duration::from_secs(180),
               min_improvement: 0.0 }
    }
}

/// Resultado observable de una invocación.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub flow_id: Uuid,
    pub state: FlowTerminalState,
    pub run_parameters: Option<RunParameters>,
    pub evaluation: Option<EvaluationReport>,
}

impl WorkflowOutcome {
    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }
}

pub fn build_training_engine(store: Arc<dyn ObjectStore>,
                             source: Arc<dyn DataSource>,
                             settings: &WorkflowSettings)
                             -> TrainingEngine {
    let generator = RunContextGenerator::new(settings.environment, settings.project.clone());
    FlowEngine::new().first_step(InitStep::new(generator).with_timeout(settings.init_timeout))
                     .add_step(PrepareStep::new(store.clone(), source))
                     .add_step(TrainStep::new(store.clone()))
                     .add_step(EvaluateStep::new(store).with_min_improvement(settings.min_improvement))
                     .with_injector(Box::new(RunParametersInjector))
                     .with_default_step_timeout(settings.task_timeout)
                     .build()
}

/// Ejecuta el workflow hasta un estado terminal. Un fallo de tarea no es un
/// `Err`: queda en `WorkflowOutcome::state`.
pub async fn run_training_workflow(engine: &mut TrainingEngine) -> WorkflowOutcome {
    let flow_id = engine.ensure_default_flow_id();
    let state = match engine.default_definition() {
        Some(definition) => FlowCtx::new(&mut *engine, flow_id, &definition).run_to_completion().await,
        None => {
            error!("training workflow {flow_id} has no definition");
            FlowTerminalState::Running { next_step: None }
        }
    };
    if let FlowTerminalState::Failed { step_id, error } = &state {
        error!("training workflow {flow_id} failed at '{step_id}': {error}");
    }

    let outputs: Vec<_> = engine.list_events_for(flow_id)
                                .into_iter()
                                .filter_map(|e| match e.kind {
                                    FlowEventKind::StepFinished { outputs, .. } => outputs.into_iter().next(),
                                    _ => None,
                                })
                                .filter_map(|h| engine.get_artifact(&h).cloned())
                                .collect();
    let run_parameters = outputs.first()
                                .and_then(|a| RunParametersArtifact::from_artifact(a).ok())
                                .map(|a| a.run_parameters);
    let evaluation = outputs.last().and_then(|a| EvaluationReport::from_artifact(a).ok());

    if let (FlowTerminalState::Done { .. }, Some(report)) = (&state, &evaluation) {
        info!("training workflow {flow_id} done: promote={} challenger={:.6} baseline={:.6}",
              report.result.promote,
              report.result.challenger_score,
              report.result.baseline_score);
    }
    WorkflowOutcome { flow_id,
                      state,
                      run_parameters,
                      evaluation }
}
