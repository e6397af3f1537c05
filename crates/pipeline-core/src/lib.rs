//! pipeline-core: motor lineal de workflow (fail-stop, event-sourced) e
//! identidad de ejecución (`RunContext`, claves de artifacts).
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod injection;
pub mod model;
pub mod repo;
pub mod run;
pub mod step;

pub use engine::{FlowCtx, FlowEngine};
pub use errors::CoreEngineError;
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use injection::{apply_injectors, ParamInjector};
pub use model::{Artifact, ArtifactKind, ArtifactSpec, ExecutionContext};
pub use repo::{build_flow_definition, FlowDefinition, FlowRepository, FlowTerminalState, InMemoryFlowRepository};
pub use run::{ArtifactKey, Environment, ModelKey, RunContext, RunContextGenerator, RunId, RunParameters, TaskPayload};
pub use step::{SameAs, StepDefinition, StepKind, StepRunResult, StepRunResultTyped, StepSignal, StepStatus, TypedStep};
