//! pipeline-infra: gate de entorno, identidad de despliegue y el pipeline de
//! entrega (Source → Build → Test → Deploy) que corre el workflow de
//! entrenamiento como stage de test.

pub mod action;
pub mod actions;
pub mod collaborators;
pub mod deployment;
pub mod errors;
pub mod gate;
pub mod pipeline;
pub mod stage;
pub mod standard;
pub mod trigger;

pub use action::{ActionInvocation, ActionRegistry, StageAction};
pub use collaborators::{BuildRequest, BuildRunner, ImageRef, ImageRegistry, InMemoryImageRegistry, InMemorySourceRepository,
                        RecordingBuildRunner, SourceRepository, WorkflowInvoker, WorkflowReport};
pub use deployment::AccountMap;
pub use errors::DeliveryError;
pub use gate::{require_pipeline_resources, should_provision_pipeline_resources, should_provision_pipeline_resources_named};
pub use pipeline::{ActionOutcome, ActionRecord, DeliveryPipeline, ExecutionStatus, PipelineExecution};
pub use stage::{ActionDeclaration, PipelineArtifact, PipelineDefinition, StageDeclaration};
pub use standard::{build_standard_pipeline, standard_definition, Collaborators, StandardPipelineConfig};
pub use trigger::{CommitEvent, TriggerFilter};
