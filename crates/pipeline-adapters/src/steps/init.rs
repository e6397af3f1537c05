//! InitStep (Source): genera el `RunContext` de la ejecución.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use pipeline_core::run::RunContextGenerator;
use pipeline_core::step::{StepKind, StepRunResultTyped, TypedStep};

use crate::artifacts::RunParametersArtifact;
use crate::params::TaskParams;

#[derive(Debug, Clone)]
pub struct InitStep {
    generator: RunContextGenerator,
    timeout: Option<Duration>,
}

impl InitStep {
    pub fn new(generator: RunContextGenerator) -> Self {
        Self { generator, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl TypedStep for InitStep {
    type Params = TaskParams;
    type Input = RunParametersArtifact; // ignorado (Source)
    type Output = RunParametersArtifact;

    fn id(&self) -> &'static str {
        "init"
    }

    fn kind(&self) -> StepKind {
        StepKind::Source
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn run_typed(&self, _input: Option<RunParametersArtifact>, _p: TaskParams) -> StepRunResultTyped<RunParametersArtifact> {
        let ctx = self.generator.create();
        info!("run {} created for project '{}' ({})", ctx.run_id(), ctx.project(), ctx.environment());
        StepRunResultTyped::Success { outputs: vec![RunParametersArtifact { run_parameters: ctx.to_parameters(),
                                                                            schema_version: 1 }] }
    }
}
