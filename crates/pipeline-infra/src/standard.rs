//! Pipeline estándar de cuatro stages: Source → Build → Test → Deploy.

use std::sync::Arc;
use std::time::Duration;

use pipeline_core::Environment;

use crate::action::ActionRegistry;
use crate::actions::{BuildAction, FactoryAction, SourceAction, SystemTestAction};
use crate::collaborators::{BuildRunner, ImageRegistry, SourceRepository, WorkflowInvoker};
use crate::errors::DeliveryError;
use crate::gate::require_pipeline_resources;
use crate::pipeline::DeliveryPipeline;
use crate::stage::{ActionDeclaration, PipelineDefinition, StageDeclaration, DEFAULT_ACTION_TIMEOUT};
use crate::trigger::{TriggerFilter, DEFAULT_BRANCH};

pub const SOURCE_STAGE: &str = "Source";
pub const BUILD_STAGE: &str = "Build";
pub const TEST_STAGE: &str = "Test";
pub const DEPLOY_STAGE: &str = "Deploy";

pub const PROJECT_COMMITS: &str = "Project-Commits";
pub const CDK_RELEASES: &str = "CDK-Releases";
pub const BUILD: &str = "Build";
pub const FACTORY: &str = "Factory";
pub const SYSTEM_TESTING: &str = "System-Testing";
pub const PROD_BUILD: &str = "Prod-Build";
pub const PROD_FACTORY: &str = "Prod-Factory";

/// Task runners empaquetados como imagen.
pub const TASK_RUNNERS: [&str; 3] = ["data-preparation", "model-training", "model-evaluation"];

#[derive(Debug, Clone, PartialEq)]
pub struct StandardPipelineConfig {
    pub project: String,
    pub environment: Environment,
    pub region: String,
    pub account_id: String,
    pub prod_account: String,
    pub repository: String,
    pub cdk_repository: String,
    pub branch: String,
    pub action_timeout: Duration,
}

impl StandardPipelineConfig {
    pub fn new(project: impl Into<String>,
               environment: Environment,
               account_id: impl Into<String>,
               prod_account: impl Into<String>)
               -> Self {
        let project = project.into();
        Self { repository: project.clone(),
               cdk_repository: format!("{project}-cdk"),
               project,
               environment,
               region: "us-east-1".to_string(),
               account_id: account_id.into(),
               prod_account: prod_account.into(),
               branch: DEFAULT_BRANCH.to_string(),
               action_timeout: DEFAULT_ACTION_TIMEOUT }
    }

    pub fn pipeline_name(&self) -> String {
        format!("pr-{}-{}-training-codepipeline", self.environment, self.project)
    }

    /// `suffix`: build, factory, prod-build o prod-factory.
    pub fn codebuild_project(&self, suffix: &str) -> String {
        format!("pr-{}-{}-codebuild-{suffix}", self.environment, self.project)
    }

    pub fn deploy_role_arn(&self) -> String {
        format!("arn:aws:iam::{}:role/Prod-Deploy-Role", self.prod_account)
    }

    pub fn workflow_name(&self) -> String {
        format!("arn:aws:states:{}:{}:stateMachine:pr-{}-{}-training-step-function",
                self.region, self.account_id, self.environment, self.project)
    }

    pub fn image_repositories(&self) -> Vec<String> {
        TASK_RUNNERS.iter()
                    .map(|r| format!("pr-{}-{}-{r}-lambda", self.environment, self.project))
                    .collect()
    }

    pub fn trigger(&self) -> TriggerFilter {
        TriggerFilter::new(self.repository.clone()).with_branch(self.branch.clone())
    }
}

pub fn standard_definition(cfg: &StandardPipelineConfig) -> PipelineDefinition {
    let t = cfg.action_timeout;
    let role = cfg.deploy_role_arn();
    PipelineDefinition::new(
        cfg.pipeline_name(),
        vec![
            StageDeclaration::new(SOURCE_STAGE,
                                  vec![ActionDeclaration::new(PROJECT_COMMITS, 1).output("SourceArtifact").with_timeout(t),
                                       ActionDeclaration::new(CDK_RELEASES, 1).output("CDKSourceArtifact").with_timeout(t)]),
            StageDeclaration::new(BUILD_STAGE,
                                  vec![ActionDeclaration::new(BUILD, 1).input("SourceArtifact")
                                                                       .output("BuildArtifact")
                                                                       .with_timeout(t),
                                       ActionDeclaration::new(FACTORY, 2).input("CDKSourceArtifact")
                                                                         .output("CDKBuildArtifact")
                                                                         .with_timeout(t)]),
            StageDeclaration::new(TEST_STAGE,
                                  vec![ActionDeclaration::new(SYSTEM_TESTING, 1).input("CDKBuildArtifact")
                                                                                .output("SystemTestArtifact")
                                                                                .with_timeout(t)]),
            StageDeclaration::new(DEPLOY_STAGE,
                                  vec![ActionDeclaration::new(PROD_BUILD, 1).input("SourceArtifact")
                                                                            .output("ProdBuildArtifact")
                                                                            .with_timeout(t)
                                                                            .with_role(role.clone()),
                                       ActionDeclaration::new(PROD_FACTORY, 2).input("CDKSourceArtifact")
                                                                              .output("ProdCDKBuildArtifact")
                                                                              .with_timeout(t)
                                                                              .with_role(role)]),
        ],
    )
}

/// Implementaciones de los colaboradores externos.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub sources: Arc<dyn SourceRepository>,
    pub builds: Arc<dyn BuildRunner>,
    pub images: Arc<dyn ImageRegistry>,
    pub workflow: Arc<dyn WorkflowInvoker>,
}

pub fn standard_registry(cfg: &StandardPipelineConfig, c: &Collaborators) -> ActionRegistry {
    let build = |suffix: &str| BuildAction::new(c.builds.clone(), cfg.codebuild_project(suffix));
    ActionRegistry::new().with(PROJECT_COMMITS,
                               Arc::new(SourceAction::new(c.sources.clone(), cfg.repository.clone(), cfg.branch.clone())))
                         .with(CDK_RELEASES,
                               Arc::new(SourceAction::new(c.sources.clone(), cfg.cdk_repository.clone(), cfg.branch.clone())))
                         .with(BUILD, Arc::new(build("build")))
                         .with(FACTORY,
                               Arc::new(FactoryAction::new(build("factory"), c.images.clone(), cfg.image_repositories())))
                         .with(SYSTEM_TESTING, Arc::new(SystemTestAction::new(c.workflow.clone(), cfg.workflow_name())))
                         .with(PROD_BUILD, Arc::new(build("prod-build")))
                         .with(PROD_FACTORY,
                               Arc::new(FactoryAction::new(build("prod-factory"), c.images.clone(), cfg.image_repositories())))
}

/// Materializa el pipeline estándar. Falla si el gate no provisiona
/// recursos de pipeline en el entorno de la configuración.
pub fn build_standard_pipeline(cfg: &StandardPipelineConfig, c: &Collaborators) -> Result<DeliveryPipeline, DeliveryError> {
    require_pipeline_resources(cfg.environment)?;
    DeliveryPipeline::new(standard_definition(cfg), standard_registry(cfg, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> StandardPipelineConfig {
        StandardPipelineConfig::new("regression", Environment::Test, "111111111111", "222222222222")
    }

    #[test]
    fn standard_definition_is_valid_and_ordered() {
        let def = standard_definition(&cfg());
        def.validate().unwrap();
        let stages: Vec<&str> = def.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(stages, vec!["Source", "Build", "Test", "Deploy"]);
        let build = &def.stages[1];
        assert_eq!(build.actions.iter().map(|a| (a.name.as_str(), a.run_order)).collect::<Vec<_>>(),
                   vec![("Build", 1), ("Factory", 2)]);
        for a in &def.stages[3].actions {
            assert_eq!(a.role_arn.as_deref(), Some("arn:aws:iam::222222222222:role/Prod-Deploy-Role"));
        }
        assert_eq!(def.stages[0].actions[0].timeout, Duration::from_secs(7200));
    }

    #[test]
    fn resource_names_follow_the_naming_scheme() {
        let c = cfg();
        assert_eq!(c.codebuild_project("prod-factory"), "pr-test-regression-codebuild-prod-factory");
        assert_eq!(c.pipeline_name(), "pr-test-regression-training-codepipeline");
        assert_eq!(c.image_repositories()[1], "pr-test-regression-model-training-lambda");
        assert!(c.workflow_name().ends_with(":111111111111:stateMachine:pr-test-regression-training-step-function"));
    }
}
