//! Tests de integración de la aplicación: workflow como stage de test y
//! pipeline de entrega completo con colaboradores locales.

use std::collections::HashMap;
use std::sync::Arc;

use pipeline_adapters::{StaticDataSource, WorkflowSettings};
use pipeline_core::{Environment, FlowTerminalState};
use pipeline_infra::{CommitEvent, DeliveryError, WorkflowInvoker};
use pipeline_persistence::InMemoryObjectStore;
use retraining_pipeline::{run_delivery_pipeline, run_workflow, AppConfig, AppError, TrainingWorkflowInvoker};

fn config(account: &str) -> AppConfig {
    config_with(account, &[])
}

fn config_with(account: &str, extra: &[(&'static str, &'static str)]) -> AppConfig {
    let mut vars: HashMap<&str, &str> = HashMap::from([("PIPELINE_PROJECT", "regression"),
                                                       ("PIPELINE_ACCOUNT_ID", account),
                                                       ("PIPELINE_TEST_ACCOUNT_ID", "111111111111"),
                                                       ("PIPELINE_PROD_ACCOUNT_ID", "222222222222"),
                                                       ("PIPELINE_STORE_BACKEND", "memory")]);
    vars.extend(extra.iter().copied());
    AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap()
}

fn commit(branch: &str) -> CommitEvent {
    CommitEvent { repository: "regression".into(),
                  branch: branch.into(),
                  commit: "abc123".into() }
}

#[test]
fn invoker_reports_a_done_workflow() {
    let invoker = TrainingWorkflowInvoker::new(Arc::new(InMemoryObjectStore::new()),
                                               Arc::new(StaticDataSource::canonical()),
                                               WorkflowSettings::new(Environment::Test, "regression"));
    let report = tokio_test::block_on(invoker.invoke("training", &[])).unwrap();
    assert!(report.state.is_done());
    assert!(report.summary["evaluation"]["challenger_score"].as_f64().unwrap() >= 0.0);
    assert_eq!(report.summary["run_parameters"]["Project"], "regression");
}

#[tokio::test]
async fn workflow_runs_against_the_configured_store() {
    let cfg = config("111111111111");
    let outcome = run_workflow(&cfg, cfg.environment().unwrap()).await;
    assert!(matches!(outcome.state, FlowTerminalState::Done { .. }));
    assert_eq!(outcome.run_parameters.unwrap().environment, Environment::Test);
}

#[tokio::test]
async fn commit_on_main_runs_all_four_stages() {
    let cfg = config("111111111111");
    let execution = run_delivery_pipeline(&cfg, Environment::Test, &commit("main")).await
                                                                                   .unwrap()
                                                                                   .unwrap();
    assert!(execution.succeeded(), "{:?}", execution.status);
    assert_eq!(execution.stages_started(), vec!["Source", "Build", "Test", "Deploy"]);
    assert!(execution.artifacts.contains_key("ProdCDKBuildArtifact"));
}

#[tokio::test]
async fn commit_on_other_branch_is_ignored() {
    let cfg = config("111111111111");
    assert!(run_delivery_pipeline(&cfg, Environment::Test, &commit("feature/x")).await
                                                                                .unwrap()
                                                                                .is_none());
}

#[tokio::test]
async fn prod_deployment_has_no_delivery_pipeline() {
    let cfg = config("222222222222");
    let env = cfg.environment().unwrap();
    assert_eq!(env, Environment::Prod);
    let err = run_delivery_pipeline(&cfg, env, &commit("main")).await.unwrap_err();
    assert!(matches!(err, AppError::Delivery(DeliveryError::ProvisioningConditionUnmet { .. })));
}

#[tokio::test]
async fn commit_without_branch_uses_the_configured_one() {
    let cfg = config_with("111111111111", &[("PIPELINE_BRANCH", "release")]);
    let event = cfg.commit_event("abc123", None, None);
    assert_eq!(event.branch, "release");
    let execution = run_delivery_pipeline(&cfg, Environment::Test, &event).await
                                                                        .unwrap()
                                                                        .unwrap();
    assert!(execution.succeeded(), "{:?}", execution.status);

    let on_main = cfg.commit_event("abc123", Some("main"), None);
    assert!(run_delivery_pipeline(&cfg, Environment::Test, &on_main).await
                                                                    .unwrap()
                                                                    .is_none());
}
