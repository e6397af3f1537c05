//! Tests de integración del workflow init → prepare → train → evaluate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pipeline_adapters::params::{EvaluateParams, TaskParams};
use pipeline_adapters::{build_training_engine, run_training_workflow, DatasetKeys, EvaluateStep, ModelManifest, PrepareStep,
                        RawData, RunParametersArtifact, StaticDataSource, WorkflowSettings, MODEL_FILE};
use pipeline_core::constants::PROMOTION_DECISION_SIGNAL;
use pipeline_core::run::{project_bucket, Environment, RunContextGenerator};
use pipeline_core::step::{StepRunResultTyped, TypedStep};
use pipeline_core::{CoreEngineError, FlowEventKind, FlowTerminalState};
use pipeline_domain::{BaselineSource, ChampionScore};
use pipeline_persistence::{InMemoryObjectStore, ObjectStore, PersistenceError};

const PROJECT: &str = "regression";

fn settings() -> WorkflowSettings {
    WorkflowSettings::new(Environment::Test, PROJECT)
}

fn bucket() -> String {
    project_bucket(Environment::Test, PROJECT)
}

#[tokio::test]
async fn canonical_scenario_runs_to_done() {
    let store = Arc::new(InMemoryObjectStore::new());
    let mut engine = build_training_engine(store.clone(), Arc::new(StaticDataSource::canonical()), &settings());
    let outcome = run_training_workflow(&mut engine).await;

    assert!(outcome.is_done(), "unexpected state {:?}", outcome.state);
    let rp = outcome.run_parameters.clone().unwrap();
    let report = outcome.evaluation.clone().unwrap();
    assert_eq!(report.model_version, rp.run_id);
    assert!(report.result.challenger_score.is_finite() && report.result.challenger_score >= 0.0);
    assert_eq!(report.result.baseline_source, BaselineSource::TrainingSet);
    assert_eq!(report.result.promote,
               report.result.challenger_score < report.result.baseline_score);
    assert_eq!(report.inference_predictions, Some(1));

    let prefix = format!("{PROJECT}/data-preparation/{}/{}/", rp.run_date, rp.run_id);
    let data = store.list(&bucket(), &prefix).await.unwrap();
    assert_eq!(data.len(), 5);
    let models = store.list(&bucket(), &format!("{PROJECT}/models/")).await.unwrap();
    assert_eq!(models.len(), 2);
    assert!(models.contains(&format!("{PROJECT}/models/{MODEL_FILE}")));
    assert!(models.contains(&format!("{PROJECT}/models/{}/{MODEL_FILE}", rp.run_id)));

    let signals = engine.signals_for(outcome.flow_id);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].0, "evaluate");
    assert_eq!(signals[0].1.signal, PROMOTION_DECISION_SIGNAL);
    assert_eq!(signals[0].1.data["promote"], serde_json::json!(report.result.promote));
}

#[tokio::test]
async fn shape_mismatch_stops_before_train() {
    let store = Arc::new(InMemoryObjectStore::new());
    let bad = RawData { train_features: vec![vec![1.0], vec![2.0], vec![3.0]],
                        train_labels: vec![1.0, 2.0],
                        test_features: vec![vec![1.0]],
                        test_labels: vec![1.0],
                        inference: None };
    let mut engine = build_training_engine(store.clone(), Arc::new(StaticDataSource::new(bad)), &settings());
    let outcome = run_training_workflow(&mut engine).await;

    match &outcome.state {
        FlowTerminalState::Failed { step_id, error } => {
            assert_eq!(step_id, "prepare");
            assert!(matches!(error, CoreEngineError::ShapeMismatch(_)));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    let started: Vec<String> = engine.list_events_for(outcome.flow_id)
                                     .into_iter()
                                     .filter_map(|e| match e.kind {
                                         FlowEventKind::StepStarted { step_id, .. } => Some(step_id),
                                         _ => None,
                                     })
                                     .collect();
    assert_eq!(started, vec!["init", "prepare"]);
    assert!(store.is_empty());
    assert!(outcome.evaluation.is_none());
}

#[tokio::test]
async fn prior_champion_is_the_baseline_when_present() {
    let store = Arc::new(InMemoryObjectStore::new());
    let champion = ChampionScore { score: 0.0,
                                   model_version: "00000000".into(),
                                   recorded_at: chrono::Utc::now() };
    store.put(&bucket(), &format!("{PROJECT}/champion/score.json"), champion.to_bytes().unwrap())
         .await
         .unwrap();

    let mut engine = build_training_engine(store.clone(), Arc::new(StaticDataSource::canonical()), &settings());
    let report = run_training_workflow(&mut engine).await.evaluation.unwrap();
    assert_eq!(report.result.baseline_source, BaselineSource::PriorChampion);
    assert_eq!(report.result.baseline_score, 0.0);
    assert!(!report.result.promote);
}

fn shifted(offset: f64) -> RawData {
    let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
    RawData { train_features: xs.iter().map(|x| vec![*x]).collect(),
              train_labels: xs.iter().map(|x| 2.0 * x + offset).collect(),
              test_features: xs.iter().map(|x| vec![*x + 0.5]).collect(),
              test_labels: xs.iter().map(|x| 2.0 * (x + 0.5) + offset).collect(),
              inference: None }
}

#[tokio::test]
async fn concurrent_runs_evaluate_their_own_model() {
    let store = Arc::new(InMemoryObjectStore::new());
    let mut a = build_training_engine(store.clone(), Arc::new(StaticDataSource::new(shifted(0.0))), &settings());
    let mut b = build_training_engine(store.clone(), Arc::new(StaticDataSource::new(shifted(100.0))), &settings());

    let (oa, ob) = tokio::join!(run_training_workflow(&mut a), run_training_workflow(&mut b));
    for outcome in [&oa, &ob] {
        assert!(outcome.is_done());
        let report = outcome.evaluation.as_ref().unwrap();
        assert_eq!(&report.model_version, &outcome.run_parameters.as_ref().unwrap().run_id);
        // cada modelo ajusta exactamente sus propios datos
        assert!(report.result.challenger_score < 1e-6, "score {}", report.result.challenger_score);
    }
    assert_ne!(oa.run_parameters.unwrap().run_id, ob.run_parameters.unwrap().run_id);
}

/// Store que tarda en escribir.
#[derive(Debug, Default)]
struct SlowStore {
    inner: InMemoryObjectStore,
}

#[async_trait]
impl ObjectStore for SlowStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError> {
        self.inner.put(bucket, key, bytes).await
    }
    async fn put_if_absent(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        self.inner.put_if_absent(bucket, key, bytes).await
    }
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PersistenceError> {
        self.inner.get(bucket, key).await
    }
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, PersistenceError> {
        self.inner.exists(bucket, key).await
    }
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        self.inner.list(bucket, prefix).await
    }
}

#[tokio::test]
async fn slow_task_becomes_a_timeout_failure() {
    let mut s = settings();
    s.task_timeout = Duration::from_millis(50);
    let mut engine = build_training_engine(Arc::new(SlowStore::default()), Arc::new(StaticDataSource::canonical()), &s);
    let outcome = run_training_workflow(&mut engine).await;
    assert_eq!(outcome.state,
               FlowTerminalState::Failed { step_id: "prepare".into(),
                                           error: CoreEngineError::TaskTimeout { step_id: "prepare".into(),
                                                                                 timeout_ms: 50 } });
}

/// Store que reporta todo como existente aunque `get` no lo encuentre.
#[derive(Debug, Default)]
struct StaleIndexStore {
    inner: InMemoryObjectStore,
}

#[async_trait]
impl ObjectStore for StaleIndexStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError> {
        self.inner.put(bucket, key, bytes).await
    }
    async fn put_if_absent(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError> {
        self.inner.put_if_absent(bucket, key, bytes).await
    }
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PersistenceError> {
        self.inner.get(bucket, key).await
    }
    async fn exists(&self, _bucket: &str, _key: &str) -> Result<bool, PersistenceError> {
        Ok(true)
    }
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        self.inner.list(bucket, prefix).await
    }
}

#[tokio::test]
async fn champion_lookup_trusts_the_read_over_exists() {
    let mut engine = build_training_engine(Arc::new(StaleIndexStore::default()),
                                           Arc::new(StaticDataSource::canonical()),
                                           &settings());
    let outcome = run_training_workflow(&mut engine).await;
    assert!(outcome.state.is_done(), "{:?}", outcome.state);
    assert_eq!(outcome.evaluation.unwrap().result.baseline_source, BaselineSource::TrainingSet);
}

fn params_for(rp: &pipeline_core::run::RunParameters) -> serde_json::Value {
    serde_json::json!({ "Input": { "RunParameters": rp } })
}

#[tokio::test]
async fn evaluate_without_a_trained_model_is_model_not_found() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
    let rp = RunContextGenerator::new(Environment::Test, PROJECT).create().to_parameters();
    let keys = DatasetKeys { train_features: "x/a".into(),
                             train_labels: "x/b".into(),
                             test_features: "x/c".into(),
                             test_labels: "x/d".into(),
                             inference: None };
    let manifest = ModelManifest { run_parameters: rp.clone(),
                                   bucket: bucket(),
                                   keys,
                                   model_version: rp.run_id.clone(),
                                   model_key: format!("{PROJECT}/models/{}/{MODEL_FILE}", rp.run_id),
                                   latest_key: format!("{PROJECT}/models/{MODEL_FILE}"),
                                   n_features: 1,
                                   schema_version: 1 };
    let params: EvaluateParams = serde_json::from_value(params_for(&rp)).unwrap();

    match EvaluateStep::new(store).run_typed(Some(manifest), params).await {
        StepRunResultTyped::Failure { error } => assert!(matches!(error, CoreEngineError::ModelNotFound(_))),
        _ => panic!("evaluate must fail without a model"),
    }
}

#[tokio::test]
async fn prepare_keys_are_write_once() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
    let step = PrepareStep::new(store.clone(), Arc::new(StaticDataSource::canonical()));
    let rp = RunContextGenerator::new(Environment::Test, PROJECT).create().to_parameters();
    let input = RunParametersArtifact { run_parameters: rp.clone(),
                                        schema_version: 1 };
    let params: TaskParams = serde_json::from_value(params_for(&rp)).unwrap();

    assert!(matches!(step.run_typed(Some(input.clone()), params.clone()).await,
                     StepRunResultTyped::Success { .. }));
    match step.run_typed(Some(input), params).await {
        StepRunResultTyped::Failure { error } => assert_eq!(error.code(), "Storage"),
        _ => panic!("second write must fail"),
    }
}
