//! EvaluateStep: compara el modelo entrenado en esta ejecución contra el
//! baseline y emite la decisión de promoción.
//!
//! Baseline: el score persistido del champion si existe; si no, el RMSE del
//! challenger sobre su propio set de entrenamiento.

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use pipeline_core::constants::PROMOTION_DECISION_SIGNAL;
use pipeline_core::run::ModelKey;
use pipeline_core::step::{StepKind, StepRunResultTyped, StepSignal, TypedStep};
use pipeline_core::CoreEngineError;
use pipeline_domain::{rmse, BaselineSource, ChampionScore, FeatureMatrix, LinearRegression, ModelArtifact};
use pipeline_persistence::{get_json, ObjectStore};
use pipeline_policies::{LowerIsBetterParams, LowerIsBetterPolicy, PromotionParams, PromotionPolicy, ScoreComparison};

use super::ensure_same_run;
use crate::artifacts::{EvaluationReport, ModelManifest};
use crate::errors::{from_domain, model_read_error};
use crate::params::EvaluateParams;
use crate::MODEL_FILE;

#[derive(Debug, Clone)]
pub struct EvaluateStep {
    store: Arc<dyn ObjectStore>,
    min_improvement: f64,
}

impl EvaluateStep {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store,
               min_improvement: 0.0 }
    }

    pub fn with_min_improvement(mut self, min_improvement: f64) -> Self {
        self.min_improvement = min_improvement;
        self
    }

    async fn load_model(&self, bucket: &str, key: &str) -> Result<LinearRegression, CoreEngineError> {
        let bytes = self.store.get(bucket, key).await.map_err(model_read_error)?;
        Ok(ModelArtifact::from_bytes(&bytes).map_err(from_domain)?.to_model())
    }

    async fn score(&self,
                   model: &LinearRegression,
                   bucket: &str,
                   features_key: &str,
                   labels_key: &str)
                   -> Result<f64, CoreEngineError> {
        let store = self.store.as_ref();
        let features: FeatureMatrix = get_json(store, bucket, features_key).await?;
        let labels: Vec<f64> = get_json(store, bucket, labels_key).await?;
        let predicted = model.predict(&features).map_err(from_domain)?;
        rmse(&labels, &predicted).map_err(from_domain)
    }

    async fn evaluate(&self, input: Option<ModelManifest>, p: EvaluateParams) -> Result<EvaluationReport, CoreEngineError> {
        let ctx = p.run_context()?;
        let manifest = input.ok_or_else(|| CoreEngineError::MissingInputs("model manifest".into()))?;
        ensure_same_run(&ctx, &manifest.run_parameters)?;
        let bucket = manifest.bucket.as_str();

        // Siempre la versión de esta ejecución, nunca el slot compartido.
        let model_key = ModelKey::new(ctx.project(), MODEL_FILE).versioned(ctx.run_id());
        let model = self.load_model(bucket, &model_key).await?;

        let challenger_score = self.score(&model, bucket, &manifest.keys.test_features, &manifest.keys.test_labels)
                                   .await?;

        let champion_key = ModelKey::new(ctx.project(), MODEL_FILE).champion_score();
        // Lectura directa: un NotFound significa que no hay champion.
        let champion = match self.store.get(bucket, &champion_key).await {
            Ok(bytes) => Some(ChampionScore::from_bytes(&bytes).map_err(from_domain)?),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };
        let (baseline_score, baseline_source) = if let Some(champion) = champion {
            info!("run {}: baseline is champion {} with score {:.6}",
                  ctx.run_id(),
                  champion.model_version,
                  champion.score);
            (champion.score, BaselineSource::PriorChampion)
        } else {
            warn!("run {}: no champion score at {bucket}/{champion_key}, using training-set RMSE as baseline",
                  ctx.run_id());
            let on_train = self.score(&model, bucket, &manifest.keys.train_features, &manifest.keys.train_labels)
                               .await?;
            (on_train, BaselineSource::TrainingSet)
        };

        let inference_predictions = match &manifest.keys.inference {
            Some(key) => {
                let rows: FeatureMatrix = get_json(self.store.as_ref(), bucket, key).await?;
                let predictions = model.predict(&rows).map_err(from_domain)?;
                info!("run {}: scored {} inference rows", ctx.run_id(), predictions.len());
                Some(predictions.len())
            }
            None => None,
        };

        let params = PromotionParams::LowerIsBetter(LowerIsBetterParams { min_improvement: p.min_improvement });
        let decision = LowerIsBetterPolicy::new().decide(&ScoreComparison { challenger_score,
                                                                            baseline_score,
                                                                            baseline_source },
                                                         &params);
        if decision.promote {
            info!("run {}: new champion model found ({}); production deployment implementation pending",
                  ctx.run_id(),
                  decision.rationale.summary);
        } else {
            info!("run {}: no new champion model found in this training pipeline run ({})",
                  ctx.run_id(),
                  decision.rationale.summary);
        }

        Ok(EvaluationReport { run_parameters: manifest.run_parameters,
                              model_version: manifest.model_version,
                              result: decision.to_evaluation_result(),
                              decision,
                              inference_predictions,
                              schema_version: 1 })
    }
}

#[async_trait]
impl TypedStep for EvaluateStep {
    type Params = EvaluateParams;
    type Input = ModelManifest;
    type Output = EvaluationReport;

    fn id(&self) -> &'static str {
        "evaluate"
    }

    fn kind(&self) -> StepKind {
        StepKind::Check
    }

    fn params_default(&self) -> EvaluateParams {
        EvaluateParams { input: None,
                         min_improvement: self.min_improvement }
    }

    async fn run_typed(&self, input: Option<ModelManifest>, p: EvaluateParams) -> StepRunResultTyped<EvaluationReport> {
        match self.evaluate(input, p).await {
            Ok(report) => {
                let data = serde_json::to_value(&report.decision).unwrap_or(serde_json::Value::Null);
                StepRunResultTyped::SuccessWithSignals { outputs: vec![report],
                                                         signals: vec![StepSignal::new(PROMOTION_DECISION_SIGNAL, data)] }
            }
            Err(error) => StepRunResultTyped::Failure { error },
        }
    }
}
