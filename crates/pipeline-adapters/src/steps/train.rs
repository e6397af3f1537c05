//! TrainStep: ajusta el modelo sobre el set de entrenamiento de la ejecución.
//!
//! Escribe la versión inmutable `{project}/models/{run_id}/{file}` y luego
//! actualiza el slot compartido `{project}/models/{file}`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use pipeline_core::run::ModelKey;
use pipeline_core::step::{StepKind, StepRunResultTyped, TypedStep};
use pipeline_core::CoreEngineError;
use pipeline_domain::{Dataset, FeatureMatrix, LinearRegression, ModelArtifact};
use pipeline_persistence::{get_json, ObjectStore};

use super::ensure_same_run;
use crate::artifacts::{DatasetManifest, ModelManifest};
use crate::errors::from_domain;
use crate::params::TaskParams;
use crate::MODEL_FILE;

#[derive(Debug, Clone)]
pub struct TrainStep {
    store: Arc<dyn ObjectStore>,
}

impl TrainStep {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    async fn train(&self, input: Option<DatasetManifest>, p: TaskParams) -> Result<ModelManifest, CoreEngineError> {
        let ctx = p.run_context()?;
        let manifest = input.ok_or_else(|| CoreEngineError::MissingInputs("dataset manifest".into()))?;
        ensure_same_run(&ctx, &manifest.run_parameters)?;

        let store = self.store.as_ref();
        let features: FeatureMatrix = get_json(store, &manifest.bucket, &manifest.keys.train_features).await?;
        let labels: Vec<f64> = get_json(store, &manifest.bucket, &manifest.keys.train_labels).await?;
        let train = Dataset::new(features, labels).map_err(from_domain)?;

        let model = LinearRegression::fit(&train).map_err(from_domain)?;
        let version = ctx.run_id().to_string();
        let bytes = ModelArtifact::from_model(&model, version.clone(), Utc::now()).to_bytes()
                                                                                   .map_err(from_domain)?;

        let keys = ModelKey::new(ctx.project(), MODEL_FILE);
        let model_key = keys.versioned(ctx.run_id());
        let latest_key = keys.latest();
        store.put_if_absent(&manifest.bucket, &model_key, bytes.clone()).await?;
        store.put(&manifest.bucket, &latest_key, bytes).await?;
        info!("run {}: model trained on {} rows (coefficients {:?}, intercept {:.6}) saved to {}/{}",
              ctx.run_id(),
              train.len(),
              model.coefficients(),
              model.intercept(),
              manifest.bucket,
              model_key);

        Ok(ModelManifest { run_parameters: manifest.run_parameters,
                           bucket: manifest.bucket,
                           keys: manifest.keys,
                           model_version: version,
                           model_key,
                           latest_key,
                           n_features: model.n_features(),
                           schema_version: 1 })
    }
}

#[async_trait]
impl TypedStep for TrainStep {
    type Params = TaskParams;
    type Input = DatasetManifest;
    type Output = ModelManifest;

    fn id(&self) -> &'static str {
        "train"
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    async fn run_typed(&self, input: Option<DatasetManifest>, p: TaskParams) -> StepRunResultTyped<ModelManifest> {
        self.train(input, p).await.into()
    }
}
