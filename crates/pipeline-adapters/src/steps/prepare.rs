//! PrepareStep: valida los datos de la fuente y los escribe (write-once)
//! bajo el prefijo de la ejecución.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use pipeline_core::run::{project_bucket, ArtifactKey, RunContext};
use pipeline_core::step::{StepKind, StepRunResultTyped, TypedStep};
use pipeline_core::CoreEngineError;
use pipeline_domain::{Dataset, FeatureMatrix};
use pipeline_persistence::{put_json_if_absent, ObjectStore};
use serde::Serialize;

use super::ensure_same_run;
use crate::artifacts::{DatasetKeys, DatasetManifest, RunParametersArtifact};
use crate::errors::from_domain;
use crate::params::TaskParams;
use crate::source::DataSource;
use crate::{DATA_PREPARATION_STAGE, INFERENCE_DATA, TEST_FEATURES, TEST_LABELS, TRAIN_FEATURES, TRAIN_LABELS};

#[derive(Debug, Clone)]
pub struct PrepareStep {
    store: Arc<dyn ObjectStore>,
    source: Arc<dyn DataSource>,
}

impl PrepareStep {
    pub fn new(store: Arc<dyn ObjectStore>, source: Arc<dyn DataSource>) -> Self {
        Self { store, source }
    }

    async fn write<T: Serialize + Sync>(&self,
                                        bucket: &str,
                                        ctx: &RunContext,
                                        name: &str,
                                        value: &T)
                                        -> Result<String, CoreEngineError> {
        let key = ArtifactKey::for_run(ctx, DATA_PREPARATION_STAGE, name)?.to_string();
        put_json_if_absent(self.store.as_ref(), bucket, &key, value).await?;
        debug!("wrote {bucket}/{key}");
        Ok(key)
    }

    async fn prepare(&self, input: Option<RunParametersArtifact>, p: TaskParams) -> Result<DatasetManifest, CoreEngineError> {
        let ctx = p.run_context()?;
        if let Some(carried) = &input {
            ensure_same_run(&ctx, &carried.run_parameters)?;
        }

        let raw = self.source.fetch().map_err(from_domain)?;
        let train = Dataset::from_rows(raw.train_features, raw.train_labels).map_err(from_domain)?;
        let test = Dataset::from_rows(raw.test_features, raw.test_labels).map_err(from_domain)?;
        let inference = raw.inference.map(FeatureMatrix::new).transpose().map_err(from_domain)?;
        if !test.is_empty() && !train.is_empty() && test.features().n_features() != train.features().n_features() {
            return Err(CoreEngineError::ShapeMismatch(format!("train has {} features, test has {}",
                                                              train.features().n_features(),
                                                              test.features().n_features())));
        }

        let bucket = project_bucket(ctx.environment(), ctx.project());
        let keys = DatasetKeys { train_features: self.write(&bucket, &ctx, TRAIN_FEATURES, train.features()).await?,
                                 train_labels: self.write(&bucket, &ctx, TRAIN_LABELS, &train.labels()).await?,
                                 test_features: self.write(&bucket, &ctx, TEST_FEATURES, test.features()).await?,
                                 test_labels: self.write(&bucket, &ctx, TEST_LABELS, &test.labels()).await?,
                                 inference: match &inference {
                                     Some(m) => Some(self.write(&bucket, &ctx, INFERENCE_DATA, m).await?),
                                     None => None,
                                 } };
        let prefix = ArtifactKey::for_run(&ctx, DATA_PREPARATION_STAGE, TRAIN_FEATURES)?.prefix();
        info!("run {}: prepared {} train / {} test rows under {bucket}/{prefix}",
              ctx.run_id(),
              train.len(),
              test.len());

        Ok(DatasetManifest { run_parameters: ctx.to_parameters(),
                             bucket,
                             prefix,
                             keys,
                             train_rows: train.len(),
                             test_rows: test.len(),
                             schema_version: 1 })
    }
}

#[async_trait]
impl TypedStep for PrepareStep {
    type Params = TaskParams;
    type Input = RunParametersArtifact;
    type Output = DatasetManifest;

    fn id(&self) -> &'static str {
        "prepare"
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    async fn run_typed(&self, input: Option<RunParametersArtifact>, p: TaskParams) -> StepRunResultTyped<DatasetManifest> {
        self.prepare(input, p).await.into()
    }
}
