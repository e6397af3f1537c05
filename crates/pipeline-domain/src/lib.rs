// pipeline-domain library entry point
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod model_artifact;
pub mod regression;

pub use dataset::{Dataset, FeatureMatrix};
pub use error::DomainError;
pub use evaluation::{BaselineSource, ChampionScore, EvaluationResult};
pub use metrics::rmse;
pub use model_artifact::ModelArtifact;
pub use regression::LinearRegression;
