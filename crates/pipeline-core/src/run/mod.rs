//! Identidad de una ejecución del workflow (`RunContext`) y el esquema de
//! claves de artifacts derivado de ella.

mod context;
mod environment;
mod key;

pub use context::{RunContext, RunContextGenerator, RunId, RunParameters, TaskInput, TaskPayload};
pub use environment::{Environment, UnknownEnvironment};
pub use key::{project_bucket, ArtifactKey, ModelKey};
