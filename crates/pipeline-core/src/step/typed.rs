use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::{StepKind, StepRunResult, StepSignal};
use crate::errors::CoreEngineError;
use crate::model::{ArtifactSpec, ExecutionContext};

/// Igualdad de tipos en compilación. `add_step` del builder la exige entre el
/// output del paso previo y el input del siguiente.
pub trait SameAs<T> {}
impl<T> SameAs<T> for T {}

/// Resultado tipado de ejecutar un `TypedStep`.
pub enum StepRunResultTyped<Out: ArtifactSpec> {
    Success { outputs: Vec<Out> },
    SuccessWithSignals { outputs: Vec<Out>, signals: Vec<StepSignal> },
    Failure { error: CoreEngineError },
}

impl<Out: ArtifactSpec> StepRunResultTyped<Out> {
    /// Convierte a `StepRunResult` neutro serializando los outputs. Un fallo
    /// de serialización se reporta como `Failure`.
    pub fn into_neutral(self) -> StepRunResult {
        let encode = |outputs: Vec<Out>| {
            outputs.into_iter()
                   .map(|o| o.into_artifact())
                   .collect::<Result<Vec<_>, _>>()
                   .map_err(|e| CoreEngineError::Internal(e.to_string()))
        };
        match self {
            StepRunResultTyped::Success { outputs } => match encode(outputs) {
                Ok(outputs) => StepRunResult::Success { outputs },
                Err(error) => StepRunResult::Failure { error },
            },
            StepRunResultTyped::SuccessWithSignals { outputs, signals } => match encode(outputs) {
                Ok(outputs) => StepRunResult::SuccessWithSignals { outputs, signals },
                Err(error) => StepRunResult::Failure { error },
            },
            StepRunResultTyped::Failure { error } => StepRunResult::Failure { error },
        }
    }
}

impl<Out: ArtifactSpec> From<Result<Out, CoreEngineError>> for StepRunResultTyped<Out> {
    fn from(r: Result<Out, CoreEngineError>) -> Self {
        match r {
            Ok(o) => StepRunResultTyped::Success { outputs: vec![o] },
            Err(error) => StepRunResultTyped::Failure { error },
        }
    }
}

/// Interfaz de alto nivel para definir Steps con tipos fuertes
/// (Params / Input / Output).
///
/// Implementadores escriben `run_typed` con tipos concretos; el adaptador de
/// abajo la expone como `StepDefinition` neutro.
#[async_trait]
pub trait TypedStep: Send + Sync + std::fmt::Debug {
    type Params: DeserializeOwned + Serialize + Clone + Default + Send + Sync;
    type Input: ArtifactSpec;
    type Output: ArtifactSpec;

    /// Identificador estable del step dentro del flow.
    fn id(&self) -> &'static str;

    fn name(&self) -> &str {
        self.id()
    }

    fn kind(&self) -> StepKind;

    fn params_default(&self) -> Self::Params {
        Default::default()
    }

    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Ejecución tipada. Para `Source`, `input` será `None`.
    async fn run_typed(&self, input: Option<Self::Input>, params: Self::Params) -> StepRunResultTyped<Self::Output>;
}

#[async_trait]
impl<T> crate::step::StepDefinition for T where T: TypedStep + 'static
{
    fn id(&self) -> &str {
        <Self as TypedStep>::id(self)
    }

    fn name(&self) -> &str {
        <Self as TypedStep>::name(self)
    }

    fn base_params(&self) -> serde_json::Value {
        serde_json::to_value(self.params_default()).unwrap_or(serde_json::Value::Null)
    }

    async fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        let params: T::Params = match ctx.params_as() {
            Ok(p) => p,
            Err(e) => {
                return StepRunResult::Failure { error: CoreEngineError::MissingInputs(format!("params: {e}")) };
            }
        };

        let typed_in = match ctx.input.as_ref().map(T::Input::from_artifact).transpose() {
            Ok(i) => i,
            Err(e) => {
                return StepRunResult::Failure { error: CoreEngineError::MissingInputs(format!("input: {e}")) };
            }
        };

        self.run_typed(typed_in, params).await.into_neutral()
    }

    fn kind(&self) -> StepKind {
        <Self as TypedStep>::kind(self)
    }

    fn timeout(&self) -> Option<Duration> {
        <Self as TypedStep>::timeout(self)
    }

    fn definition_hash(&self) -> String {
        crate::hashing::hash_value(&serde_json::json!({
            "id": <Self as TypedStep>::id(self),
            "kind": format!("{:?}", <Self as TypedStep>::kind(self)),
            "base_params": crate::step::StepDefinition::base_params(self),
            "type": std::any::type_name::<T>()
        }))
    }
}
