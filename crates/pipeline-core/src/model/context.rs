use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Artifact;

/// Contexto de ejecución entregado a `StepDefinition::run`.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub step_id: String,
    pub input: Option<Artifact>, // output del step previo (None en el primero)
    pub params: Value,           // base_params + inyectores
}

impl ExecutionContext {
    /// Deserializa los params efectivos a un tipo concreto.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.params.clone())
    }
}
