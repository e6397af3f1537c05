use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::run_result::StepRunResult;
use crate::model::ExecutionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Source,
    Transform,
    Sink,
    Check,
}

/// Trait que define un Step. Implementaciones sólo usan inputs + params y
/// los colaboradores que tengan inyectados (stores).
#[async_trait]
pub trait StepDefinition: Send + Sync + std::fmt::Debug {
    /// Identificador estable y único dentro del Flow.
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn name(&self) -> &str {
        self.id()
    }

    /// Parámetros base deterministas (defaults).
    fn base_params(&self) -> Value;

    /// Ejecución del step.
    async fn run(&self, ctx: &ExecutionContext) -> StepRunResult;

    /// Tipo general del step.
    fn kind(&self) -> StepKind;

    /// Límite de ejecución propio. `None` usa el default del engine.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Hash estable de la definición (id + kind + params base).
    fn definition_hash(&self) -> String {
        crate::hashing::hash_value(&serde_json::json!({
            "id": self.id(),
            "kind": format!("{:?}", self.kind()),
            "base_params": self.base_params(),
        }))
    }
}
