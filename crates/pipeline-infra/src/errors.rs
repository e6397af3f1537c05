//! Errores del pipeline de entrega.
//!
//! Se serializan dentro de `PipelineExecution` para reportar la acción que
//! detuvo la ejecución.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryError {
    #[error("action '{action}' of stage '{stage}' failed: {reason}")]
    StageActionFailure { stage: String, action: String, reason: String },
    #[error("action '{action}' of stage '{stage}' exceeded its timeout of {timeout_ms} ms")]
    TaskTimeout { stage: String, action: String, timeout_ms: u64 },
    #[error("pipeline resources are not provisioned in environment '{environment}'")]
    ProvisioningConditionUnmet { environment: String },
    #[error("account '{account_id}' is not mapped to any deployment environment")]
    UnknownDeployment { account_id: String },
    #[error("invalid pipeline definition: {0}")]
    InvalidDefinition(String),
}

impl DeliveryError {
    pub fn action_failure(stage: &str, action: &str, reason: impl Into<String>) -> Self {
        DeliveryError::StageActionFailure { stage: stage.to_string(),
                                            action: action.to_string(),
                                            reason: reason.into() }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DeliveryError::StageActionFailure { .. } => "StageActionFailure",
            DeliveryError::TaskTimeout { .. } => "TaskTimeout",
            DeliveryError::ProvisioningConditionUnmet { .. } => "ProvisioningConditionUnmet",
            DeliveryError::UnknownDeployment { .. } => "UnknownDeployment",
            DeliveryError::InvalidDefinition(_) => "InvalidDefinition",
        }
    }
}
