//! Gate de entorno: decide en tiempo de aprovisionamiento si los recursos
//! del pipeline de entrega existen en un entorno. Sólo `test` los tiene.
//!
//! El motor de workflow nunca consulta el gate.

use std::str::FromStr;

use pipeline_core::Environment;

use crate::errors::DeliveryError;

pub fn should_provision_pipeline_resources(environment: Environment) -> bool {
    matches!(environment, Environment::Test)
}

/// Forma textual; cualquier nombre desconocido es `false`.
pub fn should_provision_pipeline_resources_named(environment: &str) -> bool {
    Environment::from_str(environment).map(should_provision_pipeline_resources)
                                      .unwrap_or(false)
}

pub fn require_pipeline_resources(environment: Environment) -> Result<(), DeliveryError> {
    if should_provision_pipeline_resources(environment) {
        Ok(())
    } else {
        Err(DeliveryError::ProvisioningConditionUnmet { environment: environment.to_string() })
    }
}
