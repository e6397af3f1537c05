//! Identidad de despliegue: qué entorno corresponde a una cuenta.

use log::debug;
use pipeline_core::Environment;
use serde::{Deserialize, Serialize};

use crate::errors::DeliveryError;

/// Cuentas de test y producción. Una cuenta fuera del mapa es un error de
/// configuración, nunca un entorno por defecto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMap {
    pub test_account: String,
    pub prod_account: String,
}

impl AccountMap {
    pub fn new(test_account: impl Into<String>, prod_account: impl Into<String>) -> Self {
        Self { test_account: test_account.into(),
               prod_account: prod_account.into() }
    }

    pub fn resolve_environment(&self, account_id: &str) -> Result<Environment, DeliveryError> {
        let env = if account_id == self.test_account {
            Environment::Test
        } else if account_id == self.prod_account {
            Environment::Prod
        } else {
            return Err(DeliveryError::UnknownDeployment { account_id: account_id.to_string() });
        };
        debug!("account {account_id} resolves to environment {env}");
        Ok(env)
    }

    pub fn account_for(&self, environment: Environment) -> &str {
        match environment {
            Environment::Test => &self.test_account,
            Environment::Prod => &self.prod_account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_resolve_exhaustively() {
        let map = AccountMap::new("111111111111", "222222222222");
        assert_eq!(map.resolve_environment("111111111111").unwrap(), Environment::Test);
        assert_eq!(map.resolve_environment("222222222222").unwrap(), Environment::Prod);
        assert_eq!(map.account_for(Environment::Prod), "222222222222");
        let err = map.resolve_environment("333333333333").unwrap_err();
        assert_eq!(err.code(), "UnknownDeployment");
    }
}
