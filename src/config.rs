//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y arma un `AppConfig`
//! inmutable. Los flags de la CLI pisan los valores cargados.
use std::env;
use std::time::Duration;

use once_cell::sync::Lazy;
use pipeline_adapters::WorkflowSettings;
use pipeline_core::Environment;
use pipeline_infra::{AccountMap, CommitEvent, StandardPipelineConfig};
use pipeline_persistence::{StoreBackend, StoreConfig};

use crate::errors::AppError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv(); // ignora error si no existe .env
});

/// Configuración de despliegue del pipeline de reentrenamiento.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub project: String,
    pub region: String,
    /// Cuenta donde corre este despliegue.
    pub account_id: String,
    pub accounts: AccountMap,
    pub repository: String,
    pub cdk_repository: String,
    pub branch: String,
    pub task_timeout: Duration,
    pub init_timeout: Duration,
    pub action_timeout: Duration,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Arma la configuración desde cualquier fuente de variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let required = |name: &str| {
            lookup(name).filter(|v| !v.trim().is_empty())
                        .ok_or_else(|| AppError::Config(format!("{name} not set")))
        };
        let secs = |name: &str, default: u64| -> Result<Duration, AppError> {
            match lookup(name) {
                Some(v) => v.trim()
                            .parse::<u64>()
                            .map(Duration::from_secs)
                            .map_err(|e| AppError::Config(format!("{name}='{v}': {e}"))),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let project = required("PIPELINE_PROJECT")?;
        let store_defaults = StoreConfig::default();
        let backend = match lookup("PIPELINE_STORE_BACKEND") {
            Some(v) => v.parse::<StoreBackend>()?,
            None => store_defaults.backend,
        };
        Ok(Self { region: lookup("PIPELINE_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                  account_id: required("PIPELINE_ACCOUNT_ID")?,
                  accounts: AccountMap::new(required("PIPELINE_TEST_ACCOUNT_ID")?, required("PIPELINE_PROD_ACCOUNT_ID")?),
                  repository: lookup("PIPELINE_REPO").unwrap_or_else(|| project.clone()),
                  cdk_repository: lookup("PIPELINE_CDK_REPO").unwrap_or_else(|| format!("{project}-cdk")),
                  branch: lookup("PIPELINE_BRANCH").unwrap_or_else(|| "main".to_string()),
                  task_timeout: secs("PIPELINE_TASK_TIMEOUT_SECS", 180)?,
                  init_timeout: secs("PIPELINE_INIT_TIMEOUT_SECS", 30)?,
                  action_timeout: secs("PIPELINE_ACTION_TIMEOUT_SECS", 7200)?,
                  store: StoreConfig { backend,
                                       root: lookup("PIPELINE_ARTIFACT_ROOT").map(Into::into)
                                                                           .unwrap_or(store_defaults.root) },
                  project })
    }

    /// Entorno de este despliegue según la cuenta; una cuenta desconocida es
    /// un error de configuración.
    pub fn environment(&self) -> Result<Environment, AppError> {
        Ok(self.accounts.resolve_environment(&self.account_id)?)
    }

    pub fn workflow_settings(&self, environment: Environment) -> WorkflowSettings {
        let mut settings = WorkflowSettings::new(environment, self.project.clone());
        settings.task_timeout = self.task_timeout;
        settings.init_timeout = self.init_timeout;
        settings
    }

    pub fn pipeline_config(&self, environment: Environment) -> StandardPipelineConfig {
        let mut cfg = StandardPipelineConfig::new(self.project.clone(),
                                                  environment,
                                                  self.account_id.clone(),
                                                  self.accounts.prod_account.clone());
        cfg.region = self.region.clone();
        cfg.repository = self.repository.clone();
        cfg.cdk_repository = self.cdk_repository.clone();
        cfg.branch = self.branch.clone();
        cfg.action_timeout = self.action_timeout;
        cfg
    }

    /// Evento de commit; rama y repositorio omitidos toman los configurados.
    pub fn commit_event(&self, commit: &str, branch: Option<&str>, repository: Option<&str>) -> CommitEvent {
        CommitEvent { repository: repository.unwrap_or(&self.repository).to_string(),
                      branch: branch.unwrap_or(&self.branch).to_string(),
                      commit: commit.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut m: HashMap<String, String> = [("PIPELINE_PROJECT", "regression"),
                                              ("PIPELINE_ACCOUNT_ID", "111111111111"),
                                              ("PIPELINE_TEST_ACCOUNT_ID", "111111111111"),
                                              ("PIPELINE_PROD_ACCOUNT_ID", "222222222222")].iter()
                                                                                            .map(|(k, v)| (k.to_string(), v.to_string()))
                                                                                            .collect();
        for (k, v) in extra {
            m.insert(k.to_string(), v.to_string());
        }
        m
    }

    fn load(m: &HashMap<String, String>) -> Result<AppConfig, AppError> {
        AppConfig::from_lookup(|k| m.get(k).cloned())
    }

    #[test]
    fn defaults_apply_to_optional_variables() {
        let cfg = load(&vars(&[])).unwrap();
        assert_eq!(cfg.branch, "main");
        assert_eq!(cfg.cdk_repository, "regression-cdk");
        assert_eq!(cfg.task_timeout, Duration::from_secs(180));
        assert_eq!(cfg.init_timeout, Duration::from_secs(30));
        assert_eq!(cfg.action_timeout, Duration::from_secs(7200));
        assert_eq!(cfg.store, StoreConfig::default());
        assert_eq!(cfg.environment().unwrap(), Environment::Test);
        assert_eq!(cfg.pipeline_config(Environment::Test).deploy_role_arn(),
                   "arn:aws:iam::222222222222:role/Prod-Deploy-Role");
    }

    #[test]
    fn missing_or_malformed_values_are_config_errors() {
        let mut m = vars(&[]);
        m.remove("PIPELINE_PROJECT");
        assert!(matches!(load(&m), Err(AppError::Config(_))));
        assert!(matches!(load(&vars(&[("PIPELINE_TASK_TIMEOUT_SECS", "soon")])), Err(AppError::Config(_))));
    }

    #[test]
    fn unknown_account_is_rejected() {
        let cfg = load(&vars(&[("PIPELINE_ACCOUNT_ID", "999")])).unwrap();
        assert_eq!(cfg.environment().unwrap_err().to_string(),
                   "account '999' is not mapped to any deployment environment");
    }
}
