//! `RunContext`, su generador y la forma "wire" (JSON) con la que viaja entre
//! tareas.
//!
//! Contrato JSON:
//! - Init emite `{"RunId", "RunDate", "Environment", "Project"}`.
//! - Cada tarea posterior recibe `{"Input": {"RunParameters": <salida de Init>}}`.
//!
//! `RunParameters` puede llegar como objeto o como string JSON (el Init
//! histórico devolvía el objeto ya serializado); ambos se aceptan.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::Environment;
use crate::constants::RUN_ID_LEN;
use crate::errors::CoreEngineError;

/// Token opaco de 8 caracteres que identifica una ejecución.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Genera un token nuevo a partir de un UUID v4 (primeros 8 hex).
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        RunId(simple[..RUN_ID_LEN].to_string())
    }

    /// Construye un `RunId` desde un valor externo (por ejemplo un payload).
    pub fn parse(raw: &str) -> Result<Self, CoreEngineError> {
        let ok = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !ok {
            return Err(CoreEngineError::MissingInputs(format!("invalid run id '{raw}'")));
        }
        Ok(RunId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identidad inmutable de una ejecución del workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    run_id: RunId,
    run_date: NaiveDate,
    environment: Environment,
    project: String,
}

impl RunContext {
    pub fn new(run_id: RunId, run_date: NaiveDate, environment: Environment, project: impl Into<String>) -> Self {
        Self { run_id,
               run_date,
               environment,
               project: project.into() }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }
    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }
    pub fn environment(&self) -> Environment {
        self.environment
    }
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Forma wire del contexto.
    pub fn to_parameters(&self) -> RunParameters {
        RunParameters { run_id: self.run_id.to_string(),
                        run_date: self.run_date.format("%Y-%m-%d").to_string(),
                        environment: self.environment,
                        project: self.project.clone() }
    }

    /// Payload que recibe cada tarea posterior a Init.
    pub fn to_payload(&self) -> TaskPayload {
        TaskPayload { input: TaskInput { run_parameters: self.to_parameters() } }
    }
}

/// Generador de contextos. `environment` y `project` vienen de la
/// configuración del despliegue; sólo `run_id` y `run_date` se generan.
#[derive(Debug, Clone)]
pub struct RunContextGenerator {
    environment: Environment,
    project: String,
}

impl RunContextGenerator {
    pub fn new(environment: Environment, project: impl Into<String>) -> Self {
        Self { environment,
               project: project.into() }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Crea un contexto nuevo. Siempre tiene éxito.
    pub fn create(&self) -> RunContext {
        RunContext::new(RunId::generate(), Local::now().date_naive(), self.environment, self.project.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    #[serde(rename = "RunId")]
    pub run_id: String,
    #[serde(rename = "RunDate")]
    pub run_date: String,
    #[serde(rename = "Environment")]
    pub environment: Environment,
    #[serde(rename = "Project")]
    pub project: String,
}

impl RunParameters {
    /// Valida y convierte la forma wire en un `RunContext`.
    pub fn to_context(&self) -> Result<RunContext, CoreEngineError> {
        let run_id = RunId::parse(&self.run_id)?;
        let run_date = NaiveDate::parse_from_str(&self.run_date, "%Y-%m-%d")
            .map_err(|e| CoreEngineError::MissingInputs(format!("invalid RunDate '{}': {e}", self.run_date)))?;
        if self.project.is_empty() {
            return Err(CoreEngineError::MissingInputs("empty Project".into()));
        }
        Ok(RunContext::new(run_id, run_date, self.environment, self.project.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    #[serde(rename = "RunParameters", deserialize_with = "object_or_json_string")]
    pub run_parameters: RunParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    #[serde(rename = "Input")]
    pub input: TaskInput,
}

impl TaskPayload {
    /// Decodifica el payload desde los params de un step.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CoreEngineError> {
        serde_json::from_value(value.clone())
            .map_err(|e| CoreEngineError::MissingInputs(format!("task payload: {e}")))
    }

    pub fn run_context(&self) -> Result<RunContext, CoreEngineError> {
        self.input.run_parameters.to_context()
    }
}

fn object_or_json_string<'de, D>(deserializer: D) -> Result<RunParameters, D::Error>
    where D: Deserializer<'de>
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let value = match raw {
        serde_json::Value::String(s) => serde_json::from_str(&s).map_err(serde::de::Error::custom)?,
        other => other,
    };
    serde_json::from_value(value).map_err(serde::de::Error::custom)
}
