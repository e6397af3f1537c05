//! Declaraciones estáticas del pipeline de entrega: stages, acciones y los
//! artifacts que se mueven entre ellas.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::DeliveryError;

/// Timeout por defecto de una acción (120 minutos, como los proyectos de
/// build).
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(120 * 60);

/// Artifact que produce una acción y consumen las siguientes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub name: String,
    pub revision: String,
    pub payload: serde_json::Value,
}

impl PipelineArtifact {
    pub fn new(name: impl Into<String>, revision: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { name: name.into(),
               revision: revision.into(),
               payload }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDeclaration {
    pub name: String,
    /// Acciones con el mismo `run_order` pueden correr a la vez; uno menor
    /// termina antes de que empiece uno mayor.
    pub run_order: u32,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Rol asumido para ejecutar la acción en otra cuenta.
    pub role_arn: Option<String>,
}

impl ActionDeclaration {
    pub fn new(name: impl Into<String>, run_order: u32) -> Self {
        Self { name: name.into(),
               run_order,
               inputs: Vec::new(),
               outputs: Vec::new(),
               timeout: DEFAULT_ACTION_TIMEOUT,
               role_arn: None }
    }

    pub fn input(mut self, artifact: impl Into<String>) -> Self {
        self.inputs.push(artifact.into());
        self
    }

    pub fn output(mut self, artifact: impl Into<String>) -> Self {
        self.outputs.push(artifact.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_role(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDeclaration {
    pub name: String,
    pub actions: Vec<ActionDeclaration>,
}

impl StageDeclaration {
    pub fn new(name: impl Into<String>, actions: Vec<ActionDeclaration>) -> Self {
        Self { name: name.into(),
               actions }
    }

    /// Acciones agrupadas por `run_order` ascendente.
    pub fn run_order_groups(&self) -> Vec<(u32, Vec<&ActionDeclaration>)> {
        let mut groups: BTreeMap<u32, Vec<&ActionDeclaration>> = BTreeMap::new();
        for action in &self.actions {
            groups.entry(action.run_order).or_default().push(action);
        }
        groups.into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
    pub stages: Vec<StageDeclaration>,
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>, stages: Vec<StageDeclaration>) -> Self {
        Self { name: name.into(),
               stages }
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().flat_map(|s| s.actions.iter().map(|a| a.name.as_str()))
    }

    /// Verifica la forma del pipeline antes de ejecutarlo.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        let invalid = |msg: String| Err(DeliveryError::InvalidDefinition(msg));
        if self.stages.is_empty() {
            return invalid(format!("pipeline '{}' has no stages", self.name));
        }
        let mut names = HashSet::new();
        let mut produced: HashSet<&str> = HashSet::new();
        for stage in &self.stages {
            if stage.actions.is_empty() {
                return invalid(format!("stage '{}' has no actions", stage.name));
            }
            for (run_order, group) in stage.run_order_groups() {
                if run_order == 0 {
                    return invalid(format!("stage '{}' uses run_order 0", stage.name));
                }
                for action in &group {
                    if !names.insert(action.name.as_str()) {
                        return invalid(format!("duplicated action '{}'", action.name));
                    }
                    for input in &action.inputs {
                        if !produced.contains(input.as_str()) {
                            return invalid(format!("action '{}' consumes '{input}' before it is produced",
                                                   action.name));
                        }
                    }
                }
                // Los outputs del grupo quedan disponibles para grupos posteriores.
                for action in &group {
                    for output in &action.outputs {
                        if !produced.insert(output.as_str()) {
                            return invalid(format!("artifact '{output}' is produced more than once"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
