//! Disparo del pipeline: sólo un commit en la rama configurada del
//! repositorio configurado inicia una ejecución.

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEvent {
    pub repository: String,
    pub branch: String,
    pub commit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerFilter {
    pub repository: String,
    pub branch: String,
}

impl TriggerFilter {
    pub fn new(repository: impl Into<String>) -> Self {
        Self { repository: repository.into(),
               branch: DEFAULT_BRANCH.to_string() }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn accepts(&self, event: &CommitEvent) -> bool {
        let accepted = event.repository == self.repository && event.branch == self.branch;
        if accepted {
            info!("commit {} on {}/{} triggers the pipeline", event.commit, event.repository, event.branch);
        } else {
            warn!("ignoring commit {} on {}/{} (pipeline listens on {}/{})",
                  event.commit,
                  event.repository,
                  event.branch,
                  self.repository,
                  self.branch);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(repository: &str, branch: &str) -> CommitEvent {
        CommitEvent { repository: repository.into(),
                      branch: branch.into(),
                      commit: "c0ffee".into() }
    }

    #[test]
    fn only_the_configured_branch_triggers() {
        let filter = TriggerFilter::new("regression-app");
        assert!(filter.accepts(&commit("regression-app", "main")));
        assert!(!filter.accepts(&commit("regression-app", "feature/x")));
        assert!(!filter.accepts(&commit("other", "main")));
        assert!(TriggerFilter::new("r").with_branch("release").accepts(&commit("r", "release")));
    }
}
