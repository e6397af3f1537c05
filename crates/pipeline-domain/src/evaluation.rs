//! Resultado de comparar el modelo challenger contra el baseline.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Origen del `baseline_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    /// Score persistido del champion en producción.
    PriorChampion,
    /// RMSE del challenger sobre su propio set de entrenamiento (placeholder
    /// cuando no hay champion).
    TrainingSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub challenger_score: f64,
    pub baseline_score: f64,
    pub promote: bool,
    pub baseline_source: BaselineSource,
}

/// Score del champion vigente, insumo externo de Evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionScore {
    pub score: f64,
    pub model_version: String,
    pub recorded_at: DateTime<Utc>,
}

impl ChampionScore {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DomainError> {
        let s: ChampionScore = serde_json::from_slice(bytes)?;
        if !s.score.is_finite() || s.score < 0.0 {
            return Err(DomainError::Validation(format!("invalid champion score {}", s.score)));
        }
        Ok(s)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DomainError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_source_wire_names() {
        assert_eq!(serde_json::to_value(BaselineSource::PriorChampion).unwrap(), "prior_champion");
        assert_eq!(serde_json::to_value(BaselineSource::TrainingSet).unwrap(), "training_set");
    }

    #[test]
    fn negative_champion_score_is_rejected() {
        let raw = br#"{"score": -1.0, "model_version": "x", "recorded_at": "2024-01-02T00:00:00Z"}"#;
        assert!(matches!(ChampionScore::from_bytes(raw), Err(DomainError::Validation(_))));
    }
}
