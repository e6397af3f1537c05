//! Forma serializada del modelo entrenado.
//!
//! El checksum SHA-256 cubre algoritmo, versión y parámetros; `from_bytes`
//! lo recalcula y rechaza artifacts alterados.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{DomainError, LinearRegression};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    algorithm: String,
    version: String,
    trained_at: DateTime<Utc>,
    n_features: usize,
    coefficients: Vec<f64>,
    intercept: f64,
    checksum: String,
}

impl ModelArtifact {
    /// Empaqueta un modelo; `version` identifica la ejecución que lo entrenó.
    pub fn from_model(model: &LinearRegression, version: impl Into<String>, trained_at: DateTime<Utc>) -> Self {
        let mut artifact = ModelArtifact { algorithm: LinearRegression::ALGORITHM.to_string(),
                                           version: version.into(),
                                           trained_at,
                                           n_features: model.n_features(),
                                           coefficients: model.coefficients().to_vec(),
                                           intercept: model.intercept(),
                                           checksum: String::new() };
        artifact.checksum = artifact.calculate_checksum();
        artifact
    }

    fn calculate_checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.algorithm.as_bytes());
        hasher.update(b"|");
        hasher.update(self.version.as_bytes());
        hasher.update(b"|");
        hasher.update((self.n_features as u64).to_le_bytes());
        for c in &self.coefficients {
            hasher.update(c.to_bits().to_le_bytes());
        }
        hasher.update(self.intercept.to_bits().to_le_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DomainError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// # Errores
    /// `Serialization` si el JSON es inválido; `Validation` si el algoritmo no
    /// es soportado, el checksum no coincide o `n_features` es inconsistente.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DomainError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        if artifact.algorithm != LinearRegression::ALGORITHM {
            return Err(DomainError::Validation(format!("unsupported algorithm '{}'", artifact.algorithm)));
        }
        if artifact.coefficients.len() != artifact.n_features {
            return Err(DomainError::Validation(format!("{} coefficients for {} features",
                                                       artifact.coefficients.len(),
                                                       artifact.n_features)));
        }
        if artifact.calculate_checksum() != artifact.checksum {
            return Err(DomainError::Validation("model checksum mismatch".into()));
        }
        Ok(artifact)
    }

    pub fn to_model(&self) -> LinearRegression {
        LinearRegression::from_parameters(self.coefficients.clone(), self.intercept)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelArtifact {
        ModelArtifact::from_model(&LinearRegression::from_parameters(vec![0.62], 1.5), "1a2b3c4d", Utc::now())
    }

    #[test]
    fn bytes_decode_back_to_the_same_model() {
        let a = sample();
        let back = ModelArtifact::from_bytes(&a.to_bytes().unwrap()).unwrap();
        assert_eq!(back, a);
        assert_eq!(back.to_model().coefficients(), &[0.62]);
    }

    #[test]
    fn fitted_parameters_survive_the_byte_form() {
        let m = LinearRegression::from_parameters(vec![1.9999999999999893], 100.00000000000004);
        let a = ModelArtifact::from_model(&m, "5e6f7a8b", Utc::now());
        let back = ModelArtifact::from_bytes(&a.to_bytes().unwrap()).unwrap();
        assert_eq!(back.to_model().coefficients()[0].to_bits(), 1.9999999999999893f64.to_bits());
        assert_eq!(back.checksum(), a.checksum());
    }

    #[test]
    fn tampered_parameters_fail_checksum() {
        let a = sample();
        let mut v: serde_json::Value = serde_json::from_slice(&a.to_bytes().unwrap()).unwrap();
        v["intercept"] = serde_json::json!(2.5);
        let err = ModelArtifact::from_bytes(&serde_json::to_vec(&v).unwrap()).unwrap_err();
        assert_eq!(err, DomainError::Validation("model checksum mismatch".into()));
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        assert!(matches!(ModelArtifact::from_bytes(b"not json"), Err(DomainError::Serialization(_))));
    }
}
