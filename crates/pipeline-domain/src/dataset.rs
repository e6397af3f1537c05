//! Datos tabulares de entrenamiento y prueba.
//!
//! `FeatureMatrix` garantiza filas rectangulares y valores finitos;
//! `Dataset` agrega labels con la misma cantidad de filas.
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Matriz de features (fila = observación).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct FeatureMatrix {
    rows: Vec<Vec<f64>>,
    n_features: usize,
}

impl FeatureMatrix {
    /// # Errores
    /// `Validation` si las filas tienen distinta longitud o algún valor no es
    /// finito.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, DomainError> {
        let n_features = rows.first().map(|r| r.len()).unwrap_or(0);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(DomainError::Validation(format!("row {i} has {} features, expected {n_features}",
                                                           row.len())));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(DomainError::Validation(format!("row {i} contains a non-finite value")));
            }
        }
        Ok(Self { rows, n_features })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TryFrom<Vec<Vec<f64>>> for FeatureMatrix {
    type Error = DomainError;
    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        FeatureMatrix::new(rows)
    }
}

impl From<FeatureMatrix> for Vec<Vec<f64>> {
    fn from(m: FeatureMatrix) -> Self {
        m.rows
    }
}

/// Features + labels con la misma cantidad de filas.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: FeatureMatrix,
    labels: Vec<f64>,
}

impl Dataset {
    /// # Errores
    /// `ShapeMismatch` si `features.n_rows() != labels.len()`; `Validation` si
    /// algún label no es finito.
    pub fn new(features: FeatureMatrix, labels: Vec<f64>) -> Result<Self, DomainError> {
        if features.n_rows() != labels.len() {
            return Err(DomainError::ShapeMismatch(format!("{} feature rows vs {} labels",
                                                          features.n_rows(),
                                                          labels.len())));
        }
        if labels.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::Validation("labels contain a non-finite value".into()));
        }
        Ok(Self { features, labels })
    }

    /// Atajo desde filas crudas.
    pub fn from_rows(rows: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self, DomainError> {
        Self::new(FeatureMatrix::new(rows)?, labels)
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let err = FeatureMatrix::new(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn row_count_must_match_labels() {
        let err = Dataset::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, DomainError::ShapeMismatch("3 feature rows vs 2 labels".into()));
    }

    #[test]
    fn matrix_deserializes_with_validation() {
        let ok: FeatureMatrix = serde_json::from_str("[[1.0],[2.5]]").unwrap();
        assert_eq!(ok.n_features(), 1);
        assert!(serde_json::from_str::<FeatureMatrix>("[[1.0],[2.5, 3.0]]").is_err());
    }
}
