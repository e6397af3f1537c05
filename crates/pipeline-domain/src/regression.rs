//! Regresión lineal por mínimos cuadrados ordinarios (con intercepto).
//!
//! Resuelve las ecuaciones normales `(XᵀX) β = Xᵀy` por eliminación
//! gaussiana con pivoteo parcial; `X` lleva una columna de unos para el
//! intercepto.
use serde::{Deserialize, Serialize};

use crate::{Dataset, DomainError, FeatureMatrix};

const PIVOT_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    pub const ALGORITHM: &'static str = "LinearRegression";

    /// Construye un modelo desde parámetros ya conocidos.
    pub fn from_parameters(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self { coefficients, intercept }
    }

    /// Ajusta el modelo a `data`.
    ///
    /// # Errores
    /// `InsufficientData` si el dataset está vacío o el sistema es singular
    /// (menos observaciones independientes que parámetros).
    pub fn fit(data: &Dataset) -> Result<Self, DomainError> {
        if data.is_empty() {
            return Err(DomainError::InsufficientData("training set is empty".into()));
        }
        let p = data.features().n_features() + 1;

        // Sistema aumentado [XᵀX | Xᵀy] de p x (p + 1).
        let mut system = vec![vec![0.0; p + 1]; p];
        for (row, &y) in data.features().rows().iter().zip(data.labels()) {
            let x: Vec<f64> = std::iter::once(1.0).chain(row.iter().copied()).collect();
            for i in 0..p {
                for j in 0..p {
                    system[i][j] += x[i] * x[j];
                }
                system[i][p] += x[i] * y;
            }
        }

        let beta = solve(system).ok_or_else(|| {
                                    DomainError::InsufficientData(format!("singular system with {} rows and {} parameters",
                                                                          data.len(),
                                                                          p))
                                })?;
        Ok(Self { intercept: beta[0],
                  coefficients: beta[1..].to_vec() })
    }

    /// # Errores
    /// `ShapeMismatch` si la cantidad de features no coincide con el modelo.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, DomainError> {
        if !features.is_empty() && features.n_features() != self.coefficients.len() {
            return Err(DomainError::ShapeMismatch(format!("model expects {} features, got {}",
                                                          self.coefficients.len(),
                                                          features.n_features())));
        }
        Ok(features.rows()
                   .iter()
                   .map(|row| self.intercept + row.iter().zip(&self.coefficients).map(|(x, c)| x * c).sum::<f64>())
                   .collect())
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

/// Eliminación gaussiana con pivoteo parcial sobre un sistema aumentado.
/// `None` si es singular.
fn solve(mut a: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let n = a.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(1.0_f64, f64::max);
    for col in 0..n {
        let pivot = (col..n).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if a[pivot][col].abs() <= PIVOT_EPSILON * scale {
            return None;
        }
        a.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..=n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (a[row][n] - tail) / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_an_exact_line() {
        let data = Dataset::from_rows(vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]],
                                      vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        let m = LinearRegression::fit(&data).unwrap();
        assert!((m.intercept() - 1.0).abs() < 1e-9);
        assert!((m.coefficients()[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn two_features() {
        // y = 0.5 + 2 a - b
        let rows = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0], vec![2.0, 3.0]];
        let labels = rows.iter().map(|r| 0.5 + 2.0 * r[0] - r[1]).collect();
        let m = LinearRegression::fit(&Dataset::from_rows(rows, labels).unwrap()).unwrap();
        assert!((m.coefficients()[0] - 2.0).abs() < 1e-9);
        assert!((m.coefficients()[1] + 1.0).abs() < 1e-9);
        assert!((m.intercept() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_and_singular_are_insufficient() {
        let empty = Dataset::from_rows(vec![], vec![]).unwrap();
        assert!(matches!(LinearRegression::fit(&empty), Err(DomainError::InsufficientData(_))));

        let same_x = Dataset::from_rows(vec![vec![2.0], vec![2.0]], vec![1.0, 3.0]).unwrap();
        assert!(matches!(LinearRegression::fit(&same_x), Err(DomainError::InsufficientData(_))));
    }

    #[test]
    fn predict_checks_feature_count() {
        let m = LinearRegression::from_parameters(vec![1.0], 0.0);
        let wide = FeatureMatrix::new(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(m.predict(&wide), Err(DomainError::ShapeMismatch(_))));
        let ok = FeatureMatrix::new(vec![vec![4.0]]).unwrap();
        assert_eq!(m.predict(&ok).unwrap(), vec![4.0]);
    }
}
