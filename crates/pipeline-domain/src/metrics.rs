use crate::DomainError;

/// Raíz del error cuadrático medio.
///
/// # Errores
/// `ShapeMismatch` si las longitudes difieren; `InsufficientData` si están
/// vacías.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, DomainError> {
    if actual.len() != predicted.len() {
        return Err(DomainError::ShapeMismatch(format!("{} labels vs {} predictions",
                                                      actual.len(),
                                                      predicted.len())));
    }
    if actual.is_empty() {
        return Err(DomainError::InsufficientData("rmse of an empty set".into()));
    }
    let sse: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Ok((sse / actual.len() as f64).sqrt())
}
