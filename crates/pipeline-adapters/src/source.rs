//! Origen de los datos que Prepare materializa por ejecución.

use pipeline_domain::DomainError;

/// Datos crudos (sin validar) de una corrida de preparación.
#[derive(Debug, Clone, PartialEq)]
pub struct RawData {
    pub train_features: Vec<Vec<f64>>,
    pub train_labels: Vec<f64>,
    pub test_features: Vec<Vec<f64>>,
    pub test_labels: Vec<f64>,
    pub inference: Option<Vec<Vec<f64>>>,
}

pub trait DataSource: Send + Sync + std::fmt::Debug {
    fn fetch(&self) -> Result<RawData, DomainError>;
}

/// Fuente fija: el set canónico de una feature usado por el pipeline de
/// ejemplo, o datos arbitrarios inyectados en pruebas.
#[derive(Debug, Clone)]
pub struct StaticDataSource {
    data: RawData,
}

impl StaticDataSource {
    pub fn new(data: RawData) -> Self {
        Self { data }
    }

    pub fn canonical() -> Self {
        let col = |xs: &[f64]| xs.iter().map(|x| vec![*x]).collect::<Vec<_>>();
        Self::new(RawData { train_features: col(&[6.0, 16.0, 26.0, 36.0, 46.0, 56.0, 64.0]),
                            train_labels: vec![4.0, 18.0, 20.0, 22.0, 24.0, 35.0, 45.0],
                            test_features: col(&[1.0, 12.0, 24.0, 36.0, 48.0, 60.0, 72.0]),
                            test_labels: vec![3.0, 9.0, 20.0, 29.0, 42.0, 53.0, 60.0],
                            inference: Some(vec![vec![1.0]]) })
    }
}

impl Default for StaticDataSource {
    fn default() -> Self {
        Self::canonical()
    }
}

impl DataSource for StaticDataSource {
    fn fetch(&self) -> Result<RawData, DomainError> {
        Ok(self.data.clone())
    }
}
