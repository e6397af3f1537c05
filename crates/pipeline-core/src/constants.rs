//! Constantes del motor core.
//!
//! `ENGINE_VERSION` forma parte del input de los fingerprints: cambiarla
//! invalida los fingerprints previos aunque la definición y los datos no
//! cambien.

/// Versión lógica del motor. Mantener estable mientras no haya cambios
/// incompatibles en la forma de calcular fingerprints.
pub const ENGINE_VERSION: &str = "W1.0";

/// Nombre de la señal que emite el paso de evaluación con la decisión de
/// promoción.
pub const PROMOTION_DECISION_SIGNAL: &str = "PROMOTION_DECISION";

/// Longitud del token aleatorio de `RunId`.
pub const RUN_ID_LEN: usize = 8;
