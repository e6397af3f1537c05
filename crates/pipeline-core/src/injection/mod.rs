//! Inyección de parámetros determinista.
//!
//! Los params efectivos de un step son `base_params` mergeados con la salida
//! de cada inyector registrado en el engine, en orden de registro.

pub mod composite;
pub mod merge;
pub mod param_injector;

pub use composite::apply_injectors;
pub use merge::merge_json;
pub use param_injector::ParamInjector;
