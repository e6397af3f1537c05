//! Definiciones relacionadas a Steps.
//!
//! Un Step es una unidad que transforma a lo sumo un `Artifact` de entrada en
//! 0..n artifacts de salida. Este módulo define:
//! - `StepDefinition`: interfaz neutral (async) usada por el engine.
//! - `TypedStep`: interfaz de alto nivel con tipos fuertes.
//! - `StepRunResult` y señales (`StepSignal`).

pub mod definition;
mod run_result;
mod status;
pub mod typed;

pub use definition::{StepDefinition, StepKind};
pub use run_result::{StepRunResult, StepSignal};
pub use status::StepStatus;
pub use typed::{SameAs, StepRunResultTyped, TypedStep};
