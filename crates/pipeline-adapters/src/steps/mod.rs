//! Tareas del workflow: Init → Prepare → Train → Evaluate.

pub mod evaluate;
pub mod init;
pub mod prepare;
pub mod train;

pub use evaluate::EvaluateStep;
pub use init::InitStep;
pub use prepare::PrepareStep;
pub use train::TrainStep;

use pipeline_core::run::RunContext;
use pipeline_core::CoreEngineError;

/// Verifica que los params inyectados y el artifact de entrada describen la
/// misma ejecución.
pub(crate) fn ensure_same_run(ctx: &RunContext, carried: &pipeline_core::run::RunParameters) -> Result<(), CoreEngineError> {
    if ctx.run_id().as_str() != carried.run_id {
        return Err(CoreEngineError::MissingInputs(format!("run id mismatch: params '{}' vs input '{}'",
                                                          ctx.run_id(),
                                                          carried.run_id)));
    }
    Ok(())
}
