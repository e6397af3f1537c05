//! Inyector que arma el payload `{"Input": {"RunParameters": ...}}` a partir
//! del artifact de entrada del step.

use pipeline_core::model::ExecutionContext;
use pipeline_core::ParamInjector;
use serde_json::{json, Value};

/// Toma `run_parameters` del payload del input (todos los artifacts del
/// workflow lo llevan). Sin input (Init) no inyecta nada.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunParametersInjector;

impl ParamInjector for RunParametersInjector {
    fn inject(&self, _base: &Value, ctx: &ExecutionContext) -> Value {
        match ctx.input.as_ref().and_then(|a| a.payload.get("run_parameters")) {
            Some(rp) => json!({ "Input": { "RunParameters": rp } }),
            None => json!({}),
        }
    }
}
