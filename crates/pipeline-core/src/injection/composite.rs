//! Composición de `ParamInjector`: aplica una secuencia de inyectores de
//! forma determinista.

use crate::model::ExecutionContext;
use serde_json::Value;

use super::merge::merge_json;
use super::param_injector::ParamInjector;

/// Orden de merge: base -> injectors (en orden). Cada inyector ve los params
/// acumulados hasta ese punto.
pub fn apply_injectors(injectors: &[Box<dyn ParamInjector>], base: &Value, ctx: &ExecutionContext) -> Value {
    let mut accumulated = base.clone();
    for inj in injectors.iter() {
        let v = inj.inject(&accumulated, ctx);
        accumulated = merge_json(&accumulated, &v);
    }
    accumulated
}
