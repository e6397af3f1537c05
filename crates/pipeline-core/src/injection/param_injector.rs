//! Contrato para inyectores de parámetros.

use crate::model::ExecutionContext;
use serde_json::Value;

/// Un `ParamInjector` recibe los params acumulados del step y el
/// `ExecutionContext` (con el input ya resuelto) y devuelve un `Value` que
/// será mergeado encima. Debe ser determinista y sin efectos secundarios.
pub trait ParamInjector: Send + Sync + std::fmt::Debug {
    fn inject(&self, base: &Value, ctx: &ExecutionContext) -> Value;
}
