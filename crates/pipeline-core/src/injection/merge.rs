//! Combinación de params: base de la tarea + aportes de los injectors.

use serde_json::Value;

/// Merge de un nivel: cada clave de `overlay` reemplaza entera a la de
/// `base` (un `"Input"` inyectado no se mezcla con uno previo). Si alguno
/// no es objeto gana `overlay`.
pub fn merge_json(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(b), Value::Object(o)) => {
            let mut merged = b.clone();
            merged.extend(o.iter().map(|(k, v)| (k.clone(), v.clone())));
            Value::Object(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}
