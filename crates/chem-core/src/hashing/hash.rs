//! Hash helpers sobre blake3.

use blake3::Hasher;
use serde_json::Value;

use super::canonical_json::to_canonical_json;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hash del JSON canónico de `value` (independiente del orden de claves).
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// Combina fingerprints parciales en uno solo, respetando el orden recibido.
pub fn combine(parts: &[String]) -> String {
    hash_value(&Value::Array(parts.iter().cloned().map(Value::String).collect()))
}
