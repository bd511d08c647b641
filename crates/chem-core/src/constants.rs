//! Constantes del pipeline.

/// Versión lógica del pipeline de fusión. Entra en el fingerprint de la
/// corrida: cambiarla invalida los fingerprints aunque las entradas sean las
/// mismas.
pub const PIPELINE_VERSION: &str = "M1.0";
