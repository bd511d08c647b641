//! Carga de configuración de la fusión desde variables de entorno.
//! Convención `PHARM_MERGE_*`; los valores ausentes toman los defaults de las
//! exportaciones CAS.

use std::env;

use chem_domain::{ActivitySchema, MatchMode, StructureSchema};
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const ENV_PREFIX: &str = "PHARM_MERGE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    pub structure: StructureSchema,
    pub activity: ActivitySchema,
    /// Columnas `ID` / `SourceFile` en la tabla fusionada.
    pub include_provenance: bool,
    /// Backend de estructuras (`native` | `rdkit`).
    pub backend: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { structure: StructureSchema::default(),
               activity: ActivitySchema::default(),
               include_provenance: false,
               backend: "native".into() }
    }
}

impl MergeConfig {
    pub fn from_env() -> Result<Self, AdapterError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdapterError>
        where F: Fn(&str) -> Option<String>
    {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}")).map(|v| v.trim().to_string())
                                                 .filter(|v| !v.is_empty())
        };
        let mut cfg = Self::default();

        if let Some(v) = var("JOIN_KEY_PROPERTY") {
            cfg.structure.join_key_property = v;
        }
        if let Some(v) = var("NAME_PROPERTY") {
            cfg.structure.name_property = v;
        }
        if let Some(v) = var("NOTATION_COLUMN") {
            cfg.structure.notation_column = v;
        }
        if let Some(v) = var("HEADER_LABEL") {
            cfg.activity.header_label = v;
        }
        if let Some(v) = var("JOIN_KEY_COLUMN") {
            cfg.activity.join_key_column = v;
        }
        if let Some(v) = var("MEASUREMENT_COLUMN") {
            cfg.activity.measurement_column = v;
        }
        if let Some(v) = var("VALUE_COLUMN") {
            cfg.activity.value_column = v;
        }
        if let Some(v) = var("HEADER_MATCH") {
            cfg.activity.header_match.mode = parse_match_mode(&v)?;
        }
        if let Some(v) = var("HEADER_CASE_SENSITIVE") {
            cfg.activity.header_match.case_sensitive = parse_bool("HEADER_CASE_SENSITIVE", &v)?;
        }
        if let Some(v) = var("PROVENANCE") {
            cfg.include_provenance = parse_bool("PROVENANCE", &v)?;
        }
        if let Some(v) = var("BACKEND") {
            cfg.backend = v;
        }
        Ok(cfg)
    }
}

fn parse_match_mode(v: &str) -> Result<MatchMode, AdapterError> {
    match v.to_ascii_lowercase().as_str() {
        "contains" => Ok(MatchMode::Contains),
        "exact" => Ok(MatchMode::Exact),
        other => Err(AdapterError::Config(format!("{ENV_PREFIX}HEADER_MATCH: valor {other:?} (contains|exact)"))),
    }
}

fn parse_bool(name: &str, v: &str) -> Result<bool, AdapterError> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AdapterError::Config(format!("{ENV_PREFIX}{name}: valor booleano inválido {other:?}"))),
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
