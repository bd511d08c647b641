//! Errores de la capa de adaptación (archivos, formatos, configuración).

use std::path::PathBuf;

use chem_core::CoreError;
use chemengine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no se pudo leer/escribir {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV inválido en {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("CSV: {0}")]
    CsvData(#[from] csv::Error),
    #[error("serialización JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuración inválida: {0}")]
    Config(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AdapterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(),
                   source }
    }
}
