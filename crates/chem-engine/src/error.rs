use thiserror::Error;

/// Motivo por el que un bloque de estructura no pudo convertirse.
///
/// Es un fallo local a un registro: quien extrae lo cuenta y sigue con el
/// siguiente bloque.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("bloque truncado: falta {0}")]
    Truncated(&'static str),
    #[error("línea de conteos inválida: {0:?}")]
    InvalidCounts(String),
    #[error("formato no soportado: {0}")]
    Unsupported(String),
    #[error("la estructura no contiene átomos")]
    NoAtoms,
    #[error("átomo {index} inválido: {reason}")]
    InvalidAtom { index: usize, reason: String },
    #[error("enlace {index} inválido: {reason}")]
    InvalidBond { index: usize, reason: String },
    #[error("backend rechazó la estructura: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend desconocido: {0}")]
    UnknownBackend(String),
    #[error("backend no disponible en esta compilación: {0}")]
    BackendUnavailable(String),
    #[cfg(feature = "rdkit")]
    #[error("Error inicializando Python/RDKit: {0}")]
    Init(pyo3::PyErr),
}
