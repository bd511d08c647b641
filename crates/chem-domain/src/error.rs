use thiserror::Error;

/// Errores que invalidan una tabla completa de actividad.
///
/// Ninguno aborta la corrida: quien orquesta marca las salidas dependientes
/// de actividad como no disponibles y sigue produciendo la tabla de
/// estructuras.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("no se encontró la fila de encabezado con la etiqueta {label:?}")]
    HeaderNotFound { label: String },

    #[error("faltan columnas requeridas en el encabezado: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Error de validación: {0}")]
    ValidationError(String),
}
