//! Tipos de evento de una corrida y estructura `RunEvent`.
//!
//! Cada corrida del pipeline emite eventos a un `EventStore` append-only. El
//! enum `RunEventKind` es el contrato observable: se serializa en el
//! manifiesto y sirve para auditar qué salidas quedaron disponibles.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Primer evento de un `run_id`: fija la versión y el fingerprint de las
    /// entradas.
    RunInitialized { pipeline_version: String, inputs_fingerprint: String },
    StructuresExtracted { parsed: usize, skipped: usize, backend: String },
    HeaderLocated { row: usize },
    ActivityNormalized { records: usize, columns: usize },
    /// La tabla de actividad no está disponible; las salidas que dependen de
    /// ella se omiten.
    ActivityUnavailable { error: String },
    Aggregated { keys: usize, ambiguous_values: usize },
    Merged { rows: usize, matched: usize, fingerprint: String },
    ParameterProjected { parameter: String, rows: usize, fingerprint: String },
    ParameterSkipped { reason: String },
    /// Cierre con el fingerprint combinado de las salidas producidas.
    RunCompleted { run_fingerprint: String },
}

impl RunEventKind {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEventKind::RunCompleted { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
