//! chem-adapters: capa de adaptación archivos ↔ dominio.
//!
//! Este crate provee:
//! - Lectura de planillas (`grid`) y de archivos SDF (`structures`).
//! - Un trait `TableEncoder` para serializar tablas de dominio (CSV).
//! - Convenciones de nombres de salida (`naming`).
//! - Configuración desde variables de entorno (`config`).
//! - La corrida completa con registro de eventos (`pipeline`).

pub mod config;
pub mod encoder;
pub mod error;
pub mod grid;
pub mod naming;
pub mod pipeline;
pub mod structures;

pub use config::MergeConfig;
pub use encoder::{CsvTableEncoder, TableEncoder};
pub use error::AdapterError;
pub use naming::derive_prefix;
pub use pipeline::{run_batch, run_pipeline, BatchInput, BatchOutput, RunManifest, RunOutcome, RunReport};
