//! chem-pharm-merge
//!
//! Fachada de la fusión ligandos + farmacología:
//! - `chemengine`: bloques SDF y parsers de estructura.
//! - `chem_domain`: extracción, encabezado, normalización, agregación,
//!   fusión y proyección.
//! - `chem_core`: fingerprints y log de eventos por corrida.
//! - `chem_adapters`: archivos, configuración y corrida por lotes.
//!
//! `merge_texts` corre el pipeline completo sobre contenidos en memoria, sin
//! tocar el sistema de archivos.

pub use chem_adapters;
pub use chem_core;
pub use chem_domain;
pub use chemengine;

pub use chem_adapters::{run_batch, run_pipeline, AdapterError, BatchInput, MergeConfig, RunOutcome, RunReport};

use chem_adapters::grid::parse_grid;
use chem_core::InMemoryEventStore;
use chemengine::{split_sdf, ChemEngine};

/// Un archivo SDF ya leído: `(nombre, contenido)`.
pub type SdfText<'a> = (&'a str, &'a str);

/// Ejecuta la fusión sobre textos: SDF (en orden) y una planilla CSV
/// opcional.
pub fn merge_texts(sdf: &[SdfText<'_>],
                   activity_csv: Option<&str>,
                   parameter: Option<&str>,
                   config: &MergeConfig)
                   -> Result<RunOutcome, AdapterError> {
    let engine = ChemEngine::from_name(&config.backend)?;
    let blocks: Vec<_> = sdf.iter().flat_map(|&(name, text)| split_sdf(text, Some(name))).collect();
    let grid = activity_csv.map(|text| parse_grid(text.as_bytes(), b',')).transpose()?;
    let mut store = InMemoryEventStore::default();
    run_pipeline(&blocks, grid.as_ref(), parameter, config, &engine, &mut store)
}
