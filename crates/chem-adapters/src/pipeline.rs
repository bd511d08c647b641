//! Corrida por lotes: estructuras + planilla -> tabla fusionada y tabla por
//! parámetro.
//!
//! `run_pipeline` trabaja en memoria y registra un evento por etapa en el
//! `EventStore`. `run_batch` agrega la lectura de archivos, la escritura de
//! salidas y el manifiesto.
//!
//! Los errores que afectan a toda la tabla de actividad (encabezado o
//! esquema) no abortan: quedan en el reporte y se omiten las salidas que
//! dependen de ella.

use std::path::{Path, PathBuf};

use chem_core::hashing::{combine, hash_value};
use chem_core::{EventStore, InMemoryEventStore, RunEvent, RunEventKind, PIPELINE_VERSION};
use chem_domain::{aggregate_by_key, default_parameter, extract_structures, merge_tables, parameter_options, project_parameter,
                  read_activity, ActivityTable, Grid, MergeOptions, MergedTable, ParameterTable};
use chemengine::{ChemEngine, StructureBlock, StructureParser};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::config::MergeConfig;
use crate::encoder::{sha256_hex, table_fingerprint, CsvTableEncoder, TableEncoder};
use crate::error::AdapterError;
use crate::grid::read_grid;
use crate::naming::{derive_prefix, manifest_file_name, merged_file_name, parameter_file_name};
use crate::structures::load_structure_blocks;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSummary {
    pub index: usize,
    pub source: Option<String>,
    pub title: String,
    pub reason: String,
}

/// Resumen observable de una corrida.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub backend: String,
    pub parsed: usize,
    pub skipped: usize,
    pub skipped_blocks: Vec<SkippedSummary>,
    pub header_row: Option<usize>,
    /// Motivo por el que la tabla de actividad no está disponible.
    pub activity_error: Option<String>,
    pub parameter_options: Vec<String>,
    pub selected_parameter: Option<String>,
    pub merged_rows: usize,
    pub matched_rows: usize,
    pub parameter_rows: Option<usize>,
    pub ambiguous_values: usize,
    pub run_fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub merged: MergedTable,
    pub parameter: Option<ParameterTable>,
    pub events: Vec<RunEvent>,
}

/// Ejecuta todas las etapas sobre entradas ya cargadas.
///
/// `grid == None` significa que no se entregó planilla: la salida es la tabla
/// de estructuras sola. `parameter == None` elige el parámetro por defecto.
pub fn run_pipeline<P, S>(blocks: &[StructureBlock],
                          grid: Option<&Grid>,
                          parameter: Option<&str>,
                          config: &MergeConfig,
                          parser: &P,
                          store: &mut S)
                          -> Result<RunOutcome, AdapterError>
    where P: StructureParser + ?Sized,
          S: EventStore
{
    let run_id = Uuid::new_v4();
    let inputs_fingerprint = hash_value(&json!({
        "pipeline_version": PIPELINE_VERSION,
        "backend": parser.name(),
        "config": serde_json::to_value(config)?,
        "blocks": serde_json::to_value(blocks)?,
        "grid": grid,
        "parameter": parameter,
    }));
    store.append_kind(run_id,
                      RunEventKind::RunInitialized { pipeline_version: PIPELINE_VERSION.to_string(),
                                                     inputs_fingerprint: inputs_fingerprint.clone() })?;

    // 1. estructuras
    let extraction = extract_structures(blocks, parser, &config.structure);
    log::info!("estructuras: {} interpretadas, {} omitidas ({})",
               extraction.parsed_count(),
               extraction.skipped_count(),
               parser.name());
    store.append_kind(run_id,
                      RunEventKind::StructuresExtracted { parsed: extraction.parsed_count(),
                                                          skipped: extraction.skipped_count(),
                                                          backend: parser.name().to_string() })?;

    // 2. actividad
    let mut header_row = None;
    let mut activity_error = None;
    let activity: Option<ActivityTable> = match grid {
        None => {
            activity_error = Some("no se entregó planilla de actividad".to_string());
            None
        }
        Some(grid) => match read_activity(grid, &config.activity) {
            Ok(table) => {
                header_row = Some(table.header_row);
                store.append_kind(run_id, RunEventKind::HeaderLocated { row: table.header_row })?;
                store.append_kind(run_id,
                                  RunEventKind::ActivityNormalized { records: table.len(),
                                                                     columns: table.columns.len() })?;
                log::info!("actividad: encabezado en la fila {}, {} registros", table.header_row, table.len());
                Some(table)
            }
            Err(e) => {
                activity_error = Some(e.to_string());
                None
            }
        },
    };
    if let Some(reason) = &activity_error {
        log::warn!("salidas de actividad no disponibles: {}", reason);
        store.append_kind(run_id, RunEventKind::ActivityUnavailable { error: reason.clone() })?;
    }

    // 3. agregación + fusión
    let aggregated = activity.as_ref().map(aggregate_by_key);
    if let Some(agg) = &aggregated {
        store.append_kind(run_id,
                          RunEventKind::Aggregated { keys: agg.len(),
                                                     ambiguous_values: agg.ambiguous_values })?;
    }
    let merged = merge_tables(&extraction.table,
                              aggregated.as_ref(),
                              &config.structure,
                              MergeOptions { include_provenance: config.include_provenance });
    let merged_fp = table_fingerprint(&merged);
    log::info!("fusión: {} filas, {} con actividad", merged.len(), merged.matched_count());
    store.append_kind(run_id,
                      RunEventKind::Merged { rows: merged.len(),
                                             matched: merged.matched_count(),
                                             fingerprint: merged_fp.clone() })?;

    // 4. proyección por parámetro
    let options = activity.as_ref().map(parameter_options).unwrap_or_default();
    let selected = match (&activity, parameter) {
        (None, _) => None,
        (Some(_), Some(p)) => Some(p.trim().to_string()),
        (Some(_), None) => default_parameter(&options).map(str::to_string),
    };
    let projected = match (&activity, &selected) {
        (Some(table), Some(p)) => {
            if !options.contains(p) {
                log::warn!("el parámetro {:?} no figura entre las opciones {:?}", p, options);
            }
            Some(project_parameter(&extraction.table, table, p, &config.structure))
        }
        _ => None,
    };
    let mut fingerprints = vec![inputs_fingerprint, merged_fp];
    match &projected {
        Some(table) => {
            let fp = table_fingerprint(table);
            store.append_kind(run_id,
                              RunEventKind::ParameterProjected { parameter: table.parameter.clone(),
                                                                 rows: table.len(),
                                                                 fingerprint: fp.clone() })?;
            fingerprints.push(fp);
        }
        None => {
            let reason = if activity.is_none() {
                "tabla de actividad no disponible".to_string()
            } else {
                "la planilla no tiene tipos de medida".to_string()
            };
            store.append_kind(run_id, RunEventKind::ParameterSkipped { reason })?;
        }
    }

    let run_fingerprint = combine(&fingerprints);
    store.append_kind(run_id,
                      RunEventKind::RunCompleted { run_fingerprint: run_fingerprint.clone() })?;

    let report = RunReport { run_id,
                             backend: parser.name().to_string(),
                             parsed: extraction.parsed_count(),
                             skipped: extraction.skipped_count(),
                             skipped_blocks: extraction.skipped
                                                       .iter()
                                                       .map(|s| SkippedSummary { index: s.index,
                                                                                 source: s.source.clone(),
                                                                                 title: s.title.clone(),
                                                                                 reason: s.reason.to_string() })
                                                       .collect(),
                             header_row,
                             activity_error,
                             parameter_options: options,
                             selected_parameter: projected.as_ref().map(|t| t.parameter.clone()),
                             merged_rows: merged.len(),
                             matched_rows: merged.matched_count(),
                             parameter_rows: projected.as_ref().map(ParameterTable::len),
                             ambiguous_values: aggregated.as_ref().map(|a| a.ambiguous_values).unwrap_or(0),
                             run_fingerprint };

    Ok(RunOutcome { report,
                    merged,
                    parameter: projected,
                    events: store.list(run_id) })
}

/// Entradas de una corrida desde archivos.
#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    pub sdf_files: Vec<PathBuf>,
    pub activity_file: Option<PathBuf>,
    pub parameter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub name: String,
    pub sha256: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub pipeline_version: String,
    pub prefix: String,
    pub inputs: Vec<String>,
    pub files: Vec<WrittenFile>,
    pub report: RunReport,
    pub events: Vec<RunEvent>,
}

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub outcome: RunOutcome,
    pub manifest_path: PathBuf,
    pub written: Vec<PathBuf>,
}

fn write_table<E: TableEncoder>(encoder: &E,
                                table: &dyn chem_domain::TableView,
                                path: &Path)
                                -> Result<WrittenFile, AdapterError> {
    let bytes = encoder.encode(table)?;
    std::fs::write(path, &bytes).map_err(|e| AdapterError::io(path, e))?;
    log::info!("escrito {} ({} filas)", path.display(), table.row_count());
    Ok(WrittenFile { name: path.file_name()
                               .map(|n| n.to_string_lossy().into_owned())
                               .unwrap_or_default(),
                     sha256: sha256_hex(&bytes),
                     rows: table.row_count() })
}

/// Lee los archivos, corre el pipeline y escribe las salidas en `out_dir`.
pub fn run_batch(input: &BatchInput, config: &MergeConfig, out_dir: &Path) -> Result<BatchOutput, AdapterError> {
    let engine = ChemEngine::from_name(&config.backend)?;
    let blocks = load_structure_blocks(&input.sdf_files)?;
    let grid = input.activity_file.as_deref().map(read_grid).transpose()?;

    let mut store = InMemoryEventStore::default();
    let outcome = run_pipeline(&blocks,
                               grid.as_ref(),
                               input.parameter.as_deref(),
                               config,
                               &engine,
                               &mut store)?;

    std::fs::create_dir_all(out_dir).map_err(|e| AdapterError::io(out_dir, e))?;
    let prefix = derive_prefix(&input.sdf_files);
    let encoder = CsvTableEncoder;
    let mut files = Vec::new();
    let mut written = Vec::new();

    let merged_path = out_dir.join(merged_file_name(&prefix, encoder.extension()));
    files.push(write_table(&encoder, &outcome.merged, &merged_path)?);
    written.push(merged_path);

    if let Some(table) = &outcome.parameter {
        let path = out_dir.join(parameter_file_name(&prefix, &table.parameter, encoder.extension()));
        files.push(write_table(&encoder, table, &path)?);
        written.push(path);
    }

    let mut inputs: Vec<String> = input.sdf_files.iter().map(|p| p.display().to_string()).collect();
    if let Some(p) = &input.activity_file {
        inputs.push(p.display().to_string());
    }
    let manifest = RunManifest { pipeline_version: PIPELINE_VERSION.to_string(),
                                 prefix: prefix.clone(),
                                 inputs,
                                 files,
                                 report: outcome.report.clone(),
                                 events: outcome.events.clone() };
    let manifest_path = out_dir.join(manifest_file_name(&prefix));
    let json = serde_json::to_vec_pretty(&manifest)?;
    std::fs::write(&manifest_path, json).map_err(|e| AdapterError::io(&manifest_path, e))?;

    Ok(BatchOutput { outcome,
                     manifest_path,
                     written })
}
