//! Lectura de la planilla de actividad como grilla cruda de texto.
//!
//! No se asume fila de encabezado: la ubicación del encabezado es trabajo del
//! dominio. Los libros de cálculo deben exportarse antes a CSV/TSV.

use std::io::Read;
use std::path::Path;

use chem_domain::Grid;
use csv::ReaderBuilder;

use crate::error::AdapterError;

/// `\t` para `.tsv`/`.tab`, `,` para el resto.
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

pub fn read_grid(path: &Path) -> Result<Grid, AdapterError> {
    let file = std::fs::File::open(path).map_err(|e| AdapterError::io(path, e))?;
    let grid = parse_grid(file, delimiter_for(path)).map_err(|source| AdapterError::Csv { path: path.to_path_buf(),
                                                                                          source })?;
    log::info!("planilla {}: {} filas", path.display(), grid.len());
    Ok(grid)
}

/// Filas de largo variable; las celdas se conservan tal cual. Los bytes que
/// no son UTF-8 (exportaciones Latin-1 de planillas) se reemplazan por U+FFFD
/// en lugar de invalidar la planilla completa.
pub fn parse_grid<R: Read>(reader: R, delimiter: u8) -> Result<Grid, csv::Error> {
    let mut reader = ReaderBuilder::new().has_headers(false)
                                         .flexible(true)
                                         .delimiter(delimiter)
                                         .from_reader(reader);
    let mut grid = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        grid.push(record.iter().map(|cell| String::from_utf8_lossy(cell).into_owned()).collect());
    }
    Ok(grid)
}
