//! Tabla de farmacología: ubicación del encabezado y normalización de filas.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::schema::{ActivitySchema, HeaderMatch};

/// Grilla cruda de celdas de texto, tal como sale de la planilla.
pub type Grid = Vec<Vec<String>>;

/// Parámetro sugerido cuando está disponible.
pub const DEFAULT_PARAMETER: &str = "IC50";

/// Devuelve el índice de la primera fila que tiene alguna celda que cumple la
/// regla contra `label`.
pub fn locate_header(grid: &[Vec<String>], label: &str, rule: HeaderMatch) -> Result<usize, DomainError> {
    let label = label.trim();
    grid.iter()
        .position(|row| row.iter().any(|cell| rule.matches(cell, label)))
        .ok_or_else(|| DomainError::HeaderNotFound { label: label.to_string() })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Índice de la fila dentro de la grilla original.
    pub row: usize,
    /// Clave recortada; `None` si la celda está vacía.
    pub join_key: Option<String>,
    pub measurement_type: String,
    pub value: String,
    /// Todas las celdas de la fila indexadas por nombre de columna.
    pub cells: IndexMap<String, String>,
}

impl ActivityRecord {
    pub fn cell(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTable {
    /// Índice de la fila de encabezado en la grilla.
    pub header_row: usize,
    /// Nombres de columna (recortados, sin vacíos, sin repetidos) en orden.
    pub columns: Vec<String>,
    pub records: Vec<ActivityRecord>,
}

impl ActivityTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Construye la tabla de actividad usando la fila `header_row` como nombres
/// de columna y las filas siguientes como datos.
///
/// - Las celdas se recortan; las columnas con encabezado vacío se ignoran.
/// - Ante encabezados repetidos la columna conserva su primera posición y el
///   valor de la última celda.
/// - Las filas completamente vacías se descartan.
/// - Faltar la columna clave, la de tipo de medida o la de valor es un error
///   de esquema.
pub fn normalize_activity(grid: &[Vec<String>], header_row: usize, schema: &ActivitySchema) -> Result<ActivityTable, DomainError> {
    let header = grid.get(header_row).ok_or_else(|| {
                                         DomainError::ValidationError(format!("fila de encabezado {} fuera de la grilla ({} filas)",
                                                                              header_row,
                                                                              grid.len()))
                                     })?;

    let mut assignments: Vec<(usize, String)> = Vec::new();
    let mut columns: IndexSet<String> = IndexSet::new();
    for (idx, cell) in header.iter().enumerate() {
        let name = cell.trim();
        if name.is_empty() {
            continue;
        }
        if !columns.insert(name.to_string()) {
            log::debug!("encabezado repetido {:?} en la columna {}", name, idx);
        }
        assignments.push((idx, name.to_string()));
    }

    let missing: Vec<String> = [&schema.join_key_column, &schema.measurement_column, &schema.value_column].into_iter()
                                                                                                        .filter(|c| !columns.contains(c.as_str()))
                                                                                                        .cloned()
                                                                                                        .collect();
    if !missing.is_empty() {
        return Err(DomainError::Schema { missing });
    }

    let mut records = Vec::new();
    for (row_idx, row) in grid.iter().enumerate().skip(header_row + 1) {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mut cells: IndexMap<String, String> = columns.iter().map(|c| (c.clone(), String::new())).collect();
        for (idx, name) in &assignments {
            let value = row.get(*idx).map(|c| c.trim()).unwrap_or("");
            cells.insert(name.clone(), value.to_string());
        }
        let key = cells.get(&schema.join_key_column).cloned().unwrap_or_default();
        let measurement_type = cells.get(&schema.measurement_column).cloned().unwrap_or_default();
        let value = cells.get(&schema.value_column).cloned().unwrap_or_default();
        records.push(ActivityRecord { row: row_idx,
                                      join_key: if key.is_empty() { None } else { Some(key) },
                                      measurement_type,
                                      value,
                                      cells });
    }

    Ok(ActivityTable { header_row,
                       columns: columns.into_iter().collect(),
                       records })
}

/// Localiza el encabezado según el esquema y normaliza la tabla.
pub fn read_activity(grid: &[Vec<String>], schema: &ActivitySchema) -> Result<ActivityTable, DomainError> {
    let header_row = locate_header(grid, &schema.header_label, schema.header_match)?;
    normalize_activity(grid, header_row, schema)
}

/// Tipos de medida distintos y no vacíos, ordenados.
pub fn parameter_options(table: &ActivityTable) -> Vec<String> {
    table.records
         .iter()
         .map(|r| r.measurement_type.as_str())
         .filter(|m| !m.is_empty())
         .collect::<BTreeSet<_>>()
         .into_iter()
         .map(str::to_string)
         .collect()
}

/// `IC50` si está entre las opciones; si no, la primera opción.
pub fn default_parameter(options: &[String]) -> Option<&str> {
    options.iter()
           .find(|o| o.as_str() == DEFAULT_PARAMETER)
           .or_else(|| options.first())
           .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MatchMode;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
    }

    fn sample() -> Grid {
        grid(&[&["CAS BioFinder export", "", ""],
               &["", "", ""],
               &["Ligand CAS RN", "Parameter", "Value"],
               &[" 50-78-2 ", "IC50", "1.2"],
               &["", "", ""],
               &["58-08-2", "Ki", "3"]])
    }

    #[test]
    fn header_after_preamble() {
        let g = sample();
        assert_eq!(locate_header(&g, "Ligand CAS RN", HeaderMatch::default()).unwrap(), 2);
        let t = normalize_activity(&g, 2, &ActivitySchema::default()).unwrap();
        assert_eq!(t.columns, vec!["Ligand CAS RN", "Parameter", "Value"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.records[0].join_key.as_deref(), Some("50-78-2"));
        assert_eq!(t.records[1].row, 5);
    }

    #[test]
    fn header_not_found() {
        let g = grid(&[&["CAS", "Parameter", "Value"], &["x", "IC50", "1"]]);
        let err = locate_header(&g, "Ligand CAS RN", HeaderMatch::default()).unwrap_err();
        assert!(matches!(err, DomainError::HeaderNotFound { .. }));
        assert!(matches!(locate_header(&[], "Ligand CAS RN", HeaderMatch::default()),
                         Err(DomainError::HeaderNotFound { .. })));
    }

    #[test]
    fn contains_vs_exact_header_rule() {
        let g = grid(&[&["Notes on Ligand CAS RN values"], &["Ligand CAS RN", "Parameter", "Value"]]);
        assert_eq!(locate_header(&g, "Ligand CAS RN", HeaderMatch::default()).unwrap(), 0);
        let exact = HeaderMatch { mode: MatchMode::Exact,
                                  case_sensitive: true };
        assert_eq!(locate_header(&g, "Ligand CAS RN", exact).unwrap(), 1);
    }

    #[test]
    fn missing_required_columns() {
        let g = grid(&[&["Ligand CAS RN", "Value"], &["1", "2"]]);
        let err = normalize_activity(&g, 0, &ActivitySchema::default()).unwrap_err();
        assert_eq!(err, DomainError::Schema { missing: vec!["Parameter".into()] });
    }

    #[test]
    fn duplicate_and_blank_headers() {
        let g = grid(&[&["Ligand CAS RN", "", "Parameter", "Value", "Parameter"], &["1", "junk", "IC50", "5", "Ki"]]);
        let t = normalize_activity(&g, 0, &ActivitySchema::default()).unwrap();
        assert_eq!(t.columns, vec!["Ligand CAS RN", "Parameter", "Value"]);
        assert_eq!(t.records[0].measurement_type, "Ki");
    }

    #[test]
    fn short_rows_are_padded() {
        let g = grid(&[&["Ligand CAS RN", "Parameter", "Value", "Target"], &["1", "IC50"]]);
        let t = normalize_activity(&g, 0, &ActivitySchema::default()).unwrap();
        assert_eq!(t.records[0].value, "");
        assert_eq!(t.records[0].cell("Target"), "");
    }

    #[test]
    fn options_sorted_with_ic50_default() {
        let t = read_activity(&sample(), &ActivitySchema::default()).unwrap();
        let opts = parameter_options(&t);
        assert_eq!(opts, vec!["IC50", "Ki"]);
        assert_eq!(default_parameter(&opts), Some("IC50"));
        let others = vec!["EC50".to_string(), "Ki".to_string()];
        assert_eq!(default_parameter(&others), Some("EC50"));
        assert_eq!(default_parameter(&[]), None);
    }
}
