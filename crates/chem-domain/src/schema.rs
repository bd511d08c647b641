//! Nombres de columnas y reglas de coincidencia que parametrizan la fusión.
//!
//! Los valores por defecto corresponden a las exportaciones de CAS BioFinder:
//! `cas.rn` / `cas.index.name` en el SDF y `Ligand CAS RN` / `Parameter` /
//! `Value` en la planilla de farmacología.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSchema {
    /// Propiedad del SDF que actúa como clave de unión.
    pub join_key_property: String,
    /// Propiedad con el nombre del ligando (segunda columna de la tabla por
    /// parámetro).
    pub name_property: String,
    /// Nombre de la columna con la notación derivada de la estructura.
    pub notation_column: String,
}

impl Default for StructureSchema {
    fn default() -> Self {
        Self { join_key_property: "cas.rn".into(),
               name_property: "cas.index.name".into(),
               notation_column: "SMILES".into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MatchMode {
    /// La celda (recortada) contiene la etiqueta.
    #[default]
    Contains,
    /// La celda (recortada) es igual a la etiqueta.
    Exact,
}

/// Regla explícita para ubicar la fila de encabezado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub mode: MatchMode,
    pub case_sensitive: bool,
}

impl Default for HeaderMatch {
    fn default() -> Self {
        Self { mode: MatchMode::Contains,
               case_sensitive: true }
    }
}

impl HeaderMatch {
    pub fn matches(&self, cell: &str, label: &str) -> bool {
        let cell = cell.trim();
        if label.is_empty() || cell.is_empty() {
            return false;
        }
        let (cell, label) = if self.case_sensitive {
            (cell.to_string(), label.to_string())
        } else {
            (cell.to_lowercase(), label.to_lowercase())
        };
        match self.mode {
            MatchMode::Contains => cell.contains(&label),
            MatchMode::Exact => cell == label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySchema {
    /// Etiqueta que identifica la fila de encabezado.
    pub header_label: String,
    pub header_match: HeaderMatch,
    /// Columna con la clave de unión (coincidencia exacta con el encabezado).
    pub join_key_column: String,
    pub measurement_column: String,
    pub value_column: String,
}

impl Default for ActivitySchema {
    fn default() -> Self {
        Self { header_label: "Ligand CAS RN".into(),
               header_match: HeaderMatch::default(),
               join_key_column: "Ligand CAS RN".into(),
               measurement_column: "Parameter".into(),
               value_column: "Value".into() }
    }
}
