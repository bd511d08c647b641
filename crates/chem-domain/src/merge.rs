//! Unión izquierda de estructuras con la actividad agregada.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedTable;
use crate::schema::StructureSchema;
use crate::structure::StructureTable;
use crate::table::TableView;

/// Sufijo para columnas de actividad que chocan con columnas de estructura.
pub const COLLISION_SUFFIX: &str = "_pharm";
/// Sufijo para propiedades SDF que chocan con columnas derivadas (notación,
/// `ID`, `SourceFile`); las derivadas conservan su nombre.
pub const PROPERTY_SUFFIX: &str = "_sdf";
pub const ID_COLUMN: &str = "ID";
pub const SOURCE_COLUMN: &str = "SourceFile";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Antepone las columnas `ID` y `SourceFile`.
    pub include_provenance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRow {
    pub join_key: Option<String>,
    /// `true` si la clave encontró fila de actividad.
    pub matched: bool,
    /// Celdas alineadas con `MergedTable::columns`.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedTable {
    pub columns: Vec<String>,
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r.cells[idx].as_str())
    }

    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.matched).count()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TableView for MergedTable {
    fn header(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn records(&self) -> Box<dyn Iterator<Item = Vec<String>> + '_> {
        Box::new(self.rows.iter().map(|r| r.cells.clone()))
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn disambiguate(name: &str, taken: &IndexSet<String>, suffix: &str) -> String {
    let mut candidate = name.to_string();
    while taken.contains(&candidate) {
        candidate.push_str(suffix);
    }
    candidate
}

/// Une cada registro de estructura con la fila agregada de su clave.
///
/// Exactamente una fila de salida por registro, en el mismo orden. Sin
/// coincidencia (o sin clave) las columnas de actividad quedan vacías. Con
/// `aggregated == None` la salida solo tiene columnas de estructura.
pub fn merge_tables(structures: &StructureTable,
                    aggregated: Option<&AggregatedTable>,
                    schema: &StructureSchema,
                    options: MergeOptions)
                    -> MergedTable {
    let mut derived: IndexSet<String> = IndexSet::new();
    if options.include_provenance {
        derived.insert(ID_COLUMN.to_string());
        derived.insert(SOURCE_COLUMN.to_string());
    }
    derived.insert(schema.notation_column.clone());

    let mut taken: IndexSet<String> = derived.iter().cloned().collect();
    taken.extend(structures.property_columns.iter().cloned());
    let mut columns: Vec<String> = Vec::new();
    if options.include_provenance {
        columns.extend([ID_COLUMN.to_string(), SOURCE_COLUMN.to_string()]);
    }
    for name in &structures.property_columns {
        if derived.contains(name) {
            let renamed = disambiguate(name, &taken, PROPERTY_SUFFIX);
            log::debug!("propiedad SDF {:?} renombrada a {:?}", name, renamed);
            taken.insert(renamed.clone());
            columns.push(renamed);
        } else {
            columns.push(name.clone());
        }
    }
    columns.push(schema.notation_column.clone());

    let activity_columns: Vec<String> = aggregated.map(|a| a.columns.clone()).unwrap_or_default();
    for name in &activity_columns {
        let renamed = disambiguate(name, &taken, COLLISION_SUFFIX);
        if renamed != *name {
            log::debug!("columna de actividad {:?} renombrada a {:?}", name, renamed);
        }
        taken.insert(renamed.clone());
        columns.push(renamed);
    }

    let rows = structures.records
                         .iter()
                         .map(|record| {
                             let mut cells = Vec::with_capacity(columns.len());
                             if options.include_provenance {
                                 cells.push(record.ordinal.to_string());
                                 cells.push(record.source.clone().unwrap_or_default());
                             }
                             for name in &structures.property_columns {
                                 cells.push(record.property(name).unwrap_or("").to_string());
                             }
                             cells.push(record.notation.clone());

                             let hit = match (aggregated, record.join_key.as_deref()) {
                                 (Some(agg), Some(key)) => agg.get(key),
                                 _ => None,
                             };
                             for name in &activity_columns {
                                 let v = hit.and_then(|h| h.values.get(name)).map(String::as_str).unwrap_or("");
                                 cells.push(v.to_string());
                             }
                             MergedRow { join_key: record.join_key.clone(),
                                         matched: hit.is_some(),
                                         cells }
                         })
                         .collect();

    MergedTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::read_activity;
    use crate::aggregate::aggregate_by_key;
    use crate::schema::ActivitySchema;
    use crate::structure::StructureRecord;

    fn record(ordinal: usize, props: &[(&str, &str)], notation: &str) -> StructureRecord {
        let properties: indexmap::IndexMap<String, String> =
            props.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let join_key = properties.get("cas.rn").map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        StructureRecord { ordinal,
                          source: Some("lig.sdf".into()),
                          properties,
                          notation: notation.into(),
                          join_key }
    }

    fn structures() -> StructureTable {
        StructureTable { records: vec![record(1, &[("cas.rn", "50-78-2"), ("Value", "sdf")], "CC(=O)O"),
                                       record(2, &[("cas.rn", "0-00-0")], "C"),
                                       record(3, &[], "O")],
                         property_columns: vec!["cas.rn".into(), "Value".into()] }
    }

    fn aggregated() -> AggregatedTable {
        let grid: Vec<Vec<String>> = [["Ligand CAS RN", "Parameter", "Value"], ["50-78-2", "IC50", "1.2"]].iter()
                                                                                                           .map(|r| r.iter().map(|c| c.to_string()).collect())
                                                                                                           .collect();
        aggregate_by_key(&read_activity(&grid, &ActivitySchema::default()).unwrap())
    }

    #[test]
    fn left_join_preserves_rows_and_suffixes_collisions() {
        let agg = aggregated();
        let m = merge_tables(&structures(), Some(&agg), &StructureSchema::default(), MergeOptions::default());
        assert_eq!(m.columns,
                   vec!["cas.rn", "Value", "SMILES", "Ligand CAS RN", "Parameter", "Value_pharm"]);
        assert_eq!(m.len(), 3);
        assert_eq!(m.value(0, "Value"), Some("sdf"));
        assert_eq!(m.value(0, "Value_pharm"), Some("1.2"));
        assert_eq!(m.value(1, "Parameter"), Some(""));
        assert_eq!(m.value(2, "cas.rn"), Some(""));
        assert_eq!(m.matched_count(), 1);
    }

    #[test]
    fn without_activity_only_structure_columns() {
        let m = merge_tables(&structures(), None, &StructureSchema::default(), MergeOptions::default());
        assert_eq!(m.columns, vec!["cas.rn", "Value", "SMILES"]);
        assert_eq!(m.value(0, "SMILES"), Some("CC(=O)O"));
    }

    #[test]
    fn provenance_columns_lead() {
        let m = merge_tables(&structures(),
                             None,
                             &StructureSchema::default(),
                             MergeOptions { include_provenance: true });
        assert_eq!(m.columns[..2], ["ID".to_string(), "SourceFile".to_string()]);
        assert_eq!(m.value(2, "ID"), Some("3"));
        assert_eq!(m.value(2, "SourceFile"), Some("lig.sdf"));
    }

    #[test]
    fn derived_columns_keep_their_names() {
        let s = StructureTable { records: vec![record(1, &[("cas.rn", "50-78-2"), ("SMILES", "from-sdf"), ("ID", "L-1")], "CC(=O)O")],
                                 property_columns: vec!["cas.rn".into(), "SMILES".into(), "ID".into()] };
        let agg = aggregated();
        let m = merge_tables(&s, Some(&agg), &StructureSchema::default(), MergeOptions { include_provenance: true });
        assert_eq!(m.columns,
                   vec!["ID", "SourceFile", "cas.rn", "SMILES_sdf", "ID_sdf", "SMILES", "Ligand CAS RN", "Parameter", "Value"]);
        assert_eq!(m.value(0, "SMILES"), Some("CC(=O)O"));
        assert_eq!(m.value(0, "SMILES_sdf"), Some("from-sdf"));
        assert_eq!(m.value(0, "ID"), Some("1"));
        assert_eq!(m.value(0, "ID_sdf"), Some("L-1"));
        assert_eq!(m.value(0, "Value"), Some("1.2"));
    }
}
