//! Tabla larga de un único tipo de medida.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::activity::{ActivityRecord, ActivityTable};
use crate::schema::StructureSchema;
use crate::structure::StructureTable;
use crate::table::TableView;

pub const PARAMETER_COLUMN: &str = "Parameter";
pub const VALUE_COLUMN: &str = "Value";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRow {
    pub notation: String,
    pub ligand_name: String,
    /// Valor de la propiedad clave tal como figura en el SDF.
    pub join_key: String,
    pub measurement_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterTable {
    pub parameter: String,
    pub columns: [String; 5],
    pub rows: Vec<ParameterRow>,
}

impl ParameterTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TableView for ParameterTable {
    fn header(&self) -> Vec<String> {
        self.columns.to_vec()
    }

    fn records(&self) -> Box<dyn Iterator<Item = Vec<String>> + '_> {
        Box::new(self.rows.iter().map(|r| {
                                     vec![r.notation.clone(),
                                          r.ligand_name.clone(),
                                          r.join_key.clone(),
                                          r.measurement_type.clone(),
                                          r.value.clone()]
                                 }))
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Proyecta, para cada registro de estructura con clave, las filas de
/// actividad con ese tipo de medida y un valor no vacío.
///
/// Usa la tabla de actividad sin agregar: cada medición produce su propia
/// fila. El orden sigue a los registros de estructura y, dentro de cada uno,
/// a las filas de actividad. Un parámetro sin filas produce una tabla vacía.
pub fn project_parameter(structures: &StructureTable,
                         activity: &ActivityTable,
                         parameter: &str,
                         schema: &StructureSchema)
                         -> ParameterTable {
    let parameter = parameter.trim();
    let mut by_key: HashMap<&str, Vec<&ActivityRecord>> = HashMap::new();
    for record in &activity.records {
        if record.measurement_type != parameter || record.value.is_empty() {
            continue;
        }
        if let Some(key) = record.join_key.as_deref() {
            by_key.entry(key).or_default().push(record);
        }
    }

    let mut rows = Vec::new();
    for structure in &structures.records {
        let Some(key) = structure.join_key.as_deref() else {
            continue;
        };
        let Some(hits) = by_key.get(key) else {
            continue;
        };
        for hit in hits {
            rows.push(ParameterRow { notation: structure.notation.clone(),
                                     ligand_name: structure.property(&schema.name_property).unwrap_or("").to_string(),
                                     join_key: structure.property(&schema.join_key_property).unwrap_or(key).to_string(),
                                     measurement_type: hit.measurement_type.clone(),
                                     value: hit.value.clone() });
        }
    }

    if rows.is_empty() {
        log::info!("el parámetro {:?} no produjo filas", parameter);
    }

    ParameterTable { parameter: parameter.to_string(),
                     columns: [schema.notation_column.clone(),
                               schema.name_property.clone(),
                               schema.join_key_property.clone(),
                               PARAMETER_COLUMN.to_string(),
                               VALUE_COLUMN.to_string()],
                     rows }
}
