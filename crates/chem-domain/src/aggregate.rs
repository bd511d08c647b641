//! Colapso de la tabla de actividad a una fila por clave.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::activity::ActivityTable;

/// Separador entre valores agregados de una misma columna.
pub const AGGREGATE_SEPARATOR: &str = "|";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedActivity {
    pub join_key: String,
    /// Valores concatenados por columna, en el orden de `AggregatedTable::columns`.
    pub values: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedTable {
    pub columns: Vec<String>,
    /// Una fila por clave, en orden de primera aparición.
    pub rows: Vec<AggregatedActivity>,
    /// Valores crudos que ya contenían el separador.
    pub ambiguous_values: usize,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl AggregatedTable {
    pub fn get(&self, join_key: &str) -> Option<&AggregatedActivity> {
        self.index.get(join_key).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Agrupa los registros por clave y concatena, para cada columna, los valores
/// no vacíos en orden de fila con `|`. No se eliminan duplicados.
///
/// Los registros sin clave no participan.
pub fn aggregate_by_key(table: &ActivityTable) -> AggregatedTable {
    let mut groups: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (i, record) in table.records.iter().enumerate() {
        if let Some(key) = record.join_key.as_deref() {
            groups.entry(key).or_default().push(i);
        }
    }

    let mut ambiguous_values = 0;
    let mut rows = Vec::with_capacity(groups.len());
    let mut index = HashMap::with_capacity(groups.len());

    for (key, members) in &groups {
        let mut values = IndexMap::with_capacity(table.columns.len());
        for column in &table.columns {
            let parts: Vec<&str> = members.iter()
                                          .map(|&i| table.records[i].cell(column))
                                          .filter(|v| !v.is_empty())
                                          .collect();
            ambiguous_values += parts.iter().filter(|v| v.contains(AGGREGATE_SEPARATOR)).count();
            values.insert(column.clone(), parts.join(AGGREGATE_SEPARATOR));
        }
        index.insert(key.to_string(), rows.len());
        rows.push(AggregatedActivity { join_key: key.to_string(),
                                       values });
    }

    if ambiguous_values > 0 {
        log::warn!("{} valores de actividad ya contienen '{}'; la agregación es ambigua para ellos",
                   ambiguous_values,
                   AGGREGATE_SEPARATOR);
    }

    AggregatedTable { columns: table.columns.clone(),
                      rows,
                      ambiguous_values,
                      index }
}

/// Valores de un único tipo de medida unidos con `|` por clave, en orden de
/// primera aparición de la clave.
pub fn aggregate_parameter(table: &ActivityTable, parameter: &str) -> IndexMap<String, String> {
    let parameter = parameter.trim();
    let mut out: IndexMap<String, Vec<&str>> = IndexMap::new();
    for record in &table.records {
        let Some(key) = record.join_key.as_deref() else {
            continue;
        };
        if record.measurement_type == parameter && !record.value.is_empty() {
            out.entry(key.to_string()).or_default().push(&record.value);
        }
    }
    out.into_iter().map(|(k, v)| (k, v.join(AGGREGATE_SEPARATOR))).collect()
}
