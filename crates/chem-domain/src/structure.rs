//! Extracción de registros de estructura a partir de bloques SDF.

use chemengine::{ParseFailure, StructureBlock, StructureParser};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::schema::StructureSchema;

/// Un registro de estructura interpretado correctamente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRecord {
    /// Posición (1-based) entre los registros interpretados del lote.
    pub ordinal: usize,
    /// Archivo de origen, si se conoce.
    pub source: Option<String>,
    /// Propiedades del bloque en orden de aparición.
    pub properties: IndexMap<String, String>,
    /// Notación derivada por el parser.
    pub notation: String,
    /// Valor recortado de la propiedad clave; `None` si falta o queda vacío.
    pub join_key: Option<String>,
}

impl StructureRecord {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

/// Registros interpretados más la unión ordenada de sus propiedades.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureTable {
    pub records: Vec<StructureRecord>,
    /// Unión de nombres de propiedad en orden de primera aparición.
    pub property_columns: Vec<String>,
}

impl StructureTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Bloque descartado porque el parser no pudo interpretarlo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    /// Posición (0-based) del bloque dentro de su archivo.
    pub index: usize,
    pub source: Option<String>,
    pub title: String,
    pub reason: ParseFailure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureExtraction {
    pub table: StructureTable,
    pub skipped: Vec<SkippedBlock>,
}

impl StructureExtraction {
    pub fn parsed_count(&self) -> usize {
        self.table.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Convierte los bloques de un lote (posiblemente de varios archivos) en
/// registros de estructura.
///
/// Los bloques que el parser rechaza se omiten sin abortar: no aportan filas
/// ni columnas, y quedan contados en `skipped`.
pub fn extract_structures<P>(blocks: &[StructureBlock], parser: &P, schema: &StructureSchema) -> StructureExtraction
    where P: StructureParser + ?Sized
{
    let mut records = Vec::new();
    let mut columns: IndexSet<String> = IndexSet::new();
    let mut skipped = Vec::new();

    for block in blocks {
        match parser.parse(block) {
            Ok(parsed) => {
                for name in block.properties.keys() {
                    if !columns.contains(name) {
                        columns.insert(name.clone());
                    }
                }
                let join_key = block.properties
                                    .get(&schema.join_key_property)
                                    .map(|v| v.trim())
                                    .filter(|v| !v.is_empty())
                                    .map(str::to_string);
                records.push(StructureRecord { ordinal: records.len() + 1,
                                               source: block.source.clone(),
                                               properties: block.properties.clone(),
                                               notation: parsed.notation,
                                               join_key });
            }
            Err(reason) => {
                log::warn!("registro {} ({}) omitido: {}",
                           block.index,
                           block.source.as_deref().unwrap_or("<sin archivo>"),
                           reason);
                skipped.push(SkippedBlock { index: block.index,
                                            source: block.source.clone(),
                                            title: block.title.clone(),
                                            reason });
            }
        }
    }

    log::debug!("extracción con parser {}: {} registros, {} omitidos",
                parser.name(),
                records.len(),
                skipped.len());

    StructureExtraction { table: StructureTable { records,
                                                  property_columns: columns.into_iter().collect() },
                          skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemengine::ParsedStructure;

    /// Parser de prueba: acepta todo salvo títulos que empiezan con "bad".
    struct TitleParser;

    impl StructureParser for TitleParser {
        fn name(&self) -> &str {
            "title"
        }

        fn parse(&self, block: &StructureBlock) -> Result<ParsedStructure, ParseFailure> {
            if block.title.starts_with("bad") {
                return Err(ParseFailure::NoAtoms);
            }
            Ok(ParsedStructure { notation: format!("N:{}", block.title),
                                 num_atoms: 1 })
        }
    }

    fn block(index: usize, title: &str, props: &[(&str, &str)]) -> StructureBlock {
        StructureBlock { index,
                         source: Some("a.sdf".into()),
                         title: title.into(),
                         molblock: String::new(),
                         properties: props.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() }
    }

    #[test]
    fn union_of_properties_in_first_seen_order() {
        let blocks = vec![block(0, "m1", &[("cas.rn", "50-78-2"), ("name", "aspirin")]),
                          block(1, "m2", &[("extra", "x"), ("cas.rn", " 58-08-2 ")])];
        let out = extract_structures(&blocks, &TitleParser, &StructureSchema::default());
        assert_eq!(out.table.property_columns, vec!["cas.rn", "name", "extra"]);
        assert_eq!(out.table.records[1].join_key.as_deref(), Some("58-08-2"));
        assert_eq!(out.table.records[1].ordinal, 2);
        assert_eq!(out.table.records[0].notation, "N:m1");
    }

    #[test]
    fn unparseable_blocks_add_no_rows_nor_columns() {
        let blocks = vec![block(0, "m1", &[("cas.rn", "50-78-2")]),
                          block(1, "bad", &[("only_in_bad", "1")]),
                          block(2, "m3", &[("cas.rn", "")])];
        let out = extract_structures(&blocks, &TitleParser, &StructureSchema::default());
        assert_eq!(out.parsed_count(), 2);
        assert_eq!(out.skipped_count(), 1);
        assert_eq!(out.skipped[0].reason, ParseFailure::NoAtoms);
        assert_eq!(out.table.property_columns, vec!["cas.rn"]);
        assert_eq!(out.table.records[1].join_key, None);
    }
}
