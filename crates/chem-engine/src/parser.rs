use serde::{Deserialize, Serialize};

use crate::error::ParseFailure;
use crate::molfile::parse_molblock;
use crate::sdf::StructureBlock;
use crate::smiles::write_smiles;

/// Resultado de interpretar la estructura de un bloque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStructure {
    /// Notación lineal (SMILES) derivada del grafo.
    pub notation: String,
    pub num_atoms: usize,
}

/// Capacidad `parse(block) -> (notación) | ParseFailure` que consume el
/// extractor de registros. Las implementaciones no deben mutar el bloque.
pub trait StructureParser {
    /// Nombre estable del backend (se registra en el log de la corrida).
    fn name(&self) -> &str;

    fn parse(&self, block: &StructureBlock) -> Result<ParsedStructure, ParseFailure>;
}

/// Backend nativo: molfile V2000 -> SMILES determinista.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeParser;

impl StructureParser for NativeParser {
    fn name(&self) -> &str {
        "native"
    }

    fn parse(&self, block: &StructureBlock) -> Result<ParsedStructure, ParseFailure> {
        let graph = parse_molblock(&block.molblock)?;
        Ok(ParsedStructure { notation: write_smiles(&graph),
                             num_atoms: graph.atoms.len() })
    }
}
