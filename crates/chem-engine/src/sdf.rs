//! Partición de texto SDF en bloques (molfile + ítems de datos).
//!
//! Un archivo SDF es una secuencia de registros separados por `$$$$`. Cada
//! registro trae el molfile (hasta `M  END`) seguido de ítems de datos con la
//! forma:
//!
//! ```text
//! > <cas.rn>
//! 100-01-1
//!
//! ```
//!
//! Este módulo no interpreta la estructura; sólo separa el molfile opaco de
//! las propiedades, que se guardan en orden de aparición.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const RECORD_END: &str = "$$$$";
const MOL_END: &str = "M  END";

/// Bloque crudo de un archivo SDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureBlock {
    /// Posición (base 0) del bloque dentro de su archivo.
    pub index: usize,
    /// Archivo de origen, si se conoce.
    pub source: Option<String>,
    /// Primera línea del molfile.
    pub title: String,
    /// Molfile tal cual, incluyendo `M  END`.
    pub molblock: String,
    /// Ítems de datos `nombre -> valor`. Si un nombre se repite gana el último
    /// valor y se conserva la primera posición.
    pub properties: IndexMap<String, String>,
}

/// Divide el texto de un archivo SDF en bloques.
///
/// Los bloques vacíos (sólo espacios) se ignoran. Un último registro sin
/// `$$$$` final se acepta igualmente.
pub fn split_sdf(text: &str, source: Option<&str>) -> Vec<StructureBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end_matches('\r');
        if line.trim_end() == RECORD_END {
            push_block(&mut blocks, &current, source);
            current.clear();
        } else {
            current.push(line);
        }
    }
    push_block(&mut blocks, &current, source);
    blocks
}

fn push_block(blocks: &mut Vec<StructureBlock>, lines: &[&str], source: Option<&str>) {
    if lines.iter().all(|l| l.trim().is_empty()) {
        return;
    }
    let index = blocks.len();
    blocks.push(parse_block(index, lines, source));
}

fn parse_block(index: usize, lines: &[&str], source: Option<&str>) -> StructureBlock {
    // El molfile termina en `M  END`; sin él, en el primer encabezado de datos.
    let mol_end = match lines.iter().position(|l| l.trim_end() == MOL_END) {
        Some(pos) => pos + 1,
        None => lines.iter().position(|l| data_header(l).is_some()).unwrap_or(lines.len()),
    };

    let molblock = lines[..mol_end].join("\n");
    let title = lines.first().map(|l| l.trim().to_string()).unwrap_or_default();
    let properties = parse_data_items(&lines[mol_end..]);

    StructureBlock { index,
                     source: source.map(str::to_string),
                     title,
                     molblock,
                     properties }
}

/// Extrae el nombre de un encabezado `> <nombre>` (admite texto extra tras
/// el cierre, p. ej. `>  <IC50>  (MD-08974)`).
fn data_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?;
    let open = rest.find('<')?;
    let close = rest[open + 1..].find('>')?;
    Some(&rest[open + 1..open + 1 + close])
}

fn parse_data_items(lines: &[&str]) -> IndexMap<String, String> {
    let mut items = IndexMap::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(name) = data_header(lines[i]) else {
            i += 1;
            continue;
        };
        i += 1;
        let mut values: Vec<&str> = Vec::new();
        while i < lines.len() {
            let value = lines[i].trim_end();
            if value.is_empty() || data_header(value).is_some() {
                break;
            }
            values.push(value);
            i += 1;
        }
        items.insert(name.to_string(), values.join("\n"));
    }
    items
}
