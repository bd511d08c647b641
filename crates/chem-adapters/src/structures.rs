//! Carga de archivos SDF en una única secuencia de bloques.

use std::path::{Path, PathBuf};

use chemengine::{split_sdf, StructureBlock};

use crate::error::AdapterError;

/// Nombre de archivo usado como origen de cada bloque.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Lee los archivos en el orden recibido y concatena sus bloques.
///
/// Los bytes que no son UTF-8 válido se reemplazan; los nombres de
/// propiedad y los valores de CAS son ASCII en la práctica.
pub fn load_structure_blocks(paths: &[PathBuf]) -> Result<Vec<StructureBlock>, AdapterError> {
    let mut blocks = Vec::new();
    for path in paths {
        let bytes = std::fs::read(path).map_err(|e| AdapterError::io(path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        let source = source_name(path);
        let file_blocks = split_sdf(&text, Some(&source));
        log::info!("{}: {} bloques", source, file_blocks.len());
        blocks.extend(file_blocks);
    }
    Ok(blocks)
}
