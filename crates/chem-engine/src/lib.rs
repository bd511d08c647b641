//! chemengine: caja negra de estructuras químicas.
//!
//! - `sdf`: partición de archivos SDF en bloques (molfile + propiedades).
//! - `molfile` / `smiles`: backend nativo V2000 -> SMILES.
//! - `core` (feature `rdkit`): backend RDKit embebido vía pyo3.
//!
//! `ChemEngine` elige el backend en tiempo de ejecución y expone la interfaz
//! común `StructureParser`.

pub mod error;
pub mod molfile;
pub mod parser;
pub mod sdf;
pub mod smiles;

#[cfg(feature = "rdkit")]
pub mod core;

pub use error::{EngineError, ParseFailure};
pub use parser::{NativeParser, ParsedStructure, StructureParser};
pub use sdf::{split_sdf, StructureBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Native,
    #[cfg(feature = "rdkit")]
    Rdkit,
}

pub struct ChemEngine {
    backend: Backend,
}

impl ChemEngine {
    pub fn native() -> Self {
        Self { backend: Backend::Native }
    }

    #[cfg(feature = "rdkit")]
    pub fn rdkit() -> Result<Self, EngineError> {
        core::init_python().map_err(EngineError::Init)?;
        log::info!("backend RDKit inicializado");
        Ok(Self { backend: Backend::Rdkit })
    }

    /// Construye el engine a partir del nombre configurado (`native` | `rdkit`).
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "native" => Ok(Self::native()),
            #[cfg(feature = "rdkit")]
            "rdkit" => Self::rdkit(),
            #[cfg(not(feature = "rdkit"))]
            "rdkit" => Err(EngineError::BackendUnavailable("rdkit (compilar con --features rdkit)".into())),
            other => Err(EngineError::UnknownBackend(other.to_string())),
        }
    }
}

impl StructureParser for ChemEngine {
    fn name(&self) -> &str {
        match self.backend {
            Backend::Native => NativeParser.name(),
            #[cfg(feature = "rdkit")]
            Backend::Rdkit => "rdkit",
        }
    }

    fn parse(&self, block: &StructureBlock) -> Result<ParsedStructure, ParseFailure> {
        match self.backend {
            Backend::Native => NativeParser.parse(block),
            #[cfg(feature = "rdkit")]
            Backend::Rdkit => match core::molblock_info(&block.molblock) {
                Ok(Some(m)) => Ok(ParsedStructure { notation: m.smiles,
                                                    num_atoms: m.num_atoms }),
                Ok(None) => Err(ParseFailure::Rejected("RDKit no pudo sanitizar la molécula".into())),
                Err(e) => Err(ParseFailure::Rejected(e.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_name() {
        assert_eq!(ChemEngine::from_name("native").unwrap().name(), "native");
        assert_eq!(ChemEngine::from_name("").unwrap().name(), "native");
        assert!(matches!(ChemEngine::from_name("openbabel"), Err(EngineError::UnknownBackend(_))));
    }

    #[cfg(not(feature = "rdkit"))]
    #[test]
    fn test_rdkit_requires_feature() {
        assert!(matches!(ChemEngine::from_name("rdkit"), Err(EngineError::BackendUnavailable(_))));
    }
}
