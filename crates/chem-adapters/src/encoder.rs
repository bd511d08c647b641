//! Encoders de tablas de dominio a bytes de salida.
//!
//! - El contenido debe ser estable: mismo `TableView` produce los mismos
//!   bytes, para que los hashes del manifiesto sean reproducibles.
//! - El fingerprint de una tabla se calcula sobre su JSON canónico
//!   (encabezado + filas), independiente del formato de salida.

use chem_core::hashing::hash_value;
use chem_domain::TableView;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::error::AdapterError;

/// Contrato de serialización de tablas.
pub trait TableEncoder {
    fn encode(&self, table: &dyn TableView) -> Result<Vec<u8>, AdapterError>;
    /// Extensión (sin punto) del formato producido.
    fn extension(&self) -> &'static str;
}

/// CSV separado por comas, con encabezado; celdas vacías para valores
/// ausentes.
#[derive(Clone, Default)]
pub struct CsvTableEncoder;

impl TableEncoder for CsvTableEncoder {
    fn encode(&self, table: &dyn TableView) -> Result<Vec<u8>, AdapterError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(table.header())?;
        for record in table.records() {
            writer.write_record(&record)?;
        }
        writer.into_inner().map_err(|e| AdapterError::io("<buffer csv>", e.into_error()))
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}

/// Fingerprint blake3 del contenido lógico de la tabla.
pub fn table_fingerprint(table: &dyn TableView) -> String {
    let rows: Vec<Vec<String>> = table.records().collect();
    hash_value(&json!({ "header": table.header(), "rows": rows }))
}

/// SHA-256 hex de bytes ya serializados.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Vec<String>>);

    impl TableView for Fixed {
        fn header(&self) -> Vec<String> {
            vec!["SMILES".into(), "Value".into()]
        }

        fn records(&self) -> Box<dyn Iterator<Item = Vec<String>> + '_> {
            Box::new(self.0.iter().cloned())
        }

        fn row_count(&self) -> usize {
            self.0.len()
        }
    }

    #[test]
    fn csv_quotes_when_needed() {
        let t = Fixed(vec![vec!["C,C".into(), "5|7".into()], vec!["O".into(), "".into()]]);
        let out = String::from_utf8(CsvTableEncoder.encode(&t).unwrap()).unwrap();
        assert_eq!(out, "SMILES,Value\n\"C,C\",5|7\nO,\n");
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = Fixed(vec![vec!["C".into(), "1".into()]]);
        let b = Fixed(vec![vec!["C".into(), "2".into()]]);
        assert_eq!(table_fingerprint(&a), table_fingerprint(&Fixed(vec![vec!["C".into(), "1".into()]])));
        assert_ne!(table_fingerprint(&a), table_fingerprint(&b));
        assert_eq!(sha256_hex(b"").len(), 64);
    }
}
