//! Convenciones de nombres de las salidas.

use std::path::Path;

pub const MERGED_SUFFIX: &str = "_Ligands_with_Pharmacology_aggregated_by_CAS";
pub const MANIFEST_SUFFIX: &str = "_run_manifest.json";

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// Prefijo de salida: nombre base del primer archivo, con `_and_others` si
/// hay más de uno. Los espacios pasan a `_`.
pub fn derive_prefix<P: AsRef<Path>>(files: &[P]) -> String {
    let Some(first) = files.first() else {
        return "output".to_string();
    };
    let path = first.as_ref();
    let stem = path.file_stem()
                   .map(|s| s.to_string_lossy().into_owned())
                   .unwrap_or_else(|| "output".to_string());
    let base = if files.len() > 1 { format!("{stem}_and_others") } else { stem };
    sanitize(&base)
}

/// `extension` va sin punto; la aporta el encoder usado.
pub fn merged_file_name(prefix: &str, extension: &str) -> String {
    format!("{prefix}{MERGED_SUFFIX}.{extension}")
}

pub fn parameter_file_name(prefix: &str, parameter: &str, extension: &str) -> String {
    format!("{prefix}_{}_summary.{extension}", sanitize(parameter))
}

pub fn manifest_file_name(prefix: &str) -> String {
    format!("{prefix}{MANIFEST_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_rules() {
        assert_eq!(derive_prefix(&["data/My Ligands.sdf"]), "My_Ligands");
        assert_eq!(derive_prefix(&["a b.sdf", "c.sdf"]), "a_b_and_others");
        assert_eq!(derive_prefix::<&str>(&[]), "output");
    }

    #[test]
    fn file_names() {
        assert_eq!(merged_file_name("lig", "csv"), "lig_Ligands_with_Pharmacology_aggregated_by_CAS.csv");
        assert_eq!(parameter_file_name("lig", "IC50", "csv"), "lig_IC50_summary.csv");
        assert_eq!(parameter_file_name("lig", "% inhibition", "csv"), "lig_%_inhibition_summary.csv");
        assert_eq!(manifest_file_name("lig"), "lig_run_manifest.json");
        assert_eq!(merged_file_name("lig", "tsv"), "lig_Ligands_with_Pharmacology_aggregated_by_CAS.tsv");
    }
}
