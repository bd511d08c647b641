use chem_pharm_merge::chem_adapters::encoder::{CsvTableEncoder, TableEncoder};
use chem_pharm_merge::chem_core::RunEventKind;
use chem_pharm_merge::{merge_texts, run_batch, BatchInput, MergeConfig};

fn molfile(title: &str, elements: &[&str], bonds: &[(usize, usize, u8)]) -> String {
    let mut out = format!("{title}\n  test\n\n{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000\n",
                          elements.len(),
                          bonds.len());
    for el in elements {
        out.push_str(&format!("    0.0000    0.0000    0.0000 {:<3} 0  0  0  0  0  0  0  0  0  0  0  0\n", el));
    }
    for (a, b, order) in bonds {
        out.push_str(&format!("{:>3}{:>3}{:>3}  0\n", a, b, order));
    }
    out.push_str("M  END\n");
    out
}

fn entry(title: &str, elements: &[&str], bonds: &[(usize, usize, u8)], props: &[(&str, &str)]) -> String {
    let mut out = molfile(title, elements, bonds);
    for (k, v) in props {
        out.push_str(&format!("> <{k}>\n{v}\n\n"));
    }
    out.push_str("$$$$\n");
    out
}

fn library() -> (String, String) {
    let first = [entry("ethanol", &["C", "C", "O"], &[(1, 2, 1), (2, 3, 1)], &[("cas.rn", "64-17-5"), ("cas.index.name", "Ethanol")]),
                 entry("nothing", &[], &[], &[("cas.rn", "7732-18-5")]),
                 entry("acetone",
                       &["C", "C", "O", "C"],
                       &[(1, 2, 1), (2, 3, 2), (2, 4, 1)],
                       &[("cas.index.name", "Acetone"), ("cas.rn", " 67-64-1 "), ("MW", "58.08")])].concat();
    let second = [entry("no key", &["N"], &[], &[("cas.index.name", "Ammonia")]),
                  entry("ethanol again", &["C", "C", "O"], &[(1, 2, 1), (2, 3, 1)], &[("cas.rn", "64-17-5")])].concat();
    (first, second)
}

const ACTIVITY: &str = "\
Pharmacology export,,,
Ligand CAS RN,Parameter,Value,Target
64-17-5,IC50,12,GABA-A
67-64-1,Ki,3,
64-17-5,IC50,15,
64-17-5,Ki,,NMDA
1-2-3,IC50,99,Orphan
";

#[test]
fn full_run_over_two_files() {
    let (a, b) = library();
    let out = merge_texts(&[("a.sdf", a.as_str()), ("b.sdf", b.as_str())], Some(ACTIVITY), None, &MergeConfig::default()).unwrap();
    let r = &out.report;

    assert_eq!(r.parsed, 4);
    assert_eq!(r.skipped, 1);
    assert_eq!(r.header_row, Some(1));
    assert_eq!(out.merged.len(), r.parsed);
    assert_eq!(out.merged.columns,
               vec!["cas.rn", "cas.index.name", "MW", "SMILES", "Ligand CAS RN", "Parameter", "Value", "Target"]);

    // orden de carga: a.sdf y luego b.sdf
    assert_eq!(out.merged.value(0, "SMILES"), Some("CCO"));
    assert_eq!(out.merged.value(1, "SMILES"), Some("CC(=O)C"));
    assert_eq!(out.merged.value(2, "SMILES"), Some("N"));

    assert_eq!(out.merged.value(0, "Parameter"), Some("IC50|IC50|Ki"));
    assert_eq!(out.merged.value(0, "Value"), Some("12|15"));
    assert_eq!(out.merged.value(0, "Target"), Some("GABA-A|NMDA"));
    assert_eq!(out.merged.value(1, "Value"), Some("3"));
    assert_eq!(out.merged.value(2, "Value"), Some(""));
    assert_eq!(out.merged.value(3, "Value"), out.merged.value(0, "Value"));

    let ic50 = out.parameter.as_ref().unwrap();
    assert_eq!(ic50.parameter, "IC50");
    let values: Vec<&str> = ic50.rows.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, vec!["12", "15", "12", "15"]);
    assert!(ic50.rows.iter().all(|r| r.measurement_type == "IC50" && !r.value.is_empty()));
    assert!(ic50.rows.iter().all(|r| r.join_key != "1-2-3"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let (a, b) = library();
    let sdf = [("a.sdf", a.as_str()), ("b.sdf", b.as_str())];
    let cfg = MergeConfig::default();
    let first = merge_texts(&sdf, Some(ACTIVITY), Some("Ki"), &cfg).unwrap();
    let second = merge_texts(&sdf, Some(ACTIVITY), Some("Ki"), &cfg).unwrap();

    let enc = CsvTableEncoder;
    assert_eq!(enc.encode(&first.merged).unwrap(), enc.encode(&second.merged).unwrap());
    let (p1, p2) = (first.parameter.unwrap(), second.parameter.unwrap());
    assert_eq!(enc.encode(&p1).unwrap(), enc.encode(&p2).unwrap());
    assert_eq!(first.report.run_fingerprint, second.report.run_fingerprint);
}

#[test]
fn broken_activity_still_yields_structures() {
    let (a, _) = library();
    let out = merge_texts(&[("a.sdf", a.as_str())], Some("nothing,useful\n1,2\n"), None, &MergeConfig::default()).unwrap();
    assert_eq!(out.merged.len(), 2);
    assert!(out.parameter.is_none());
    assert!(out.report.activity_error.is_some());
    let kinds: Vec<&RunEventKind> = out.events.iter().map(|e| &e.kind).collect();
    assert!(kinds.iter().any(|k| matches!(k, RunEventKind::ActivityUnavailable { .. })));
    assert!(kinds.iter().any(|k| matches!(k, RunEventKind::ParameterSkipped { .. })));
    let seqs: Vec<u64> = out.events.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (0..out.events.len() as u64).collect::<Vec<_>>());
}

#[test]
fn empty_inputs_produce_empty_tables() {
    let out = merge_texts(&[], Some(""), None, &MergeConfig::default()).unwrap();
    assert!(out.merged.is_empty());
    assert_eq!(out.report.parsed, 0);
    assert!(out.report.activity_error.is_some());
}

#[test]
fn unknown_backend_is_rejected() {
    let cfg = MergeConfig { backend: "openbabel".into(),
                            ..MergeConfig::default() };
    assert!(merge_texts(&[], None, None, &cfg).is_err());
}

#[test]
fn batch_run_through_files_matches_in_memory_run() {
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = library();
    let a_path = dir.path().join("a.sdf");
    let b_path = dir.path().join("b.sdf");
    let csv_path = dir.path().join("pharm.csv");
    std::fs::write(&a_path, &a).unwrap();
    std::fs::write(&b_path, &b).unwrap();
    std::fs::write(&csv_path, ACTIVITY).unwrap();

    let cfg = MergeConfig::default();
    let input = BatchInput { sdf_files: vec![a_path, b_path],
                             activity_file: Some(csv_path),
                             parameter: None };
    let batch = run_batch(&input, &cfg, &dir.path().join("out")).unwrap();
    let memory = merge_texts(&[("a.sdf", a.as_str()), ("b.sdf", b.as_str())], Some(ACTIVITY), None, &cfg).unwrap();

    let enc = CsvTableEncoder;
    assert_eq!(std::fs::read(&batch.written[0]).unwrap(), enc.encode(&memory.merged).unwrap());
    assert!(batch.written[1].ends_with("a_and_others_IC50_summary.csv"));

    let manifest: serde_json::Value = serde_json::from_slice(&std::fs::read(&batch.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["prefix"], "a_and_others");
    assert_eq!(manifest["report"]["parsed"], 4);
    assert_eq!(manifest["report"]["selected_parameter"], "IC50");
    assert_eq!(manifest["files"].as_array().map(Vec::len), Some(2));
}
