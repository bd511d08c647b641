//! pharm-merge: fusiona ligandos SDF con datos de farmacología por CAS RN.
//!
//! Uso:
//!   pharm-merge merge --sdf ligandos.sdf [--sdf otros.sdf] --activity farmaco.csv [--parameter IC50]
//!   pharm-merge parameters --activity farmaco.csv

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chem_adapters::config::init_dotenv;
use chem_adapters::grid::read_grid;
use chem_adapters::{run_batch, BatchInput, MergeConfig, RunReport};
use chem_domain::{default_parameter, parameter_options, read_activity, MatchMode};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pharm-merge")]
#[command(about = "Fusiona estructuras SDF con actividad farmacológica agregada por CAS RN")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Genera la tabla fusionada, la tabla por parámetro y el manifiesto
    Merge {
        /// Archivo SDF (repetible; se concatenan en el orden dado)
        #[arg(long = "sdf", required = true)]
        sdf: Vec<PathBuf>,

        /// Planilla de actividad exportada a CSV/TSV
        #[arg(long)]
        activity: Option<PathBuf>,

        /// Tipo de medida a proyectar (por defecto IC50 si existe)
        #[arg(long)]
        parameter: Option<String>,

        /// Directorio de salida
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Agrega las columnas ID y SourceFile
        #[arg(long)]
        provenance: bool,

        /// Backend de estructuras (native | rdkit)
        #[arg(long)]
        backend: Option<String>,

        /// Imprime el reporte completo como JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        labels: LabelArgs,
    },

    /// Lista los tipos de medida disponibles en la planilla
    Parameters {
        #[arg(long)]
        activity: PathBuf,

        #[command(flatten)]
        labels: LabelArgs,
    },
}

#[derive(Args)]
struct LabelArgs {
    /// El encabezado debe ser igual a la etiqueta (no sólo contenerla)
    #[arg(long)]
    header_exact: bool,

    /// Ignora mayúsculas al buscar el encabezado
    #[arg(long)]
    header_ignore_case: bool,

    #[arg(long)]
    header_label: Option<String>,

    #[arg(long)]
    join_key_column: Option<String>,

    #[arg(long)]
    measurement_column: Option<String>,

    #[arg(long)]
    value_column: Option<String>,

    #[arg(long)]
    join_key_property: Option<String>,

    #[arg(long)]
    name_property: Option<String>,

    #[arg(long)]
    notation_column: Option<String>,
}

impl LabelArgs {
    fn apply(self, cfg: &mut MergeConfig) {
        if self.header_exact {
            cfg.activity.header_match.mode = MatchMode::Exact;
        }
        if self.header_ignore_case {
            cfg.activity.header_match.case_sensitive = false;
        }
        let set = |target: &mut String, value: Option<String>| {
            if let Some(v) = value {
                *target = v;
            }
        };
        set(&mut cfg.activity.header_label, self.header_label);
        set(&mut cfg.activity.join_key_column, self.join_key_column);
        set(&mut cfg.activity.measurement_column, self.measurement_column);
        set(&mut cfg.activity.value_column, self.value_column);
        set(&mut cfg.structure.join_key_property, self.join_key_property);
        set(&mut cfg.structure.name_property, self.name_property);
        set(&mut cfg.structure.notation_column, self.notation_column);
    }
}

fn main() -> ExitCode {
    init_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Merge { sdf,
                          activity,
                          parameter,
                          out_dir,
                          provenance,
                          backend,
                          json,
                          labels, } => cmd_merge(BatchInput { sdf_files: sdf,
                                                              activity_file: activity,
                                                              parameter },
                                                 out_dir,
                                                 provenance,
                                                 backend,
                                                 json,
                                                 labels),
        Commands::Parameters { activity, labels } => cmd_parameters(activity, labels),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn load_config(labels: LabelArgs) -> anyhow::Result<MergeConfig> {
    let mut cfg = MergeConfig::from_env().context("leyendo configuración PHARM_MERGE_*")?;
    labels.apply(&mut cfg);
    Ok(cfg)
}

fn cmd_merge(input: BatchInput,
             out_dir: PathBuf,
             provenance: bool,
             backend: Option<String>,
             json: bool,
             labels: LabelArgs)
             -> anyhow::Result<()> {
    let mut cfg = load_config(labels)?;
    if provenance {
        cfg.include_provenance = true;
    }
    if let Some(b) = backend {
        cfg.backend = b;
    }
    log::debug!("configuración efectiva: {:?}", cfg);

    let output = run_batch(&input, &cfg, &out_dir).context("corrida de fusión")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&output.outcome.report)?);
    } else {
        print_summary(&output.outcome.report);
        for path in &output.written {
            println!("  -> {}", path.display());
        }
        println!("  -> {}", output.manifest_path.display());
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("Estructuras: {} interpretadas, {} omitidas", report.parsed, report.skipped);
    for s in &report.skipped_blocks {
        println!("  omitido #{} {} ({}): {}",
                 s.index,
                 s.title,
                 s.source.as_deref().unwrap_or("-"),
                 s.reason);
    }
    println!("Tabla fusionada: {} filas ({} con actividad)", report.merged_rows, report.matched_rows);
    match &report.activity_error {
        Some(reason) => println!("Salidas de actividad no disponibles: {reason}"),
        None => {
            if let (Some(p), Some(n)) = (&report.selected_parameter, report.parameter_rows) {
                println!("Parámetro {p}: {n} filas");
            }
            if report.ambiguous_values > 0 {
                println!("Aviso: {} valores contienen '|' y quedan ambiguos tras la agregación",
                         report.ambiguous_values);
            }
        }
    }
}

fn cmd_parameters(activity: PathBuf, labels: LabelArgs) -> anyhow::Result<()> {
    let cfg = load_config(labels)?;
    let grid = read_grid(&activity)?;
    let table = read_activity(&grid, &cfg.activity).with_context(|| format!("planilla {}", activity.display()))?;
    let options = parameter_options(&table);
    let default = default_parameter(&options);
    for option in &options {
        if Some(option.as_str()) == default {
            println!("{option} (default)");
        } else {
            println!("{option}");
        }
    }
    Ok(())
}
