//! Modelo de dominio de la fusión ligandos + farmacología.
//!
//! Etapas puras, sin E/S:
//! `extract_structures` -> `locate_header` / `normalize_activity` ->
//! `aggregate_by_key` -> `merge_tables`, y en paralelo `project_parameter`
//! sobre la tabla de actividad sin agregar.

pub mod activity;
pub mod aggregate;
pub mod error;
pub mod merge;
pub mod projection;
pub mod schema;
pub mod structure;
pub mod table;

pub use activity::{default_parameter, locate_header, normalize_activity, parameter_options, read_activity, ActivityRecord,
                   ActivityTable, Grid, DEFAULT_PARAMETER};
pub use aggregate::{aggregate_by_key, aggregate_parameter, AggregatedActivity, AggregatedTable, AGGREGATE_SEPARATOR};
pub use error::DomainError;
pub use merge::{merge_tables, MergeOptions, MergedRow, MergedTable, COLLISION_SUFFIX, PROPERTY_SUFFIX};
pub use projection::{project_parameter, ParameterRow, ParameterTable};
pub use schema::{ActivitySchema, HeaderMatch, MatchMode, StructureSchema};
pub use structure::{extract_structures, SkippedBlock, StructureExtraction, StructureRecord, StructureTable};
pub use table::TableView;
