//! chem-core: piezas transversales del pipeline de fusión.
//!
//! - `hashing`: JSON canónico y fingerprints blake3.
//! - `event`: log append-only de eventos por corrida.
pub mod constants;
pub mod errors;
pub mod event;
pub mod hashing;

pub use constants::PIPELINE_VERSION;
pub use errors::CoreError;
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use hashing::{hash_str, hash_value, to_canonical_json};
