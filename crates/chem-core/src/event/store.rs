use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};
use crate::errors::CoreError;

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con
    /// seq y ts). Falla si la corrida ya emitió `RunCompleted`.
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> Result<RunEvent, CoreError>;
    /// Lista eventos de una corrida (orden ascendente por seq).
    fn list(&self, run_id: Uuid) -> Vec<RunEvent>;
}

#[derive(Default)]
pub struct InMemoryEventStore {
    pub inner: HashMap<Uuid, Vec<RunEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> Result<RunEvent, CoreError> {
        let vec = self.inner.entry(run_id).or_default();
        if vec.last().is_some_and(|e| e.kind.is_terminal()) {
            return Err(CoreError::RunCompleted);
        }
        let seq = vec.len() as u64;
        let ev = RunEvent { seq,
                            run_id,
                            kind,
                            ts: Utc::now() };
        vec.push(ev.clone());
        Ok(ev)
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_per_run_and_closed_after_completion() {
        let mut store = InMemoryEventStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.append_kind(a, RunEventKind::HeaderLocated { row: 2 }).unwrap();
        let ev = store.append_kind(b, RunEventKind::HeaderLocated { row: 0 }).unwrap();
        assert_eq!(ev.seq, 0);
        let done = store.append_kind(a, RunEventKind::RunCompleted { run_fingerprint: "x".into() }).unwrap();
        assert_eq!(done.seq, 1);
        assert_eq!(store.append_kind(a, RunEventKind::HeaderLocated { row: 3 }).unwrap_err(),
                   CoreError::RunCompleted);
        assert_eq!(store.list(a).len(), 2);
        assert!(store.list(Uuid::new_v4()).is_empty());
    }
}
