//! The concurrent status map behind the pipeline.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::StoreError;

use super::record::{TaskId, TaskRecord, TaskSnapshot, format_elapsed_since};

/// Concurrent key-value map from task ID to task state.
///
/// ### Responsibilities
/// - Atomic create/read/update/delete of task records
/// - Unique ID allocation at creation (v4 UUID)
/// - Snapshot reads with a derived elapsed-time rendering
///
/// ### Rules
/// - A single readers-writer lock guards the whole map; it is held only for
///   the duration of the map access (every method is sync, no awaits).
/// - Each operation is atomic; a concurrent `update_phase` and `delete` on
///   the same ID resolve to one of the two serial orders, never a torn
///   record.
/// - Safe under unbounded concurrent readers and writers.
pub struct StatusStore {
    tasks: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl StatusStore {
    /// Creates an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: RwLock::new(HashMap::new()),
        })
    }

    /// Allocates a fresh ID and inserts a `pending` record for `name`.
    ///
    /// Fails with [`StoreError::InvalidInput`] if `name` is empty. The
    /// duplicate-ID check is defensive; with v4 UUIDs a
    /// [`StoreError::Conflict`] is unreachable in practice.
    pub fn create(&self, name: &str) -> Result<TaskId, StoreError> {
        if name.is_empty() {
            return Err(StoreError::InvalidInput);
        }

        let id = TaskId::generate();
        let record = TaskRecord::pending(name.to_string());

        let mut tasks = self.write();
        match tasks.entry(id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict { id }),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(id)
            }
        }
    }

    /// Returns true if a record exists for `id`. Pure lookup, no side effects.
    pub fn exists(&self, id: &TaskId) -> bool {
        self.read().contains_key(id)
    }

    /// Atomically replaces the phase of `id`, leaving all other fields untouched.
    ///
    /// Fails with [`StoreError::NotFound`] if the record is absent — the
    /// expected outcome when a caller deleted the task mid-processing.
    pub fn update_phase(&self, id: &TaskId, phase: impl Into<String>) -> Result<(), StoreError> {
        let mut tasks = self.write();
        match tasks.get_mut(id) {
            Some(record) => {
                record.phase = phase.into();
                Ok(())
            }
            None => Err(StoreError::NotFound { id: id.clone() }),
        }
    }

    /// Atomically removes the record for `id`.
    ///
    /// Fails with [`StoreError::NotFound`] if absent. Safe to call
    /// concurrently with an in-flight `update_phase` for the same ID; the
    /// later of the two operations determines the final state.
    pub fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut tasks = self.write();
        match tasks.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { id: id.clone() }),
        }
    }

    /// Returns a snapshot (copy) of the record for `id`.
    ///
    /// The snapshot includes `elapsed`, derived from `created_at` to the
    /// current instant and rendered as `HH:MM:SS`.
    pub fn get(&self, id: &TaskId) -> Result<TaskSnapshot, StoreError> {
        let record = {
            let tasks = self.read();
            match tasks.get(id) {
                Some(record) => record.clone(),
                None => return Err(StoreError::NotFound { id: id.clone() }),
            }
        };

        // Elapsed is computed outside the lock; only the map access is guarded.
        Ok(TaskSnapshot {
            id: id.clone(),
            elapsed: format_elapsed_since(record.created_at, Utc::now()),
            name: record.name,
            phase: record.phase,
            created_at: record.created_at,
            created_at_formatted: record.created_at_formatted,
        })
    }

    /// Returns the number of records currently in the store.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Records are replaced wholesale under the lock, so a poisoning panic
    // cannot leave a half-written record; recover the guard instead of
    // propagating the poison.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<TaskId, TaskRecord>> {
        self.tasks.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TaskId, TaskRecord>> {
        self.tasks.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::store::PHASE_PENDING;

    use super::*;

    #[test]
    fn create_returns_unique_ids_for_same_name() {
        let store = StatusStore::new();
        let a = store.create("same_name").unwrap();
        let b = store.create("same_name").unwrap();
        assert_ne!(a, b);
        assert!(store.exists(&a));
        assert!(store.exists(&b));
    }

    #[test]
    fn create_rejects_empty_name() {
        let store = StatusStore::new();
        assert_eq!(store.create(""), Err(StoreError::InvalidInput));
        assert!(store.is_empty());
    }

    #[test]
    fn new_record_is_pending_with_name_kept() {
        let store = StatusStore::new();
        let id = store.create("report").unwrap();
        let snap = store.get(&id).unwrap();
        assert_eq!(snap.phase, PHASE_PENDING);
        assert_eq!(snap.name, "report");
        assert_eq!(snap.id, id);
    }

    #[test]
    fn exists_is_false_for_unknown_id() {
        let store = StatusStore::new();
        assert!(!store.exists(&TaskId::from("no-such-id")));
    }

    #[test]
    fn update_phase_replaces_only_the_phase() {
        let store = StatusStore::new();
        let id = store.create("job").unwrap();
        let before = store.get(&id).unwrap();

        store.update_phase(&id, "worker-1: started").unwrap();

        let after = store.get(&id).unwrap();
        assert_eq!(after.phase, "worker-1: started");
        assert_eq!(after.name, before.name);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.created_at_formatted, before.created_at_formatted);
    }

    #[test]
    fn update_phase_on_missing_id_is_not_found() {
        let store = StatusStore::new();
        let id = TaskId::from("gone");
        assert_eq!(
            store.update_phase(&id, "anything"),
            Err(StoreError::NotFound { id })
        );
    }

    #[test]
    fn delete_removes_the_record() {
        let store = StatusStore::new();
        let id = store.create("short-lived").unwrap();
        store.delete(&id).unwrap();

        assert!(!store.exists(&id));
        assert!(matches!(store.get(&id), Err(StoreError::NotFound { .. })));
        assert!(matches!(
            store.delete(&id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn elapsed_is_rendered_hh_mm_ss() {
        let store = StatusStore::new();
        let id = store.create("fresh").unwrap();
        let snap = store.get(&id).unwrap();
        assert_eq!(snap.elapsed.len(), 8);
        assert_eq!(&snap.elapsed[..7], "00:00:0");
    }

    #[test]
    fn concurrent_updates_and_deletes_never_tear() {
        let store = StatusStore::new();
        let ids: Vec<TaskId> = (0..16).map(|_| store.create("stress").unwrap()).collect();

        let mut handles = Vec::new();
        for id in &ids {
            let store_w = Arc::clone(&store);
            let id_w = id.clone();
            handles.push(thread::spawn(move || {
                for n in 0..200 {
                    let _ = store_w.update_phase(&id_w, format!("phase {n}"));
                }
            }));

            let store_d = Arc::clone(&store);
            let id_d = id.clone();
            handles.push(thread::spawn(move || {
                let _ = store_d.delete(&id_d);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // Every surviving record must be fully consistent.
        for id in &ids {
            if let Ok(snap) = store.get(id) {
                assert_eq!(snap.name, "stress");
                assert!(snap.phase == PHASE_PENDING || snap.phase.starts_with("phase "));
            }
        }
    }
}
