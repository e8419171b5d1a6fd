use dashmap::DashMap;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::OfficeId;
use crate::processing::OfficeSnapshot;

type Slot = Arc<Mutex<Option<Arc<OfficeSnapshot>>>>;

/// One memoized snapshot per office
///
/// Each office owns a slot; callers that miss on the same office queue on the slot's
/// mutex, so only the first one replays and the rest read its result. Invalidation
/// drops the slot itself, so a replay still running against it can never publish a
/// snapshot that later reads would see.
#[derive(Default)]
pub struct SnapshotCache {
    slots: DashMap<OfficeId, Slot>,
}

impl SnapshotCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, office_id: OfficeId) -> Option<Arc<OfficeSnapshot>> {
        let slot = self.slots.get(&office_id).map(|s| Arc::clone(s.value()))?;
        let cached = lock(&slot).clone();
        cached
    }

    pub fn set(&self, office_id: OfficeId, snapshot: Arc<OfficeSnapshot>) {
        let slot = self.slot(office_id);
        *lock(&slot) = Some(snapshot);
    }

    /// Drop the memoized snapshot; takes effect before this returns
    pub fn invalidate(&self, office_id: OfficeId) {
        if self.slots.remove(&office_id).is_some() {
            debug!("Invalidated snapshot cache for office {}", office_id);
        }
    }

    /// Return the cached snapshot or build it once, even under concurrent misses
    pub fn get_or_try_insert_with<F, E>(&self, office_id: OfficeId, build: F) -> Result<Arc<OfficeSnapshot>, E>
    where
        F: FnOnce() -> Result<OfficeSnapshot, E>,
    {
        let slot = self.slot(office_id);
        let mut guard = lock(&slot);

        if let Some(snapshot) = guard.as_ref() {
            debug!("Snapshot cache hit for office {}", office_id);
            return Ok(Arc::clone(snapshot));
        }

        debug!("Snapshot cache miss for office {}", office_id);
        let snapshot = match build() {
            Ok(snapshot) => Arc::new(snapshot),
            Err(err) => {
                // release the slot before touching the map
                drop(guard);
                self.slots.remove_if(&office_id, |_, current| Arc::ptr_eq(current, &slot));
                return Err(err);
            }
        };
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Number of offices with a memoized snapshot
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| lock(entry.value()).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offices with a slot, filled or still being built
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    // The map guard is released before the slot is locked.
    fn slot(&self, office_id: OfficeId) -> Slot {
        Arc::clone(self.slots.entry(office_id).or_default().value())
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Arc<OfficeSnapshot>>> {
    // a panicked replay never stores a value, so the slot content is still consistent
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
