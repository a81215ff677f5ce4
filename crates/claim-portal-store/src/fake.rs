// SPDX-License-Identifier: Apache-2.0

use crate::{
    AnalyticsSource, PortalStore, ScheduleStore, SnapshotStore, StoreError, StoreErrorCode,
};
use claim_portal_model::{
    AnalyticsFile, HolderSnapshot, PortalConfig, PortalPhase, PortalState, PortalTemplate,
    Schedule,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory store that counts writes.
#[derive(Default)]
pub struct MemoryStore {
    pub schedule: Mutex<Option<Schedule>>,
    pub portal_config: Mutex<Option<PortalConfig>>,
    pub templates: Mutex<HashMap<PortalPhase, PortalTemplate>>,
    pub portal_state: Mutex<Option<PortalState>>,
    pub snapshots: Mutex<BTreeMap<u64, HolderSnapshot>>,
    pub analytics: Mutex<Option<AnalyticsFile>>,
    pub schedule_writes: AtomicU64,
    pub state_writes: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn with_schedule(schedule: Schedule) -> Self {
        let store = Self::default();
        *lock(&store.schedule) = Some(schedule);
        store
    }

    #[must_use]
    pub fn schedule_writes(&self) -> u64 {
        self.schedule_writes.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn state_writes(&self) -> u64 {
        self.state_writes.load(Ordering::Relaxed)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn missing(what: &str) -> StoreError {
    StoreError::new(StoreErrorCode::NotFound, format!("{what} not present"))
}

impl ScheduleStore for MemoryStore {
    fn load_schedule(&self) -> Result<Option<Schedule>, StoreError> {
        Ok(lock(&self.schedule).clone())
    }

    fn save_schedule(&self, schedule: &Schedule) -> Result<(), StoreError> {
        *lock(&self.schedule) = Some(schedule.clone());
        self.schedule_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl PortalStore for MemoryStore {
    fn load_portal_config(&self) -> Result<PortalConfig, StoreError> {
        lock(&self.portal_config).ok_or_else(|| missing("portal config"))
    }

    fn load_template(&self, phase: PortalPhase) -> Result<PortalTemplate, StoreError> {
        lock(&self.templates)
            .get(&phase)
            .cloned()
            .ok_or_else(|| missing(&format!("template {}", phase.template_file_name())))
    }

    fn write_portal_state(&self, state: &PortalState) -> Result<(), StoreError> {
        *lock(&self.portal_state) = Some(state.clone());
        self.state_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn read_portal_state_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let state = lock(&self.portal_state)
            .clone()
            .ok_or_else(|| missing("portal state"))?;
        serde_json::to_vec(&state)
            .map_err(|e| StoreError::new(StoreErrorCode::Parse, e.to_string()))
    }
}

impl SnapshotStore for MemoryStore {
    fn holder_snapshot_exists(&self, round_number: u64) -> Result<bool, StoreError> {
        Ok(lock(&self.snapshots).contains_key(&round_number))
    }

    fn write_holder_snapshot(
        &self,
        round_number: u64,
        snapshot: &HolderSnapshot,
    ) -> Result<(), StoreError> {
        let mut snapshots = lock(&self.snapshots);
        if snapshots.contains_key(&round_number) {
            return Err(StoreError::new(
                StoreErrorCode::Immutable,
                format!("holder snapshot for round {round_number} already exists"),
            ));
        }
        snapshots.insert(round_number, snapshot.clone());
        Ok(())
    }

    fn read_holder_snapshot(&self, round_number: u64) -> Result<HolderSnapshot, StoreError> {
        lock(&self.snapshots)
            .get(&round_number)
            .cloned()
            .ok_or_else(|| missing(&format!("holder snapshot for round {round_number}")))
    }
}

impl AnalyticsSource for MemoryStore {
    fn load_analytics(&self) -> Result<AnalyticsFile, StoreError> {
        lock(&self.analytics)
            .clone()
            .ok_or_else(|| missing("analytics file"))
    }
}
