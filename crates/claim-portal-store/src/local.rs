// SPDX-License-Identifier: Apache-2.0

use crate::atomic::write_atomic_file;
use crate::paths::StoreLayout;
use crate::{
    AnalyticsSource, PortalStore, ScheduleStore, SnapshotStore, StoreError, StoreErrorCode,
};
use claim_portal_core::canonical;
use claim_portal_model::{
    AnalyticsFile, HolderSnapshot, PortalConfig, PortalPhase, PortalState, PortalTemplate,
    Schedule,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON files under one data directory.
pub struct LocalFsStore {
    layout: StoreLayout,
}

impl LocalFsStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: StoreLayout::new(root),
        }
    }

    #[must_use]
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    fn write_json(&self, path: &Path, value: &impl serde::Serialize) -> Result<(), StoreError> {
        let bytes = canonical::stable_json_pretty(value).map_err(|e| {
            StoreError::new(
                StoreErrorCode::Parse,
                format!("encode {} failed: {e}", path.display()),
            )
        })?;
        write_atomic_file(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "store write");
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, StoreError> {
    std::fs::read(path).map_err(|e| {
        let code = if e.kind() == std::io::ErrorKind::NotFound {
            StoreErrorCode::NotFound
        } else {
            StoreErrorCode::Io
        };
        StoreError::new(code, format!("read {} failed: {e}", path.display()))
    })
}

impl ScheduleStore for LocalFsStore {
    fn load_schedule(&self) -> Result<Option<Schedule>, StoreError> {
        let path = self.layout.schedule();
        match read_file(&path) {
            Ok(bytes) => Ok(Some(Schedule::from_json_bytes(&bytes)?)),
            Err(e) if e.code == StoreErrorCode::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save_schedule(&self, schedule: &Schedule) -> Result<(), StoreError> {
        self.write_json(&self.layout.schedule(), schedule)
    }
}

impl PortalStore for LocalFsStore {
    fn load_portal_config(&self) -> Result<PortalConfig, StoreError> {
        let bytes = read_file(&self.layout.portal_config())?;
        Ok(PortalConfig::from_json_bytes(&bytes)?)
    }

    fn load_template(&self, phase: PortalPhase) -> Result<PortalTemplate, StoreError> {
        let bytes = read_file(&self.layout.template(phase))?;
        Ok(PortalTemplate::from_json_bytes(phase, &bytes)?)
    }

    fn write_portal_state(&self, state: &PortalState) -> Result<(), StoreError> {
        self.write_json(&self.layout.portal_state(), state)
    }

    fn read_portal_state_bytes(&self) -> Result<Vec<u8>, StoreError> {
        read_file(&self.layout.portal_state())
    }
}

impl SnapshotStore for LocalFsStore {
    fn holder_snapshot_exists(&self, round_number: u64) -> Result<bool, StoreError> {
        let path = self.layout.holder_snapshot(round_number);
        path.try_exists().map_err(|e| {
            StoreError::new(
                StoreErrorCode::Io,
                format!("stat {} failed: {e}", path.display()),
            )
        })
    }

    fn write_holder_snapshot(
        &self,
        round_number: u64,
        snapshot: &HolderSnapshot,
    ) -> Result<(), StoreError> {
        let path = self.layout.holder_snapshot(round_number);
        if self.holder_snapshot_exists(round_number)? {
            return Err(StoreError::new(
                StoreErrorCode::Immutable,
                format!(
                    "holder snapshot for round {round_number} already exists at {}; snapshots are never overwritten",
                    path.display()
                ),
            ));
        }
        self.write_json(&path, snapshot)
    }

    fn read_holder_snapshot(&self, round_number: u64) -> Result<HolderSnapshot, StoreError> {
        let path = self.layout.holder_snapshot(round_number);
        let bytes = read_file(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::new(
                StoreErrorCode::Parse,
                format!("parse {} failed: {e}", path.display()),
            )
        })
    }
}

impl AnalyticsSource for LocalFsStore {
    fn load_analytics(&self) -> Result<AnalyticsFile, StoreError> {
        let path = self.layout.analytics();
        let bytes = read_file(&path)?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::new(
                StoreErrorCode::Parse,
                format!("parse {} failed: {e}", path.display()),
            )
        })?;
        serde_json::from_value(value).map_err(|e| {
            StoreError::new(
                StoreErrorCode::Validation,
                format!("invalid analytics file {}: {e}", path.display()),
            )
        })
    }
}
