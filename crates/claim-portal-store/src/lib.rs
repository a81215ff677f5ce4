#![forbid(unsafe_code)]

use claim_portal_model::{
    AnalyticsFile, HolderSnapshot, PortalConfig, PortalPhase, PortalState, PortalTemplate,
    Schedule, ValidationError,
};
use std::fmt::{Display, Formatter};

mod atomic;
mod fake;
mod local;
mod paths;
mod rpc;

pub use atomic::write_atomic_file;
pub use fake::MemoryStore;
pub use local::LocalFsStore;
pub use paths::StoreLayout;
pub use rpc::{
    parse_program_accounts, program_accounts_request, HolderSource, JsonRpcHolderSource, TokenAccountBalance,
    SPL_TOKEN_PROGRAM_ID,
};

pub const CRATE_NAME: &str = "claim-portal-store";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorCode {
    NotFound,
    Io,
    Parse,
    Validation,
    Immutable,
    Rpc,
}

impl StoreErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Io => "io",
            Self::Parse => "parse",
            Self::Validation => "validation",
            Self::Immutable => "immutable",
            Self::Rpc => "rpc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code.as_str())
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::new(StoreErrorCode::Validation, value.to_string())
    }
}

/// The single current schedule record.
pub trait ScheduleStore {
    /// `Ok(None)` when no round has ever been written.
    fn load_schedule(&self) -> Result<Option<Schedule>, StoreError>;
    /// Replaces the whole record.
    fn save_schedule(&self, schedule: &Schedule) -> Result<(), StoreError>;
}

pub trait PortalStore {
    fn load_portal_config(&self) -> Result<PortalConfig, StoreError>;
    fn load_template(&self, phase: PortalPhase) -> Result<PortalTemplate, StoreError>;
    fn write_portal_state(&self, state: &PortalState) -> Result<(), StoreError>;
    fn read_portal_state_bytes(&self) -> Result<Vec<u8>, StoreError>;
}

/// Holder snapshots are write-once per round.
pub trait SnapshotStore {
    fn holder_snapshot_exists(&self, round_number: u64) -> Result<bool, StoreError>;
    fn write_holder_snapshot(
        &self,
        round_number: u64,
        snapshot: &HolderSnapshot,
    ) -> Result<(), StoreError>;
    fn read_holder_snapshot(&self, round_number: u64) -> Result<HolderSnapshot, StoreError>;
}

pub trait AnalyticsSource {
    fn load_analytics(&self) -> Result<AnalyticsFile, StoreError>;
}
