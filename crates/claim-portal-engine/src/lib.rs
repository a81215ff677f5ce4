#![forbid(unsafe_code)]
//! Round lifecycle logic for the claim portal.
//!
//! Everything here is synchronous. Jobs take their store, clock reading and
//! random source as arguments so tests can drive them with fixed inputs.

use claim_portal_model::ValidationError;
use claim_portal_store::StoreError;
use std::fmt::{Display, Formatter};

mod analytics;
mod clock;
mod holders;
mod publisher;
mod resolver;
mod rotator;

pub use analytics::derive_analytics_view;
pub use clock::{ClockAdapter, FixedClock, SystemClock};
pub use holders::{build_holder_snapshot, take_holder_snapshot, SnapshotOutcome};
pub use publisher::{publish, select_portal_phase, PortalSelection};
pub use resolver::{resolve_phase, resolve_schedule, PhaseResolution};
pub use rotator::{
    generate_schedule, plan_rotation, rotate, RandomSource, RotationConfig, RotationDecision,
    RotationOutcome, SeededRandom, SkipReason, TimingRange,
};

pub const CRATE_NAME: &str = "claim-portal-engine";

#[derive(Debug)]
pub enum EngineError {
    Store(StoreError),
    Validation(ValidationError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store failure: {e}"),
            Self::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Validation(e) => Some(e),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ValidationError> for EngineError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
