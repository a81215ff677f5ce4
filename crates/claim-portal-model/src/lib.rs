#![forbid(unsafe_code)]
//! Claim portal model SSOT.
//!
//! Persisted records are loaded through schema checks that collect every
//! missing or malformed field into one [`ValidationError`] instead of
//! stopping at the first serde failure.

mod analytics;
mod holders;
mod phase;
mod portal;
mod schedule;
mod time;
mod validation;

pub use analytics::{AnalyticsFile, AnalyticsView, RoundStats};
pub use holders::{HolderEntry, HolderSnapshot};
pub use phase::Phase;
pub use portal::{PortalConfig, PortalPhase, PortalState, PortalTemplate, PORTAL_STATE_STAMPED_KEYS};
pub use schedule::{Schedule, ScheduleMode, ScheduleTimes};
pub use time::{format_timestamp, parse_timestamp, parse_timestamp_lenient};
pub use validation::{FieldIssue, FieldReader, ValidationError};

pub const CRATE_NAME: &str = "claim-portal-model";
