// SPDX-License-Identifier: Apache-2.0

//! Publisher-side records: the four-milestone round config, the canned
//! per-phase templates and the stamped state the UI reads.
//!
//! The publisher's milestone order (`opensAt < closesAt < snapshotAt <
//! distributionAt`) is not the schedule's order (snapshot before the window
//! opens), so it gets its own phase type rather than sharing [`crate::Phase`].

use crate::time::{format_timestamp, parse_timestamp};
use crate::validation::{FieldReader, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

pub const PORTAL_STATE_STAMPED_KEYS: [&str; 3] = ["roundNumber", "phase", "countdownTarget"];

const TEMPLATE_REQUIRED_STRINGS: [&str; 2] = ["claimWindowStatus", "frontEndStatus"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalPhase {
    Scheduled,
    Live,
    Closed,
    Snapshot,
    Distribution,
}

impl PortalPhase {
    pub const ALL: [PortalPhase; 5] = [
        Self::Scheduled,
        Self::Live,
        Self::Closed,
        Self::Snapshot,
        Self::Distribution,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Closed => "closed",
            Self::Snapshot => "snapshot",
            Self::Distribution => "distribution",
        }
    }

    #[must_use]
    pub fn template_file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl Display for PortalPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalConfig {
    pub round_number: u64,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub snapshot_at: DateTime<Utc>,
    pub distribution_at: DateTime<Utc>,
}

impl PortalConfig {
    /// Every date must parse and the four milestones must not decrease;
    /// all violations are reported together.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            ValidationError::single("portal config", "$", format!("is not valid JSON: {e}"))
        })?;
        let mut reader = FieldReader::new("portal config", &value);
        let round_number = reader.required_u64("roundNumber");
        let fields = ["opensAt", "closesAt", "snapshotAt", "distributionAt"];
        let mut parsed: [Option<DateTime<Utc>>; 4] = [None; 4];
        for (idx, field) in fields.iter().enumerate() {
            if let Some(raw) = reader.required_str(field) {
                match parse_timestamp(&raw) {
                    Ok(at) => parsed[idx] = Some(at),
                    Err(e) => reader.issue(field, e),
                }
            }
        }
        for idx in 1..fields.len() {
            if let (Some(prev), Some(cur)) = (parsed[idx - 1], parsed[idx]) {
                if cur < prev {
                    reader.issue(fields[idx], format!("must not precede `{}`", fields[idx - 1]));
                }
            }
        }
        reader.finish()?;
        match (round_number, parsed) {
            (Some(round_number), [Some(opens_at), Some(closes_at), Some(snapshot_at), Some(distribution_at)]) => {
                Ok(Self {
                    round_number,
                    opens_at,
                    closes_at,
                    snapshot_at,
                    distribution_at,
                })
            }
            _ => Err(ValidationError::single("portal config", "$", "incomplete record")),
        }
    }
}

/// A canned state body for one publisher phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalTemplate {
    pub phase: PortalPhase,
    pub body: Map<String, Value>,
}

impl PortalTemplate {
    pub fn from_json_bytes(phase: PortalPhase, bytes: &[u8]) -> Result<Self, ValidationError> {
        let subject = "portal template";
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ValidationError::single(subject, "$", format!("is not valid JSON: {e}")))?;
        let mut reader = FieldReader::new(subject, &value);
        for field in TEMPLATE_REQUIRED_STRINGS {
            let _ = reader.required_str(field);
        }
        let body = reader.object().cloned().unwrap_or_default();
        reader.finish().map_err(|mut e| {
            e.subject = format!("{subject} `{}`", phase.template_file_name());
            e
        })?;
        Ok(Self { phase, body })
    }
}

/// The active state document. Template keys are carried through untouched
/// beside the stamped fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalState {
    pub round_number: u64,
    pub phase: PortalPhase,
    pub countdown_target: Option<String>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl PortalState {
    #[must_use]
    pub fn stamp(
        template: PortalTemplate,
        round_number: u64,
        countdown_target: Option<DateTime<Utc>>,
    ) -> Self {
        let mut body = template.body;
        for key in PORTAL_STATE_STAMPED_KEYS {
            body.remove(key);
        }
        Self {
            round_number,
            phase: template.phase,
            countdown_target: countdown_target.map(format_timestamp),
            body,
        }
    }
}
