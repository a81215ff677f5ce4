// SPDX-License-Identifier: Apache-2.0

use crate::time::{format_timestamp, parse_timestamp, parse_timestamp_lenient};
use crate::validation::{FieldReader, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// `Auto` lets the rotator replace the record; `Manual` freezes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    Auto,
    Manual,
}

impl ScheduleMode {
    pub fn parse(input: &str) -> Result<Self, String> {
        match input.trim() {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown schedule mode `{other}` (expected auto|manual)")),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

impl Display for ScheduleMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted schedule record. Timestamps are kept as the stored strings
/// so that an unparseable value survives a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub mode: ScheduleMode,
    pub round_number: u64,
    pub snapshot_at: Option<String>,
    pub window_opens_at: Option<String>,
    pub window_closes_at: Option<String>,
    pub distribution_starts_at: Option<String>,
    pub distribution_done_at: Option<String>,
}

/// Parsed milestones. `None` means absent or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleTimes {
    pub snapshot_at: Option<DateTime<Utc>>,
    pub window_opens_at: Option<DateTime<Utc>>,
    pub window_closes_at: Option<DateTime<Utc>>,
    pub distribution_starts_at: Option<DateTime<Utc>>,
    pub distribution_done_at: Option<DateTime<Utc>>,
}

const MILESTONE_FIELDS: [&str; 5] = [
    "snapshotAt",
    "windowOpensAt",
    "windowClosesAt",
    "distributionStartsAt",
    "distributionDoneAt",
];

impl ScheduleTimes {
    #[must_use]
    pub fn milestones(&self) -> [Option<DateTime<Utc>>; 5] {
        [
            self.snapshot_at,
            self.window_opens_at,
            self.window_closes_at,
            self.distribution_starts_at,
            self.distribution_done_at,
        ]
    }

    /// Present milestones never decrease in declaration order.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        let present: Vec<_> = self.milestones().into_iter().flatten().collect();
        present.windows(2).all(|w| w[0] <= w[1])
    }
}

impl Schedule {
    /// An empty record in `mode`, used when an operator sets the mode on a
    /// store that has never been rotated.
    #[must_use]
    pub fn empty(mode: ScheduleMode) -> Self {
        Self {
            mode,
            round_number: 0,
            snapshot_at: None,
            window_opens_at: None,
            window_closes_at: None,
            distribution_starts_at: None,
            distribution_done_at: None,
        }
    }

    #[must_use]
    pub fn from_times(mode: ScheduleMode, round_number: u64, times: &ScheduleTimes) -> Self {
        Self {
            mode,
            round_number,
            snapshot_at: times.snapshot_at.map(format_timestamp),
            window_opens_at: times.window_opens_at.map(format_timestamp),
            window_closes_at: times.window_closes_at.map(format_timestamp),
            distribution_starts_at: times.distribution_starts_at.map(format_timestamp),
            distribution_done_at: times.distribution_done_at.map(format_timestamp),
        }
    }

    /// Schema check for a stored record. Milestone strings only need to be
    /// strings or null; their content is interpreted leniently by [`Self::times`].
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| ValidationError::single("schedule", "$", format!("is not valid JSON: {e}")))?;
        let mut reader = FieldReader::new("schedule", &value);
        let mode = match reader.required_str("mode") {
            Some(raw) => match ScheduleMode::parse(&raw) {
                Ok(mode) => Some(mode),
                Err(e) => {
                    reader.issue("mode", e);
                    None
                }
            },
            None => None,
        };
        let round_number = reader.required_u64("roundNumber");
        let mut milestones: Vec<Option<String>> = MILESTONE_FIELDS
            .iter()
            .map(|field| reader.optional_str(field))
            .collect();
        reader.finish()?;
        let (Some(mode), Some(round_number)) = (mode, round_number) else {
            return Err(ValidationError::single("schedule", "$", "incomplete record"));
        };
        let distribution_done_at = milestones.pop().flatten();
        let distribution_starts_at = milestones.pop().flatten();
        let window_closes_at = milestones.pop().flatten();
        let window_opens_at = milestones.pop().flatten();
        let snapshot_at = milestones.pop().flatten();
        Ok(Self {
            mode,
            round_number,
            snapshot_at,
            window_opens_at,
            window_closes_at,
            distribution_starts_at,
            distribution_done_at,
        })
    }

    #[must_use]
    pub fn times(&self) -> ScheduleTimes {
        ScheduleTimes {
            snapshot_at: parse_timestamp_lenient(self.snapshot_at.as_deref()),
            window_opens_at: parse_timestamp_lenient(self.window_opens_at.as_deref()),
            window_closes_at: parse_timestamp_lenient(self.window_closes_at.as_deref()),
            distribution_starts_at: parse_timestamp_lenient(self.distribution_starts_at.as_deref()),
            distribution_done_at: parse_timestamp_lenient(self.distribution_done_at.as_deref()),
        }
    }

    /// Strict check used before an operator-authored schedule is written:
    /// all five milestones present, parseable and non-decreasing.
    pub fn validate_strict(&self) -> Result<ScheduleTimes, ValidationError> {
        let raw = [
            &self.snapshot_at,
            &self.window_opens_at,
            &self.window_closes_at,
            &self.distribution_starts_at,
            &self.distribution_done_at,
        ];
        let mut issues = Vec::new();
        let mut parsed = [None; 5];
        for (idx, (field, value)) in MILESTONE_FIELDS.iter().zip(raw).enumerate() {
            match value.as_deref().map(parse_timestamp) {
                Some(Ok(at)) => parsed[idx] = Some(at),
                Some(Err(e)) => issues.push(crate::FieldIssue {
                    field: (*field).to_string(),
                    problem: e,
                }),
                None => issues.push(crate::FieldIssue {
                    field: (*field).to_string(),
                    problem: "is missing".to_string(),
                }),
            }
        }
        for idx in 1..parsed.len() {
            if let (Some(prev), Some(cur)) = (parsed[idx - 1], parsed[idx]) {
                if cur < prev {
                    issues.push(crate::FieldIssue {
                        field: MILESTONE_FIELDS[idx].to_string(),
                        problem: format!("must not precede `{}`", MILESTONE_FIELDS[idx - 1]),
                    });
                }
            }
        }
        if !issues.is_empty() {
            return Err(ValidationError {
                subject: "schedule".to_string(),
                issues,
            });
        }
        Ok(ScheduleTimes {
            snapshot_at: parsed[0],
            window_opens_at: parsed[1],
            window_closes_at: parsed[2],
            distribution_starts_at: parsed[3],
            distribution_done_at: parsed[4],
        })
    }
}
