// SPDX-License-Identifier: Apache-2.0

//! Maps a schedule and an instant to the round's phase.
//!
//! Milestones are checked latest first; a missing milestone never counts as
//! reached, so a partially filled schedule degrades to an earlier phase.

use chrono::{DateTime, Utc};
use claim_portal_model::{format_timestamp, Phase, Schedule, ScheduleTimes};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResolution {
    pub phase: Phase,
    #[serde(serialize_with = "serialize_instant")]
    pub countdown_target: Option<DateTime<Utc>>,
    pub claim_window_status: &'static str,
    pub front_end_status: &'static str,
    pub snapshot_label: String,
}

fn serialize_instant<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(at) => serializer.serialize_some(&format_timestamp(*at)),
        None => serializer.serialize_none(),
    }
}

fn reached(milestone: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    milestone.is_some_and(|at| now >= at)
}

#[must_use]
pub fn resolve_phase(times: &ScheduleTimes, now: DateTime<Utc>) -> PhaseResolution {
    let (phase, countdown_target) = if reached(times.distribution_done_at, now) {
        (Phase::Done, None)
    } else if reached(times.distribution_starts_at, now) {
        (Phase::Distribution, times.distribution_done_at)
    } else if reached(times.window_closes_at, now) {
        (Phase::Closed, times.distribution_starts_at)
    } else if reached(times.window_opens_at, now) {
        (Phase::Open, times.window_closes_at)
    } else if reached(times.snapshot_at, now) {
        (Phase::Snapshot, times.window_opens_at)
    } else {
        (Phase::Scheduled, times.snapshot_at.or(times.window_opens_at))
    };
    PhaseResolution {
        phase,
        countdown_target,
        claim_window_status: claim_window_status(phase),
        front_end_status: front_end_status(phase),
        snapshot_label: snapshot_label(times.snapshot_at, now),
    }
}

/// Unparseable milestone strings read as absent.
#[must_use]
pub fn resolve_schedule(schedule: &Schedule, now: DateTime<Utc>) -> PhaseResolution {
    resolve_phase(&schedule.times(), now)
}

fn claim_window_status(phase: Phase) -> &'static str {
    match phase {
        Phase::Scheduled | Phase::Snapshot => "Not open",
        Phase::Open => "Open",
        Phase::Closed | Phase::Distribution | Phase::Done => "Closed",
    }
}

fn front_end_status(phase: Phase) -> &'static str {
    match phase {
        Phase::Scheduled => "Scheduled",
        Phase::Snapshot => "Snapshot taken",
        Phase::Open => "Claim window open",
        Phase::Closed => "Claim window closed",
        Phase::Distribution => "Distribution in progress",
        Phase::Done => "Round complete",
    }
}

fn snapshot_label(snapshot_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match snapshot_at {
        None => "Snapshot pending".to_string(),
        Some(at) if now < at => format!("Snapshot at {}", format_timestamp(at)),
        Some(_) => "Snapshot taken".to_string(),
    }
}
