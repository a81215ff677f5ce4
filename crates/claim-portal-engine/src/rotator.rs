// SPDX-License-Identifier: Apache-2.0

//! Round rotation: decides whether the stored round is finished and, if so,
//! generates and persists the next one.

use crate::EngineError;
use chrono::{DateTime, Duration, Utc};
use claim_portal_core::env::env_u64;
use claim_portal_model::{FieldIssue, Schedule, ScheduleMode, ScheduleTimes, ValidationError};
use claim_portal_store::ScheduleStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

/// Upper bound for any single timing, expressed in seconds (one year).
const MAX_TIMING_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Inclusive bounds for one randomized timing, in the unit its field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingRange {
    pub min: u64,
    pub max: u64,
}

impl TimingRange {
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    fn from_env(prefix: &str, unit: &str, default: Self) -> Self {
        Self {
            min: env_u64(&format!("{prefix}_MIN_{unit}"), default.min),
            max: env_u64(&format!("{prefix}_MAX_{unit}"), default.max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationConfig {
    pub open_delay_minutes: TimingRange,
    pub window_duration_minutes: TimingRange,
    pub snapshot_offset_minutes: TimingRange,
    pub distribution_lag_seconds: TimingRange,
    pub distribution_duration_seconds: TimingRange,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            open_delay_minutes: TimingRange::new(20, 60),
            window_duration_minutes: TimingRange::new(3, 5),
            snapshot_offset_minutes: TimingRange::new(10, 45),
            distribution_lag_seconds: TimingRange::new(60, 180),
            distribution_duration_seconds: TimingRange::new(60, 180),
        }
    }
}

impl RotationConfig {
    /// Reads `CLAIM_<TIMING>_{MIN,MAX}_{MINUTES,SECONDS}` over the defaults
    /// and validates the result.
    pub fn from_env() -> Result<Self, ValidationError> {
        let d = Self::default();
        let cfg = Self {
            open_delay_minutes: TimingRange::from_env(
                "CLAIM_OPEN_DELAY",
                "MINUTES",
                d.open_delay_minutes,
            ),
            window_duration_minutes: TimingRange::from_env(
                "CLAIM_WINDOW_DURATION",
                "MINUTES",
                d.window_duration_minutes,
            ),
            snapshot_offset_minutes: TimingRange::from_env(
                "CLAIM_SNAPSHOT_OFFSET",
                "MINUTES",
                d.snapshot_offset_minutes,
            ),
            distribution_lag_seconds: TimingRange::from_env(
                "CLAIM_DISTRIBUTION_LAG",
                "SECONDS",
                d.distribution_lag_seconds,
            ),
            distribution_duration_seconds: TimingRange::from_env(
                "CLAIM_DISTRIBUTION_DURATION",
                "SECONDS",
                d.distribution_duration_seconds,
            ),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// `(field, range, seconds per unit)`.
    fn ranges(&self) -> [(&'static str, TimingRange, u64); 5] {
        [
            ("openDelayMinutes", self.open_delay_minutes, 60),
            ("windowDurationMinutes", self.window_duration_minutes, 60),
            ("snapshotOffsetMinutes", self.snapshot_offset_minutes, 60),
            ("distributionLagSeconds", self.distribution_lag_seconds, 1),
            ("distributionDurationSeconds", self.distribution_duration_seconds, 1),
        ]
    }

    /// Every range must have `min <= max`, and the shortest possible round
    /// must still end after the instant it was generated at; otherwise a
    /// second rotation at the same instant would fire again.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        for (field, r, unit) in self.ranges() {
            if r.min > r.max {
                issues.push(FieldIssue {
                    field: field.to_string(),
                    problem: format!("min {} exceeds max {}", r.min, r.max),
                });
            } else if r.max.saturating_mul(unit) > MAX_TIMING_SECONDS {
                issues.push(FieldIssue {
                    field: field.to_string(),
                    problem: format!("max {} is longer than one year", r.max),
                });
            }
        }
        let shortest = self
            .open_delay_minutes
            .min
            .saturating_add(self.window_duration_minutes.min)
            .saturating_mul(60)
            .saturating_add(self.distribution_lag_seconds.min)
            .saturating_add(self.distribution_duration_seconds.min);
        if shortest == 0 {
            issues.push(FieldIssue {
                field: "distributionDurationSeconds".to_string(),
                problem: "all minimum timings are zero; a new round would already be finished"
                    .to_string(),
            });
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                subject: "rotation config".to_string(),
                issues,
            })
        }
    }
}

/// Uniform draws for the rotation timings.
pub trait RandomSource {
    fn pick(&mut self, range: TimingRange) -> u64;
}

pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    /// A fresh seed is drawn from the thread RNG when none is given; it is
    /// kept so a run can be reproduced.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, range: TimingRange) -> u64 {
        if range.min >= range.max {
            return range.min;
        }
        self.rng.random_range(range.min..=range.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipReason {
    Manual,
    RoundInProgress {
        #[serde(rename = "distributionDoneAt")]
        distribution_done_at: DateTime<Utc>,
    },
}

impl SkipReason {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Manual => "schedule is in manual mode".to_string(),
            Self::RoundInProgress {
                distribution_done_at,
            } => format!(
                "current round distribution finishes at {}",
                claim_portal_model::format_timestamp(*distribution_done_at)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDecision {
    Rotate { next_round: u64 },
    Skip(SkipReason),
}

/// Pure decision over the stored record. `None` means no round was ever
/// written.
#[must_use]
pub fn plan_rotation(current: Option<&Schedule>, now: DateTime<Utc>) -> RotationDecision {
    let Some(current) = current else {
        return RotationDecision::Rotate { next_round: 1 };
    };
    if current.mode == ScheduleMode::Manual {
        return RotationDecision::Skip(SkipReason::Manual);
    }
    match current.times().distribution_done_at {
        Some(done) if done > now => RotationDecision::Skip(SkipReason::RoundInProgress {
            distribution_done_at: done,
        }),
        _ => RotationDecision::Rotate {
            next_round: current.round_number.saturating_add(1),
        },
    }
}

fn minutes(n: u64) -> Duration {
    seconds(n.saturating_mul(60))
}

fn seconds(n: u64) -> Duration {
    Duration::seconds(i64::try_from(n.min(MAX_TIMING_SECONDS)).unwrap_or(0))
}

/// Chains the next round's milestones from `now`. The snapshot is placed
/// before the window opens and may already be in the past.
pub fn generate_schedule(
    round_number: u64,
    now: DateTime<Utc>,
    cfg: &RotationConfig,
    rng: &mut dyn RandomSource,
) -> Schedule {
    let open_delay = rng.pick(cfg.open_delay_minutes);
    let window = rng.pick(cfg.window_duration_minutes);
    let snapshot_offset = rng.pick(cfg.snapshot_offset_minutes);
    let lag = rng.pick(cfg.distribution_lag_seconds);
    let duration = rng.pick(cfg.distribution_duration_seconds);

    let opens = now + minutes(open_delay);
    let snapshot = opens - minutes(snapshot_offset);
    let closes = opens + minutes(window);
    let dist_start = closes + seconds(lag);
    let dist_done = dist_start + seconds(duration);
    debug!(
        round = round_number,
        open_delay, window, snapshot_offset, lag, duration, "generated round timings"
    );
    Schedule::from_times(
        ScheduleMode::Auto,
        round_number,
        &ScheduleTimes {
            snapshot_at: Some(snapshot),
            window_opens_at: Some(opens),
            window_closes_at: Some(closes),
            distribution_starts_at: Some(dist_start),
            distribution_done_at: Some(dist_done),
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    Rotated(Schedule),
    Skipped(SkipReason),
}

/// Writes only when a rotation is due.
pub fn rotate<S: ScheduleStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
    cfg: &RotationConfig,
    rng: &mut dyn RandomSource,
) -> Result<RotationOutcome, EngineError> {
    cfg.validate()?;
    let current = store.load_schedule()?;
    match plan_rotation(current.as_ref(), now) {
        RotationDecision::Skip(reason) => {
            info!(reason = %reason.describe(), "rotation skipped");
            Ok(RotationOutcome::Skipped(reason))
        }
        RotationDecision::Rotate { next_round } => {
            let next = generate_schedule(next_round, now, cfg, rng);
            // Years past 9999 format with a sign that does not parse back.
            if next.times().milestones().iter().any(Option::is_none) {
                return Err(ValidationError::single(
                    "schedule",
                    "distributionDoneAt",
                    format!("round generated at {now} ends beyond year 9999"),
                )
                .into());
            }
            store.save_schedule(&next)?;
            info!(
                round = next_round,
                opens_at = next.window_opens_at.as_deref().unwrap_or_default(),
                "rotated to new round"
            );
            Ok(RotationOutcome::Rotated(next))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Lowest;

    impl RandomSource for Lowest {
        fn pick(&mut self, range: TimingRange) -> u64 {
            range.min
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn first_round_is_one() {
        assert_eq!(
            plan_rotation(None, now()),
            RotationDecision::Rotate { next_round: 1 }
        );
    }

    #[test]
    fn chaining_uses_each_draw_once() {
        let s = generate_schedule(4, now(), &RotationConfig::default(), &mut Lowest);
        let t = s.times();
        assert_eq!(t.window_opens_at, Some(now() + Duration::minutes(20)));
        assert_eq!(t.snapshot_at, Some(now() + Duration::minutes(10)));
        assert_eq!(t.window_closes_at, Some(now() + Duration::minutes(23)));
        assert_eq!(
            t.distribution_starts_at,
            Some(now() + Duration::minutes(24))
        );
        assert_eq!(t.distribution_done_at, Some(now() + Duration::minutes(25)));
        assert_eq!(s.round_number, 4);
        assert_eq!(s.mode, ScheduleMode::Auto);
    }

    #[test]
    fn inverted_ranges_are_all_reported() {
        let cfg = RotationConfig {
            open_delay_minutes: TimingRange::new(9, 1),
            distribution_lag_seconds: TimingRange::new(200, 100),
            ..RotationConfig::default()
        };
        let err = cfg.validate().expect_err("invalid");
        assert_eq!(err.fields(), vec!["openDelayMinutes", "distributionLagSeconds"]);
    }

    #[test]
    fn zero_length_rounds_are_rejected() {
        let zero = TimingRange::new(0, 0);
        let cfg = RotationConfig {
            open_delay_minutes: zero,
            window_duration_minutes: zero,
            snapshot_offset_minutes: zero,
            distribution_lag_seconds: zero,
            distribution_duration_seconds: zero,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn seeded_source_is_reproducible_and_in_range() {
        let range = TimingRange::new(10, 45);
        let mut a = SeededRandom::new(Some(7));
        let mut b = SeededRandom::new(Some(7));
        for _ in 0..50 {
            let x = a.pick(range);
            assert_eq!(x, b.pick(range));
            assert!((10..=45).contains(&x));
        }
        assert_eq!(a.seed(), 7);
    }
}
