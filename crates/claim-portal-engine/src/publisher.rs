// SPDX-License-Identifier: Apache-2.0

use crate::EngineError;
use chrono::{DateTime, Utc};
use claim_portal_model::{PortalConfig, PortalPhase, PortalState};
use claim_portal_store::PortalStore;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalSelection {
    pub phase: PortalPhase,
    /// End of the selected interval; `None` for the open-ended last one.
    pub countdown_target: Option<DateTime<Utc>>,
}

/// Half-open intervals over the four config milestones; exactly one matches
/// any instant.
#[must_use]
pub fn select_portal_phase(config: &PortalConfig, now: DateTime<Utc>) -> PortalSelection {
    let (phase, countdown_target) = if now < config.opens_at {
        (PortalPhase::Scheduled, Some(config.opens_at))
    } else if now < config.closes_at {
        (PortalPhase::Live, Some(config.closes_at))
    } else if now < config.snapshot_at {
        (PortalPhase::Closed, Some(config.snapshot_at))
    } else if now < config.distribution_at {
        (PortalPhase::Snapshot, Some(config.distribution_at))
    } else {
        (PortalPhase::Distribution, None)
    };
    PortalSelection {
        phase,
        countdown_target,
    }
}

/// Loads the round config and the matching template, then replaces the
/// active state. A bad config or a missing template aborts before any write.
pub fn publish<S: PortalStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<PortalState, EngineError> {
    let config = store.load_portal_config()?;
    let selection = select_portal_phase(&config, now);
    let template = store.load_template(selection.phase)?;
    let state = PortalState::stamp(template, config.round_number, selection.countdown_target);
    store.write_portal_state(&state)?;
    info!(
        round = config.round_number,
        phase = %selection.phase,
        "published portal state"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn config() -> PortalConfig {
        let t = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        PortalConfig {
            round_number: 3,
            opens_at: t,
            closes_at: t + Duration::minutes(5),
            snapshot_at: t + Duration::minutes(10),
            distribution_at: t + Duration::minutes(15),
        }
    }

    #[test]
    fn each_boundary_starts_the_next_interval() {
        let c = config();
        let cases = [
            (c.opens_at - Duration::seconds(1), PortalPhase::Scheduled),
            (c.opens_at, PortalPhase::Live),
            (c.closes_at, PortalPhase::Closed),
            (c.snapshot_at, PortalPhase::Snapshot),
            (c.distribution_at, PortalPhase::Distribution),
            (c.distribution_at + Duration::days(30), PortalPhase::Distribution),
        ];
        for (at, expected) in cases {
            assert_eq!(select_portal_phase(&c, at).phase, expected, "at {at}");
        }
    }

    #[test]
    fn countdown_points_at_interval_end() {
        let c = config();
        let live = select_portal_phase(&c, c.opens_at + Duration::minutes(1));
        assert_eq!(live.countdown_target, Some(c.closes_at));
        let last = select_portal_phase(&c, c.distribution_at);
        assert_eq!(last.countdown_target, None);
    }
}
