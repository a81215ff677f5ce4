// SPDX-License-Identifier: Apache-2.0

use claim_portal_model::{
    format_timestamp, AnalyticsFile, Phase, PortalPhase, Schedule, ScheduleMode, ScheduleTimes,
};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use proptest::test_runner::Config;

#[test]
fn phase_and_portal_phase_names_are_stable() {
    let phases: Vec<_> = Phase::ALL.iter().map(|p| p.as_str()).collect();
    assert_eq!(
        phases,
        vec!["scheduled", "snapshot", "open", "closed", "distribution", "done"]
    );
    let templates: Vec<_> = PortalPhase::ALL
        .iter()
        .map(|p| p.template_file_name())
        .collect();
    assert_eq!(
        templates,
        vec![
            "scheduled.json",
            "live.json",
            "closed.json",
            "snapshot.json",
            "distribution.json"
        ]
    );
    assert_eq!(
        serde_json::to_value(PortalPhase::Live).expect("json"),
        serde_json::json!("live")
    );
}

#[test]
fn analytics_file_tolerates_missing_rounds() {
    let parsed: AnalyticsFile = serde_json::from_str("{}").expect("analytics");
    assert!(parsed.rounds.is_empty());
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn schedule_json_round_trip_preserves_times(
        round in 0_u64..1_000_000,
        offsets in proptest::collection::vec(0_i64..86_400, 5)
    ) {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut acc = base;
        let mut at = Vec::new();
        for off in offsets {
            acc += Duration::seconds(off);
            at.push(Some(acc));
        }
        let times = ScheduleTimes {
            snapshot_at: at[0],
            window_opens_at: at[1],
            window_closes_at: at[2],
            distribution_starts_at: at[3],
            distribution_done_at: at[4],
        };
        let schedule = Schedule::from_times(ScheduleMode::Auto, round, &times);
        let bytes = serde_json::to_vec(&schedule).expect("json");
        let loaded = Schedule::from_json_bytes(&bytes).expect("load");
        prop_assert_eq!(loaded.times(), times);
        prop_assert!(loaded.times().is_monotonic());
        prop_assert_eq!(loaded.window_opens_at, at[1].map(format_timestamp));
    }
}
