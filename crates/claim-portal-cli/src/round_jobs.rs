// SPDX-License-Identifier: Apache-2.0

use crate::helpers::{emit_ok, resolve_now};
use crate::{CliError, OutputMode};
use claim_portal_core::env::{env_duration_ms, env_required, env_string, env_usize};
use claim_portal_engine::{
    derive_analytics_view, publish, resolve_phase, resolve_schedule, rotate, take_holder_snapshot,
    RotationConfig, RotationOutcome, SeededRandom, SnapshotOutcome,
};
use claim_portal_model::{Schedule, ScheduleMode, ScheduleTimes};
use claim_portal_store::{
    AnalyticsSource, JsonRpcHolderSource, LocalFsStore, ScheduleStore,
};
use serde_json::json;
use std::path::Path;
use tracing::info;

const ENV_RPC_URL: &str = "CLAIM_RPC_URL";
const ENV_TOKEN_MINT: &str = "CLAIM_TOKEN_MINT";
const ENV_MAX_HOLDERS: &str = "CLAIM_MAX_HOLDERS";
const ENV_RPC_TIMEOUT_MS: &str = "CLAIM_RPC_TIMEOUT_MS";
const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

pub(crate) fn run_rotate(
    data_dir: &Path,
    seed: Option<u64>,
    now: Option<&str>,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let now = resolve_now(now)?;
    let cfg = RotationConfig::from_env()?;
    let store = LocalFsStore::new(data_dir);
    let mut rng = SeededRandom::new(seed);
    let payload = match rotate(&store, now, &cfg, &mut rng)? {
        RotationOutcome::Rotated(schedule) => json!({
            "command": "rotate",
            "status": "rotated",
            "seed": rng.seed(),
            "reason": null,
            "schedule": schedule,
        }),
        RotationOutcome::Skipped(reason) => json!({
            "command": "rotate",
            "status": "skipped",
            "reason": reason.describe(),
            "skip": reason,
            "schedule": store.load_schedule()?,
        }),
    };
    emit_ok(output_mode, payload).map_err(CliError::internal)
}

pub(crate) fn run_phase(
    data_dir: &Path,
    now: Option<&str>,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let now = resolve_now(now)?;
    let schedule = LocalFsStore::new(data_dir).load_schedule()?;
    let resolution = match &schedule {
        Some(s) => resolve_schedule(s, now),
        None => resolve_phase(&ScheduleTimes::default(), now),
    };
    emit_ok(
        output_mode,
        json!({
            "command": "phase",
            "roundNumber": schedule.as_ref().map(|s| s.round_number),
            "resolution": resolution,
        }),
    )
    .map_err(CliError::internal)
}

pub(crate) fn run_publish(
    data_dir: &Path,
    now: Option<&str>,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let now = resolve_now(now)?;
    let state = publish(&LocalFsStore::new(data_dir), now)?;
    emit_ok(
        output_mode,
        json!({
            "command": "publish",
            "status": "ok",
            "state": state,
        }),
    )
    .map_err(CliError::internal)
}

pub(crate) fn run_snapshot(
    data_dir: &Path,
    round: Option<u64>,
    mint: Option<String>,
    max_holders: Option<usize>,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let mint = match mint {
        Some(mint) => mint,
        None => env_required(ENV_TOKEN_MINT)?,
    };
    let max_holders = max_holders.unwrap_or_else(|| env_usize(ENV_MAX_HOLDERS, 100));
    let store = LocalFsStore::new(data_dir);
    let round = match round {
        Some(round) => round,
        None => store
            .load_schedule()?
            .map(|s| s.round_number)
            .ok_or_else(|| {
                CliError::usage("no schedule stored; pass --round to name the snapshot round")
            })?,
    };
    let source = JsonRpcHolderSource::new(
        env_string(ENV_RPC_URL, DEFAULT_RPC_URL),
        env_duration_ms(ENV_RPC_TIMEOUT_MS, 30_000),
    );
    info!(round, mint = %mint, rpc = source.url(), max_holders, "taking holder snapshot");
    let payload = match take_holder_snapshot(&store, &source, round, &mint, max_holders)? {
        SnapshotOutcome::Written(snapshot) => json!({
            "command": "snapshot",
            "status": "written",
            "round": round,
            "holders": snapshot.len(),
            "totalAmount": snapshot.total_amount(),
            "path": store.layout().holder_snapshot(round),
        }),
        SnapshotOutcome::AlreadyPresent => json!({
            "command": "snapshot",
            "status": "already_present",
            "round": round,
            "path": store.layout().holder_snapshot(round),
        }),
    };
    emit_ok(output_mode, payload).map_err(CliError::internal)
}

pub(crate) fn run_schedule_show(data_dir: &Path, output_mode: OutputMode) -> Result<(), CliError> {
    let schedule = LocalFsStore::new(data_dir).load_schedule()?;
    emit_ok(
        output_mode,
        json!({"command": "schedule show", "schedule": schedule}),
    )
    .map_err(CliError::internal)
}

pub(crate) fn run_schedule_set_mode(
    data_dir: &Path,
    mode: &str,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let mode = ScheduleMode::parse(mode).map_err(|e| CliError::usage(&e))?;
    let store = LocalFsStore::new(data_dir);
    let mut schedule = store
        .load_schedule()?
        .unwrap_or_else(|| Schedule::empty(mode));
    let previous = schedule.mode;
    schedule.mode = mode;
    store.save_schedule(&schedule)?;
    info!(round = schedule.round_number, from = %previous, to = %mode, "schedule mode updated");
    emit_ok(
        output_mode,
        json!({"command": "schedule set-mode", "status": "ok", "schedule": schedule}),
    )
    .map_err(CliError::internal)
}

pub(crate) fn run_schedule_set(
    data_dir: &Path,
    milestones: [String; 5],
    round: Option<u64>,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let store = LocalFsStore::new(data_dir);
    let round = match round {
        Some(round) => round,
        None => store
            .load_schedule()?
            .map_or(1, |s| s.round_number.saturating_add(1)),
    };
    let [snapshot_at, opens_at, closes_at, starts_at, done_at] = milestones;
    let draft = Schedule {
        mode: ScheduleMode::Manual,
        round_number: round,
        snapshot_at: Some(snapshot_at),
        window_opens_at: Some(opens_at),
        window_closes_at: Some(closes_at),
        distribution_starts_at: Some(starts_at),
        distribution_done_at: Some(done_at),
    };
    let times = draft.validate_strict()?;
    let schedule = Schedule::from_times(ScheduleMode::Manual, round, &times);
    store.save_schedule(&schedule)?;
    info!(round, "manual schedule written");
    emit_ok(
        output_mode,
        json!({"command": "schedule set", "status": "ok", "schedule": schedule}),
    )
    .map_err(CliError::internal)
}

pub(crate) fn run_analytics(data_dir: &Path, output_mode: OutputMode) -> Result<(), CliError> {
    let file = LocalFsStore::new(data_dir).load_analytics()?;
    emit_ok(
        output_mode,
        json!({"command": "analytics", "analytics": derive_analytics_view(&file)}),
    )
    .map_err(CliError::internal)
}
