use crate::{CliError, OutputMode};
use chrono::{DateTime, Utc};
use claim_portal_core::canonical;
use claim_portal_engine::{ClockAdapter, SystemClock};
use claim_portal_model::parse_timestamp;
use serde_json::Value;

pub(crate) fn emit_ok(output_mode: OutputMode, payload: Value) -> Result<(), String> {
    if output_mode.json {
        let bytes = canonical::stable_json_bytes(&payload).map_err(|e| e.to_string())?;
        let text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
        );
    }
    Ok(())
}

/// `--now` override, or wall time.
pub(crate) fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>, CliError> {
    match raw {
        Some(raw) => parse_timestamp(raw).map_err(|e| CliError::usage(&format!("invalid --now: {e}"))),
        None => Ok(SystemClock.now()),
    }
}
