// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStats {
    pub round_number: u64,
    pub eligible_holders: u64,
    pub claimants: u64,
    pub tokens_distributed: f64,
}

/// The static analytics source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFile {
    #[serde(default)]
    pub rounds: Vec<RoundStats>,
}

/// Aggregates served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub total_rounds: u64,
    pub total_distributed: f64,
    pub total_claimants: u64,
    pub average_claim_rate: Option<f64>,
    pub latest_round: Option<RoundStats>,
}
