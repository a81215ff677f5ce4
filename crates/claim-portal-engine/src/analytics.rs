use claim_portal_model::{AnalyticsFile, AnalyticsView};

/// `averageClaimRate` is the mean of `claimants / eligibleHolders` over
/// rounds with at least one eligible holder.
#[must_use]
pub fn derive_analytics_view(file: &AnalyticsFile) -> AnalyticsView {
    let rates: Vec<f64> = file
        .rounds
        .iter()
        .filter(|r| r.eligible_holders > 0)
        .map(|r| r.claimants as f64 / r.eligible_holders as f64)
        .collect();
    let average_claim_rate = if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    };
    AnalyticsView {
        total_rounds: file.rounds.len() as u64,
        total_distributed: file.rounds.iter().map(|r| r.tokens_distributed).sum(),
        total_claimants: file.rounds.iter().map(|r| r.claimants).sum(),
        average_claim_rate,
        latest_round: file.rounds.iter().max_by_key(|r| r.round_number).cloned(),
    }
}
