use crate::EngineError;
use claim_portal_model::{HolderEntry, HolderSnapshot};
use claim_portal_store::{HolderSource, SnapshotStore, TokenAccountBalance};
use std::collections::BTreeMap;
use tracing::info;

/// Sums finite balances per owner, drops empty totals, orders by
/// amount descending then wallet ascending, and keeps the first `max_holders`.
#[must_use]
pub fn build_holder_snapshot(balances: &[TokenAccountBalance], max_holders: usize) -> HolderSnapshot {
    let mut per_owner: BTreeMap<&str, f64> = BTreeMap::new();
    for balance in balances.iter().filter(|b| b.amount.is_finite()) {
        *per_owner.entry(balance.owner.as_str()).or_default() += balance.amount;
    }
    let mut holders: Vec<HolderEntry> = per_owner
        .into_iter()
        .filter(|(_, amount)| amount.is_finite() && *amount > 0.0)
        .map(|(wallet, amount)| HolderEntry {
            wallet: wallet.to_string(),
            amount,
        })
        .collect();
    holders.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.wallet.cmp(&b.wallet))
    });
    holders.truncate(max_holders);
    HolderSnapshot { holders }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    Written(HolderSnapshot),
    /// The round already has a snapshot; nothing was fetched.
    AlreadyPresent,
}

pub fn take_holder_snapshot<S, H>(
    store: &S,
    source: &H,
    round_number: u64,
    mint: &str,
    max_holders: usize,
) -> Result<SnapshotOutcome, EngineError>
where
    S: SnapshotStore + ?Sized,
    H: HolderSource + ?Sized,
{
    if store.holder_snapshot_exists(round_number)? {
        info!(round = round_number, "holder snapshot already taken");
        return Ok(SnapshotOutcome::AlreadyPresent);
    }
    let balances = source.fetch_token_balances(mint)?;
    let snapshot = build_holder_snapshot(&balances, max_holders);
    store.write_holder_snapshot(round_number, &snapshot)?;
    info!(
        round = round_number,
        accounts = balances.len(),
        holders = snapshot.len(),
        "holder snapshot written"
    );
    Ok(SnapshotOutcome::Written(snapshot))
}
