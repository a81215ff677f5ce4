// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HolderEntry {
    pub wallet: String,
    pub amount: f64,
}

/// Balances for one round, largest first. Persisted as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderSnapshot {
    pub holders: Vec<HolderEntry>,
}

impl HolderSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.holders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.holders.iter().map(|h| h.amount).sum()
    }

    /// Descending by amount with no NaN entries.
    #[must_use]
    pub fn is_sorted_descending(&self) -> bool {
        self.holders.iter().all(|h| !h.amount.is_nan())
            && self.holders.windows(2).all(|w| w[0].amount >= w[1].amount)
    }
}
