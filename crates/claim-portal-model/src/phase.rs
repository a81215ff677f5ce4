// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stage of a round derived from the five schedule milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Scheduled,
    Snapshot,
    Open,
    Closed,
    Distribution,
    Done,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Self::Scheduled,
        Self::Snapshot,
        Self::Open,
        Self::Closed,
        Self::Distribution,
        Self::Done,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Snapshot => "snapshot",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Distribution => "distribution",
            Self::Done => "done",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
