//! Domain models for a month's allocation and a player's monthly ledger record.
use serde::{Deserialize, Serialize};

use super::month::MonthKey;
use super::reward::{RewardKind, Track};

/// Rewards of one track for one month, index 0 is day 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAllocation {
    pub month: MonthKey,
    pub slots: Vec<RewardKind>,
}

impl MonthlyAllocation {
    pub fn new(month: MonthKey, slots: Vec<RewardKind>) -> Self {
        Self { month, slots }
    }

    pub fn empty(month: MonthKey) -> Self {
        Self::new(month, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at a 0-based index
    pub fn slot(&self, index: usize) -> Option<&RewardKind> {
        self.slots.get(index)
    }

    /// A stored allocation is only usable if it has no rewards or one per day
    pub fn has_valid_length(&self) -> bool {
        self.slots.is_empty() || self.slots.len() == self.month.days_in_month() as usize
    }
}

/// Identifies one player's record within a track and month
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKey {
    pub track: Track,
    pub month: MonthKey,
    pub player_id: String,
}

impl LedgerKey {
    pub fn new(track: Track, month: MonthKey, player_id: impl Into<String>) -> Self {
        Self {
            track,
            month,
            player_id: player_id.into(),
        }
    }
}

/// Claimed days and granted items of one player in one month
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMonthRecord {
    pub rewarded_days: u32,
    /// `YYYY-MM-DD` of the latest grant, empty iff `rewarded_days == 0`
    #[serde(default)]
    pub last_rewarded_day: String,
    #[serde(default)]
    pub granted_items: Vec<RewardKind>,
}

impl PlayerMonthRecord {
    /// Slot granted for a 1-based day
    pub fn item_for_day(&self, day: u32) -> Option<&RewardKind> {
        let index = (day as usize).checked_sub(1)?;
        self.granted_items.get(index)
    }

    pub fn has_unclaimed_rewards(&self) -> bool {
        self.granted_items.iter().any(RewardKind::is_unclaimed)
    }
}
