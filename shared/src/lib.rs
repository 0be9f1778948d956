use serde::{Deserialize, Serialize};

/// A concrete item stack handed to a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    /// Registry identifier, e.g. `minecraft:diamond`
    pub item_id: String,
    pub count: u32,
}

/// One day of an allocation or of a player's ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardSlot {
    /// A stack that can be (or could have been) taken
    Item { item_id: String, count: u32 },
    /// Day counts as claimed, nothing to take
    SkipDay,
    /// Day counts as claimed, locked until an admin replaces it
    LockDay,
    /// The player already took the stack
    Taken,
    /// No reward in this slot
    Empty,
}

/// Reward allocation of one track for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub track: String,
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// Index 0 is day 1. Empty when the month has no rewards.
    pub slots: Vec<RewardSlot>,
}

/// Ledger state of a player for one track and month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRewardsResponse {
    pub player_id: String,
    pub track: String,
    pub year: i32,
    pub month: u32,
    pub rewarded_days: u32,
    /// `YYYY-MM-DD` of the latest grant, empty when nothing was granted
    pub last_rewarded_day: String,
    pub rewarded_today: bool,
    pub has_unclaimed_rewards: bool,
    pub granted_items: Vec<RewardSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeRewardResponse {
    pub day: u32,
    /// The stack that was taken, `None` if the slot held nothing to take
    pub item: Option<RewardItem>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSessionRequest {
    pub player_id: String,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveSessionRequest {
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success_message: String,
}

/// Body for admin endpoints that place an item into a player's ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRewardRequest {
    /// Item spec in `itemId` or `itemId:count` form
    pub item: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRewardResponse {
    pub day: u32,
    pub rewarded_days: u32,
    pub slot: RewardSlot,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminActionResponse {
    pub success_message: String,
}
