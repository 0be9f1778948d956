//! Domain model for reward items, reward slots and tracks.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::month::MonthKey;

/// An immutable stack of a single item type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardItemStack {
    pub item_id: String,
    pub count: u32,
}

impl RewardItemStack {
    pub fn new(item_id: impl Into<String>, count: u32) -> Self {
        Self {
            item_id: item_id.into(),
            count,
        }
    }

    /// Single item stack
    pub fn single(item_id: impl Into<String>) -> Self {
        Self::new(item_id, 1)
    }
}

impl fmt::Display for RewardItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "{}", self.item_id)
        } else {
            write!(f, "{}:{}", self.item_id, self.count)
        }
    }
}

/// What a single day of an allocation or ledger holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardKind {
    Normal(RewardItemStack),
    /// Day is consumed without handing anything out
    SkipDay,
    /// Day is consumed but the slot stays locked
    LockDay,
    /// The stack of this day was already taken by the player
    Taken,
    Empty,
}

impl RewardKind {
    pub fn item(stack: RewardItemStack) -> Self {
        RewardKind::Normal(stack)
    }

    pub fn as_stack(&self) -> Option<&RewardItemStack> {
        match self {
            RewardKind::Normal(stack) => Some(stack),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RewardKind::Empty)
    }

    /// Whether the scheduler may hand this slot out as a day's reward
    pub fn is_grantable(&self) -> bool {
        matches!(
            self,
            RewardKind::Normal(_) | RewardKind::SkipDay | RewardKind::LockDay
        )
    }

    /// A granted slot still waiting to be taken
    pub fn is_unclaimed(&self) -> bool {
        matches!(self, RewardKind::Normal(_))
    }
}

impl Default for RewardKind {
    fn default() -> Self {
        RewardKind::Empty
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardKind::Normal(stack) => write!(f, "{}", stack),
            RewardKind::SkipDay => write!(f, "<skip day>"),
            RewardKind::LockDay => write!(f, "<lock day>"),
            RewardKind::Taken => write!(f, "<taken>"),
            RewardKind::Empty => write!(f, "<empty>"),
        }
    }
}

/// The two parallel reward programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    General,
    Special,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::General, Track::Special];

    pub fn as_str(&self) -> &'static str {
        match self {
            Track::General => "general",
            Track::Special => "special",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Track::General),
            "special" => Ok(Track::Special),
            _ => Err(RewardError::UnknownTrack(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewardError {
    #[error("Invalid month: {0}. Must be 1-12")]
    InvalidMonth(u32),
    #[error("Invalid month key: {0}. Expected YYYY-MM")]
    InvalidMonthKey(String),
    #[error("Unknown track: {0}")]
    UnknownTrack(String),
    #[error("Item spec cannot be empty")]
    EmptyItemSpec,
    #[error("Invalid item count in spec: {0}")]
    InvalidItemCount(String),
    #[error("Unknown item: {0}")]
    UnknownItem(String),
    #[error("Invalid day {day}: {month} has {days_in_month} days")]
    InvalidDay {
        day: u32,
        month: MonthKey,
        days_in_month: u32,
    },
    #[error("Day {0} has not been rewarded yet")]
    DayNotRewarded(u32),
    #[error("All {0} days of the month have already been rewarded")]
    MonthComplete(u32),
    #[error("Nothing has been rewarded this month")]
    NothingRewarded,
}
