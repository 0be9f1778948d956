use shared::{AllocationResponse, PlayerRewardsResponse, RewardItem, RewardSlot};

use crate::backend::domain::models::{
    MonthKey, MonthlyAllocation, PlayerMonthRecord, RewardItemStack, RewardKind, Track,
};

pub struct RewardMapper;

impl RewardMapper {
    /// Convert a domain RewardKind to the shared RewardSlot DTO
    pub fn to_slot_dto(kind: &RewardKind) -> RewardSlot {
        match kind {
            RewardKind::Normal(stack) => RewardSlot::Item {
                item_id: stack.item_id.clone(),
                count: stack.count,
            },
            RewardKind::SkipDay => RewardSlot::SkipDay,
            RewardKind::LockDay => RewardSlot::LockDay,
            RewardKind::Taken => RewardSlot::Taken,
            RewardKind::Empty => RewardSlot::Empty,
        }
    }

    pub fn to_slot_dto_list(kinds: &[RewardKind]) -> Vec<RewardSlot> {
        kinds.iter().map(Self::to_slot_dto).collect()
    }

    pub fn to_item_dto(stack: RewardItemStack) -> RewardItem {
        RewardItem {
            item_id: stack.item_id,
            count: stack.count,
        }
    }

    pub fn to_allocation_response(track: Track, allocation: &MonthlyAllocation) -> AllocationResponse {
        AllocationResponse {
            track: track.to_string(),
            year: allocation.month.year,
            month: allocation.month.month,
            days_in_month: allocation.month.days_in_month(),
            slots: Self::to_slot_dto_list(&allocation.slots),
        }
    }

    /// `today` decides `rewarded_today`; it is not part of the record itself
    pub fn to_player_response(
        player_id: &str,
        track: Track,
        month: MonthKey,
        record: &PlayerMonthRecord,
        today: &str,
    ) -> PlayerRewardsResponse {
        PlayerRewardsResponse {
            player_id: player_id.to_string(),
            track: track.to_string(),
            year: month.year,
            month: month.month,
            rewarded_days: record.rewarded_days,
            last_rewarded_day: record.last_rewarded_day.clone(),
            rewarded_today: !today.is_empty() && record.last_rewarded_day == today,
            has_unclaimed_rewards: record.has_unclaimed_rewards(),
            granted_items: Self::to_slot_dto_list(&record.granted_items),
        }
    }
}
