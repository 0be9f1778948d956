//! Player reward ledger.
//!
//! Holds one `PlayerMonthRecord` per `(track, month, player)`. Records that do
//! not exist read as the zero value and are created on the first mutation.
//!
//! Every mutation copies the current record, edits the copy and swaps it into
//! the map under a single write lock, so a caller never observes a half-applied
//! change. Mutated keys are collected in a dirty set that the persistence flush
//! drains; the ledger itself never touches storage.

use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::backend::domain::calendar::Clock;
use crate::backend::domain::models::{
    LedgerKey, MonthKey, MonthlyAllocation, PlayerMonthRecord, RewardError, RewardItemStack,
    RewardKind, Track,
};

pub struct PlayerRewardLedger {
    clock: Arc<dyn Clock>,
    records: RwLock<HashMap<LedgerKey, PlayerMonthRecord>>,
    dirty: Mutex<HashSet<LedgerKey>>,
}

impl PlayerRewardLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            records: RwLock::new(HashMap::new()),
            dirty: Mutex::new(HashSet::new()),
        }
    }

    /// Snapshot of a record, zero valued if it does not exist
    pub fn record(&self, key: &LedgerKey) -> PlayerMonthRecord {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_rewarded_today(&self, key: &LedgerKey, today: &str) -> bool {
        self.read(key, |record| record.last_rewarded_day == today)
    }

    pub fn rewarded_days(&self, key: &LedgerKey) -> u32 {
        self.read(key, |record| record.rewarded_days)
    }

    pub fn has_unclaimed_rewards(&self, key: &LedgerKey) -> bool {
        self.read(key, PlayerMonthRecord::has_unclaimed_rewards)
    }

    pub fn mark_rewarded_today(&self, key: &LedgerKey, today: &str) {
        self.update(key, |record| {
            record.last_rewarded_day = today.to_string();
        });
    }

    /// Count one more claimed day, capped at the month's day count
    pub fn increase_rewarded_days(&self, key: &LedgerKey) -> u32 {
        let days_in_month = key.month.days_in_month();
        let today = self.clock.today();
        self.update(key, |record| {
            if record.rewarded_days < days_in_month {
                record.rewarded_days += 1;
            }
            if record.rewarded_days > 0 && record.last_rewarded_day.is_empty() {
                record.last_rewarded_day = today;
            }
            record.rewarded_days
        })
    }

    /// Count one claimed day less, never below zero
    pub fn decrease_rewarded_days(&self, key: &LedgerKey) -> u32 {
        self.update(key, |record| {
            record.rewarded_days = record.rewarded_days.saturating_sub(1);
            if record.rewarded_days == 0 {
                record.last_rewarded_day.clear();
            }
            record.rewarded_days
        })
    }

    /// Store `item` for a 1-based day, replacing whatever the day held.
    ///
    /// The caller keeps `day` in line with `rewarded_days`; a day past the end
    /// of the list pads the gap with `Empty` slots.
    pub fn grant_item_for_day(&self, key: &LedgerKey, day: u32, item: RewardKind) {
        let Some(index) = (day as usize).checked_sub(1) else {
            debug!("Ignoring grant for day 0 of {:?}", key);
            return;
        };
        self.update(key, |record| place_item(record, index, item));
    }

    /// Record today's reward in one step: pick the allocation slot right after
    /// the days already claimed, stamp the date, count the day and store the
    /// slot. The slot is chosen under the same write lock as the commit.
    pub fn commit_daily_grant(
        &self,
        key: &LedgerKey,
        today: &str,
        allocation: &MonthlyAllocation,
    ) -> Result<(u32, RewardKind), GrantRefusal> {
        let days_in_month = key.month.days_in_month();
        self.try_update(key, |record| {
            let claimed = record.rewarded_days;
            if claimed >= days_in_month {
                return Err(GrantRefusal::MonthComplete);
            }
            let slot = match allocation.slot(claimed as usize) {
                Some(slot) if slot.is_grantable() => slot.clone(),
                Some(slot) => {
                    return Err(GrantRefusal::NotGrantable {
                        day: claimed + 1,
                        slot: slot.clone(),
                    })
                }
                None => return Err(GrantRefusal::NoSlot { rewarded_days: claimed }),
            };
            let day = claimed + 1;
            record.rewarded_days = day;
            record.last_rewarded_day = today.to_string();
            place_item(record, (day - 1) as usize, slot.clone());
            Ok((day, slot))
        })
    }

    /// Store `item` as the day after the last claimed one and count it.
    /// Returns the new day.
    pub fn append_day(&self, key: &LedgerKey, item: RewardKind) -> Result<u32, RewardError> {
        let days_in_month = key.month.days_in_month();
        let today = self.clock.today();
        self.try_update(key, |record| {
            if record.rewarded_days >= days_in_month {
                return Err(RewardError::MonthComplete(days_in_month));
            }
            let day = record.rewarded_days + 1;
            place_item(record, (day - 1) as usize, item);
            record.rewarded_days = day;
            if record.last_rewarded_day.is_empty() {
                record.last_rewarded_day = today;
            }
            Ok(day)
        })
    }

    /// Drop the last claimed day together with its item.
    /// Returns the remaining day count and the removed slot.
    pub fn remove_last_day(&self, key: &LedgerKey) -> Result<(u32, Option<RewardKind>), RewardError> {
        self.try_update(key, |record| {
            let day = record.rewarded_days;
            if day == 0 {
                return Err(RewardError::NothingRewarded);
            }
            let removed = remove_item_at(record, (day - 1) as usize);
            record.rewarded_days = day - 1;
            if record.rewarded_days == 0 {
                record.last_rewarded_day.clear();
            }
            Ok((record.rewarded_days, removed))
        })
    }

    /// Remove the item of a 1-based day. Later days keep their positions, so a
    /// day in the middle becomes `Empty`. Returns the removed slot.
    pub fn remove_item_for_day(&self, key: &LedgerKey, day: u32) -> Option<RewardKind> {
        let index = (day as usize).checked_sub(1)?;
        if index >= self.read(key, |record| record.granted_items.len()) {
            return None;
        }
        self.update(key, |record| remove_item_at(record, index))
    }

    /// Mark a granted stack as taken and return it.
    /// Returns `None` when the day holds nothing that can be taken.
    pub fn take_reward_for_day(&self, key: &LedgerKey, day: u32) -> Option<RewardItemStack> {
        let index = (day as usize).checked_sub(1)?;
        let takeable = self.read(key, |record| {
            matches!(record.granted_items.get(index), Some(RewardKind::Normal(_)))
        });
        if !takeable {
            return None;
        }
        self.update(key, |record| {
            let slot = record.granted_items.get_mut(index)?;
            match std::mem::replace(slot, RewardKind::Taken) {
                RewardKind::Normal(stack) => Some(stack),
                other => {
                    *slot = other;
                    None
                }
            }
        })
    }

    /// Reset a player's month to the zero value. Returns whether a record existed.
    pub fn clear_month(&self, key: &LedgerKey) -> bool {
        let removed = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();
        self.mark_dirty(std::iter::once(key.clone()));
        removed
    }

    /// Reset every player of a track and month. Returns the number of records removed.
    pub fn reset_month(&self, track: Track, month: MonthKey) -> usize {
        let removed: Vec<LedgerKey> = {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            let keys: Vec<LedgerKey> = records
                .keys()
                .filter(|key| key.track == track && key.month == month)
                .cloned()
                .collect();
            for key in &keys {
                records.remove(key);
            }
            keys
        };
        let count = removed.len();
        self.mark_dirty(removed);
        count
    }

    /// All records of a track and month, sorted by player id
    pub fn records_for_month(&self, track: Track, month: MonthKey) -> Vec<(String, PlayerMonthRecord)> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut result: Vec<(String, PlayerMonthRecord)> = records
            .iter()
            .filter(|(key, _)| key.track == track && key.month == month)
            .map(|(key, record)| (key.player_id.clone(), record.clone()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }

    /// Load a stored record without marking it dirty. An in-memory record wins.
    pub fn restore(&self, key: LedgerKey, record: PlayerMonthRecord) -> bool {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&key) {
            return false;
        }
        records.insert(key, record);
        true
    }

    /// Drain the dirty set. `None` means the record was removed and should be deleted.
    pub fn take_dirty(&self) -> Vec<(LedgerKey, Option<PlayerMonthRecord>)> {
        let keys: Vec<LedgerKey> = self
            .dirty
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        keys.into_iter()
            .map(|key| {
                let record = records.get(&key).cloned();
                (key, record)
            })
            .collect()
    }

    pub fn mark_dirty<I: IntoIterator<Item = LedgerKey>>(&self, keys: I) {
        self.dirty
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(keys);
    }

    fn read<T>(&self, key: &LedgerKey, f: impl FnOnce(&PlayerMonthRecord) -> T) -> T {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        match records.get(key) {
            Some(record) => f(record),
            None => f(&PlayerMonthRecord::default()),
        }
    }

    fn update<T>(&self, key: &LedgerKey, f: impl FnOnce(&mut PlayerMonthRecord) -> T) -> T {
        let result = {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            let mut record = records.get(key).cloned().unwrap_or_default();
            let result = f(&mut record);
            records.insert(key.clone(), record);
            result
        };
        self.mark_dirty(std::iter::once(key.clone()));
        result
    }

    /// Like `update`, but the edited copy is only stored when `f` succeeds
    fn try_update<T, E>(
        &self,
        key: &LedgerKey,
        f: impl FnOnce(&mut PlayerMonthRecord) -> Result<T, E>,
    ) -> Result<T, E> {
        let result = {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            let mut record = records.get(key).cloned().unwrap_or_default();
            let result = f(&mut record)?;
            records.insert(key.clone(), record);
            result
        };
        self.mark_dirty(std::iter::once(key.clone()));
        Ok(result)
    }
}

/// Why `commit_daily_grant` handed nothing out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantRefusal {
    /// Every day of the month is already claimed
    MonthComplete,
    /// The allocation has no slot after the claimed days
    NoSlot { rewarded_days: u32 },
    /// The slot for `day` holds nothing that can be granted
    NotGrantable { day: u32, slot: RewardKind },
}

fn remove_item_at(record: &mut PlayerMonthRecord, index: usize) -> Option<RewardKind> {
    if index >= record.granted_items.len() {
        return None;
    }
    let removed = if index + 1 == record.granted_items.len() {
        record.granted_items.pop()
    } else {
        Some(std::mem::replace(
            &mut record.granted_items[index],
            RewardKind::Empty,
        ))
    };
    while matches!(record.granted_items.last(), Some(RewardKind::Empty)) {
        record.granted_items.pop();
    }
    removed
}

fn place_item(record: &mut PlayerMonthRecord, index: usize, item: RewardKind) {
    if index < record.granted_items.len() {
        record.granted_items[index] = item;
    } else {
        record.granted_items.resize(index, RewardKind::Empty);
        record.granted_items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::calendar::FixedClock;

    fn setup() -> (PlayerRewardLedger, LedgerKey) {
        let clock = Arc::new(FixedClock::from_ymd(2026, 2, 10));
        let ledger = PlayerRewardLedger::new(clock);
        let key = LedgerKey::new(Track::General, MonthKey::new(2026, 2).unwrap(), "player-1");
        (ledger, key)
    }

    fn item(id: &str) -> RewardKind {
        RewardKind::item(RewardItemStack::single(id))
    }

    fn assert_invariant(record: &PlayerMonthRecord) {
        assert_eq!(
            record.rewarded_days == 0,
            record.last_rewarded_day.is_empty(),
            "invariant broken: {:?}",
            record
        );
    }

    #[test]
    fn test_fresh_record_grant_then_increase() {
        let (ledger, key) = setup();
        assert_eq!(ledger.record(&key), PlayerMonthRecord::default());

        ledger.grant_item_for_day(&key, 1, item("x"));
        assert_eq!(ledger.increase_rewarded_days(&key), 1);

        let record = ledger.record(&key);
        assert_eq!(record.rewarded_days, 1);
        assert_eq!(record.granted_items[0], item("x"));
        assert_invariant(&record);
    }

    #[test]
    fn test_has_rewarded_today_matches_exact_date() {
        let (ledger, key) = setup();
        assert!(!ledger.has_rewarded_today(&key, "2026-02-10"));

        ledger.mark_rewarded_today(&key, "2026-02-10");
        assert!(ledger.has_rewarded_today(&key, "2026-02-10"));
        assert!(!ledger.has_rewarded_today(&key, "2026-02-11"));
        assert!(!ledger.has_rewarded_today(&key, ""));

        ledger.mark_rewarded_today(&key, "2026-02-10");
        assert!(ledger.has_rewarded_today(&key, "2026-02-10"));
    }

    #[test]
    fn test_increase_is_capped_at_days_in_month() {
        let (ledger, key) = setup();
        for _ in 0..40 {
            ledger.increase_rewarded_days(&key);
        }
        assert_eq!(ledger.rewarded_days(&key), 28);
        assert_eq!(ledger.increase_rewarded_days(&key), 28);
    }

    #[test]
    fn test_decrease_is_floored_at_zero_and_clears_date() {
        let (ledger, key) = setup();
        assert_eq!(ledger.decrease_rewarded_days(&key), 0);

        ledger.mark_rewarded_today(&key, "2026-02-10");
        ledger.increase_rewarded_days(&key);
        ledger.increase_rewarded_days(&key);
        assert_eq!(ledger.decrease_rewarded_days(&key), 1);
        assert_eq!(ledger.record(&key).last_rewarded_day, "2026-02-10");
        assert_eq!(ledger.decrease_rewarded_days(&key), 0);

        let record = ledger.record(&key);
        assert!(record.last_rewarded_day.is_empty());
        assert_invariant(&record);
    }

    #[test]
    fn test_invariant_holds_across_operation_sequences() {
        let (ledger, key) = setup();
        let operations: [&dyn Fn(&PlayerRewardLedger); 7] = [
            &|l: &PlayerRewardLedger| {
                l.increase_rewarded_days(&key);
            },
            &|l: &PlayerRewardLedger| {
                l.decrease_rewarded_days(&key);
            },
            &|l: &PlayerRewardLedger| l.mark_rewarded_today(&key, "2026-02-10"),
            &|l: &PlayerRewardLedger| l.grant_item_for_day(&key, 2, item("y")),
            &|l: &PlayerRewardLedger| {
                l.remove_item_for_day(&key, 2);
            },
            &|l: &PlayerRewardLedger| {
                let _ = l.commit_daily_grant(&key, "2026-02-10", &full_month(item("z")));
            },
            &|l: &PlayerRewardLedger| {
                l.clear_month(&key);
            },
        ];
        // A bare mark on an empty record is the one step that leaves the date
        // ahead of the count; the next increase or grant brings them back in line.
        let sequence = [0, 0, 1, 1, 1, 3, 0, 4, 1, 2, 0, 6, 5, 5, 1, 1, 0, 0, 3, 1, 1, 1, 5];
        for step in sequence {
            operations[step](&ledger);
            let record = ledger.record(&key);
            if step != 2 {
                assert_invariant(&record);
            }
        }
    }

    fn full_month(slot: RewardKind) -> MonthlyAllocation {
        MonthlyAllocation::new(MonthKey::new(2026, 2).unwrap(), vec![slot; 28])
    }

    #[test]
    fn test_commit_daily_grant_follows_claimed_days() {
        let (ledger, key) = setup();
        let mut slots = vec![item("a"), item("b")];
        slots.resize(28, item("c"));
        let allocation = MonthlyAllocation::new(key.month, slots);

        assert_eq!(
            ledger.commit_daily_grant(&key, "2026-02-01", &allocation),
            Ok((1, item("a")))
        );
        assert_eq!(
            ledger.commit_daily_grant(&key, "2026-02-02", &allocation),
            Ok((2, item("b")))
        );

        let record = ledger.record(&key);
        assert_eq!(record.rewarded_days, 2);
        assert_eq!(record.last_rewarded_day, "2026-02-02");
        assert_eq!(record.granted_items, vec![item("a"), item("b")]);
    }

    #[test]
    fn test_commit_daily_grant_stops_at_month_end() {
        let (ledger, key) = setup();
        let allocation = full_month(item("a"));
        for day in 1..=28 {
            assert_eq!(
                ledger.commit_daily_grant(&key, "2026-02-10", &allocation),
                Ok((day, item("a")))
            );
        }
        assert_eq!(
            ledger.commit_daily_grant(&key, "2026-02-10", &allocation),
            Err(GrantRefusal::MonthComplete)
        );
        assert_eq!(ledger.record(&key).granted_items.len(), 28);
    }

    #[test]
    fn test_commit_daily_grant_refusals_leave_record_untouched() {
        let (ledger, key) = setup();
        let empty = MonthlyAllocation::empty(key.month);
        assert_eq!(
            ledger.commit_daily_grant(&key, "2026-02-10", &empty),
            Err(GrantRefusal::NoSlot { rewarded_days: 0 })
        );

        let mut slots = vec![RewardKind::Empty];
        slots.resize(28, item("a"));
        let holey = MonthlyAllocation::new(key.month, slots);
        assert_eq!(
            ledger.commit_daily_grant(&key, "2026-02-10", &holey),
            Err(GrantRefusal::NotGrantable {
                day: 1,
                slot: RewardKind::Empty
            })
        );

        assert_eq!(ledger.record(&key), PlayerMonthRecord::default());
        assert!(ledger.take_dirty().is_empty());
    }

    #[test]
    fn test_commit_daily_grant_picks_slot_after_admin_edits() {
        let (ledger, key) = setup();
        let mut slots = vec![item("a"), item("b"), item("c")];
        slots.resize(28, item("d"));
        let allocation = MonthlyAllocation::new(key.month, slots);

        assert_eq!(ledger.append_day(&key, item("manual")), Ok(1));
        assert_eq!(
            ledger.commit_daily_grant(&key, "2026-02-10", &allocation),
            Ok((2, item("b")))
        );

        assert_eq!(ledger.remove_last_day(&key), Ok((1, Some(item("b")))));
        assert_eq!(ledger.remove_last_day(&key), Ok((0, Some(item("manual")))));
        assert_eq!(
            ledger.commit_daily_grant(&key, "2026-02-11", &allocation),
            Ok((1, item("a")))
        );
        assert_eq!(ledger.record(&key).granted_items, vec![item("a")]);
    }

    #[test]
    fn test_append_and_remove_last_day_keep_count_and_items_in_step() {
        let (ledger, key) = setup();
        assert_eq!(ledger.remove_last_day(&key), Err(RewardError::NothingRewarded));

        for day in 1..=28 {
            assert_eq!(ledger.append_day(&key, item("a")), Ok(day));
            assert_invariant(&ledger.record(&key));
        }
        assert_eq!(ledger.append_day(&key, item("a")), Err(RewardError::MonthComplete(28)));
        assert_eq!(ledger.record(&key).last_rewarded_day, "2026-02-10");

        for remaining in (0..28).rev() {
            assert_eq!(ledger.remove_last_day(&key), Ok((remaining, Some(item("a")))));
            assert_invariant(&ledger.record(&key));
        }
        assert_eq!(ledger.record(&key), PlayerMonthRecord::default());
    }

    #[test]
    fn test_grant_replaces_existing_day() {
        let (ledger, key) = setup();
        ledger.grant_item_for_day(&key, 1, item("a"));
        ledger.grant_item_for_day(&key, 2, item("b"));
        ledger.grant_item_for_day(&key, 1, item("c"));
        assert_eq!(ledger.record(&key).granted_items, vec![item("c"), item("b")]);
    }

    #[test]
    fn test_grant_past_end_pads_with_empty() {
        let (ledger, key) = setup();
        ledger.grant_item_for_day(&key, 3, item("a"));
        assert_eq!(
            ledger.record(&key).granted_items,
            vec![RewardKind::Empty, RewardKind::Empty, item("a")]
        );
        ledger.grant_item_for_day(&key, 0, item("ignored"));
        assert_eq!(ledger.record(&key).granted_items.len(), 3);
    }

    #[test]
    fn test_remove_item_for_day() {
        let (ledger, key) = setup();
        ledger.grant_item_for_day(&key, 1, item("a"));
        ledger.grant_item_for_day(&key, 2, item("b"));
        ledger.grant_item_for_day(&key, 3, item("c"));

        assert_eq!(ledger.remove_item_for_day(&key, 2), Some(item("b")));
        assert_eq!(
            ledger.record(&key).granted_items,
            vec![item("a"), RewardKind::Empty, item("c")]
        );

        assert_eq!(ledger.remove_item_for_day(&key, 3), Some(item("c")));
        assert_eq!(ledger.record(&key).granted_items, vec![item("a")]);

        assert_eq!(ledger.remove_item_for_day(&key, 5), None);
        assert_eq!(ledger.remove_item_for_day(&key, 0), None);
    }

    #[test]
    fn test_unclaimed_rewards_and_take() {
        let (ledger, key) = setup();
        assert!(!ledger.has_unclaimed_rewards(&key));

        ledger.grant_item_for_day(&key, 1, RewardKind::SkipDay);
        assert!(!ledger.has_unclaimed_rewards(&key));

        ledger.grant_item_for_day(&key, 2, item("gold"));
        assert!(ledger.has_unclaimed_rewards(&key));

        assert_eq!(ledger.take_reward_for_day(&key, 1), None);
        assert_eq!(
            ledger.take_reward_for_day(&key, 2),
            Some(RewardItemStack::single("gold"))
        );
        assert_eq!(ledger.take_reward_for_day(&key, 2), None);
        assert_eq!(ledger.record(&key).item_for_day(2), Some(&RewardKind::Taken));
        assert!(!ledger.has_unclaimed_rewards(&key));
    }

    #[test]
    fn test_clear_month_resets_record() {
        let (ledger, key) = setup();
        ledger.mark_rewarded_today(&key, "2026-02-10");
        ledger.increase_rewarded_days(&key);
        ledger.grant_item_for_day(&key, 1, item("a"));

        assert!(ledger.clear_month(&key));
        assert_eq!(ledger.record(&key), PlayerMonthRecord::default());
        assert!(!ledger.clear_month(&key));
    }

    #[test]
    fn test_reset_month_only_touches_that_partition() {
        let (ledger, key) = setup();
        let other_player = LedgerKey::new(key.track, key.month, "player-2");
        let other_track = LedgerKey::new(Track::Special, key.month, "player-1");
        let other_month = LedgerKey::new(key.track, MonthKey::new(2026, 3).unwrap(), "player-1");
        for k in [&key, &other_player, &other_track, &other_month] {
            ledger.increase_rewarded_days(k);
        }

        assert_eq!(ledger.reset_month(Track::General, key.month), 2);
        assert_eq!(ledger.rewarded_days(&key), 0);
        assert_eq!(ledger.rewarded_days(&other_player), 0);
        assert_eq!(ledger.rewarded_days(&other_track), 1);
        assert_eq!(ledger.rewarded_days(&other_month), 1);
    }

    #[test]
    fn test_dirty_tracking() {
        let (ledger, key) = setup();
        assert!(ledger.take_dirty().is_empty());

        ledger.increase_rewarded_days(&key);
        ledger.mark_rewarded_today(&key, "2026-02-10");
        let dirty = ledger.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, key);
        assert_eq!(dirty[0].1.as_ref().map(|r| r.rewarded_days), Some(1));
        assert!(ledger.take_dirty().is_empty());

        ledger.clear_month(&key);
        let dirty = ledger.take_dirty();
        assert_eq!(dirty, vec![(key, None)]);
    }

    #[test]
    fn test_reads_do_not_create_records() {
        let (ledger, key) = setup();
        ledger.has_rewarded_today(&key, "2026-02-10");
        ledger.has_unclaimed_rewards(&key);
        ledger.take_reward_for_day(&key, 1);
        ledger.remove_item_for_day(&key, 1);
        assert!(ledger.take_dirty().is_empty());
        assert!(ledger.records_for_month(key.track, key.month).is_empty());
    }

    #[test]
    fn test_restore_does_not_override_memory() {
        let (ledger, key) = setup();
        let stored = PlayerMonthRecord {
            rewarded_days: 4,
            last_rewarded_day: "2026-02-04".to_string(),
            granted_items: vec![item("a"); 4],
        };
        assert!(ledger.restore(key.clone(), stored.clone()));
        assert_eq!(ledger.record(&key), stored);
        assert!(ledger.take_dirty().is_empty());

        assert!(!ledger.restore(key.clone(), PlayerMonthRecord::default()));
        assert_eq!(ledger.record(&key), stored);
    }

    #[test]
    fn test_concurrent_increases_are_not_lost() {
        let (ledger, key) = setup();
        let ledger = Arc::new(ledger);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let key = key.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        ledger.increase_rewarded_days(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ledger.rewarded_days(&key), 20);
    }
}
