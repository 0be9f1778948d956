//! Reward service domain logic for the daily rewards engine.
//!
//! The service owns the allocation cache, the player ledger and the
//! eligibility gate, and is the only component that talks to storage. It is
//! built once per process and shared through `Arc` by the scheduler loop and
//! the REST handlers.
//!
//! ## Key Responsibilities
//!
//! - **Warm-up**: loading stored allocations and ledger records of a month once
//! - **Daily grants**: handing out the next allocation slot to a player
//! - **Admin edits**: adding, replacing and removing days, resets
//! - **Persistence**: flushing dirty records and new allocations to storage
//!
//! ## Business Rules
//!
//! - A player's next reward is always `allocation[rewarded_days]`
//! - Admin edits keep `granted_items` and `rewarded_days` in step
//! - Failed writes are retried on the next flush

use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::domain::allocation_cache::MonthlyAllocationCache;
use crate::backend::domain::calendar::Clock;
use crate::backend::domain::catalog::{ConfiguredItemRegistry, ItemCatalogResolver};
use crate::backend::domain::eligibility::EligibilityGate;
use crate::backend::domain::ledger::{GrantRefusal, PlayerRewardLedger};
use crate::backend::domain::models::{
    LedgerKey, MonthKey, MonthlyAllocation, PlayerMonthRecord, RewardError, RewardItemStack,
    RewardKind, RewardsConfig, Track,
};
use crate::backend::storage::RewardStorage;

pub struct RewardService {
    config: Arc<RewardsConfig>,
    clock: Arc<dyn Clock>,
    resolver: ItemCatalogResolver,
    cache: MonthlyAllocationCache,
    ledger: PlayerRewardLedger,
    gate: EligibilityGate,
    storage: Arc<dyn RewardStorage>,
    loaded: Mutex<HashSet<(Track, MonthKey)>>,
    /// Held for a whole flush and around allocation deletes, so storage
    /// writes land in the order their snapshots were taken
    persist_lock: tokio::sync::Mutex<()>,
}

impl RewardService {
    pub fn new(
        config: Arc<RewardsConfig>,
        clock: Arc<dyn Clock>,
        storage: Arc<dyn RewardStorage>,
    ) -> Self {
        Self::with_rng(config, clock, storage, StdRng::from_entropy())
    }

    /// Service whose fill draws come from `rng`
    pub fn with_rng(
        config: Arc<RewardsConfig>,
        clock: Arc<dyn Clock>,
        storage: Arc<dyn RewardStorage>,
        rng: StdRng,
    ) -> Self {
        let registry = ConfiguredItemRegistry::new(config.known_items.iter());
        let resolver = ItemCatalogResolver::new(Arc::new(registry));
        let cache = MonthlyAllocationCache::with_rng(Arc::clone(&config), resolver.clone(), rng);

        Self {
            gate: EligibilityGate::new(Arc::clone(&config)),
            ledger: PlayerRewardLedger::new(Arc::clone(&clock)),
            config,
            clock,
            resolver,
            cache,
            storage,
            loaded: Mutex::new(HashSet::new()),
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RewardsConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    pub fn ledger(&self) -> &PlayerRewardLedger {
        &self.ledger
    }

    pub fn current_month(&self) -> MonthKey {
        self.clock.current_month_key()
    }

    /// Load the stored allocation and ledger records of a track and month,
    /// once per process. In-memory state always wins over stored documents.
    pub async fn ensure_loaded(&self, track: Track, month: MonthKey) -> Result<()> {
        if self.is_loaded(track, month) {
            return Ok(());
        }

        if let Some(allocation) = self.storage.load_allocation(track, month).await? {
            if self.cache.restore(track, allocation) {
                debug!("Restored stored {} allocation for {}", track, month);
            }
        }

        let records = self.storage.list_player_records(track, month).await?;
        let mut restored = 0;
        for (player_id, record) in records {
            if self.ledger.restore(LedgerKey::new(track, month, player_id), record) {
                restored += 1;
            }
        }

        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((track, month));
        info!("📂 Loaded {} {} ledger records for {}", restored, track, month);
        Ok(())
    }

    /// Load both tracks of a month
    pub async fn warm_up(&self, month: MonthKey) -> Result<()> {
        for track in Track::ALL {
            self.ensure_loaded(track, month).await?;
        }
        Ok(())
    }

    pub async fn allocation(&self, track: Track, month: MonthKey) -> Result<Arc<MonthlyAllocation>> {
        self.ensure_loaded(track, month).await?;
        Ok(self.cache.get_allocation(track, month))
    }

    pub async fn player_record(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
    ) -> Result<PlayerMonthRecord> {
        self.ensure_loaded(track, month).await?;
        Ok(self.ledger.record(&LedgerKey::new(track, month, player_id)))
    }

    /// Grant the player's next slot of the month as today's reward.
    /// Returns the granted day and slot, or `None` when there is nothing to hand out.
    pub async fn grant_next_reward(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
        today: &str,
    ) -> Result<Option<(u32, RewardKind)>> {
        self.ensure_loaded(track, month).await?;
        let key = LedgerKey::new(track, month, player_id);
        let allocation = self.cache.get_allocation(track, month);

        match self.ledger.commit_daily_grant(&key, today, &allocation) {
            Ok(granted) => Ok(Some(granted)),
            Err(GrantRefusal::NotGrantable { day, slot }) => {
                warn!(
                    "Slot {} of the {} allocation for {} is {}, nothing granted to {}",
                    day, track, month, slot, player_id
                );
                Ok(None)
            }
            Err(GrantRefusal::NoSlot { rewarded_days }) => {
                debug!(
                    "No {} reward left for {} in {} ({} days claimed, {} slots)",
                    track,
                    player_id,
                    month,
                    rewarded_days,
                    allocation.len()
                );
                Ok(None)
            }
            Err(GrantRefusal::MonthComplete) => {
                debug!("Player {} already claimed every {} day of {}", player_id, track, month);
                Ok(None)
            }
        }
    }

    /// Mark a granted stack of the current month as taken by the player
    pub async fn take_reward(
        &self,
        track: Track,
        player_id: &str,
        day: u32,
    ) -> Result<Option<RewardItemStack>> {
        let month = self.current_month();
        self.ensure_loaded(track, month).await?;
        validate_day(month, day)?;

        let key = LedgerKey::new(track, month, player_id);
        if day > self.ledger.rewarded_days(&key) {
            return Err(RewardError::DayNotRewarded(day).into());
        }

        let taken = self.ledger.take_reward_for_day(&key, day);
        if let Some(stack) = &taken {
            info!("Player {} took {} reward of day {}: {}", player_id, track, day, stack);
            self.flush_logged().await;
        }
        Ok(taken)
    }

    /// Discard the allocation of a month so it is computed again on next use
    pub async fn reset_allocation(&self, track: Track, month: MonthKey) -> Result<bool> {
        self.ensure_loaded(track, month).await?;
        let _persisting = self.persist_lock.lock().await;
        let cached = self.cache.invalidate(track, month);
        let stored = self.storage.delete_allocation(track, month).await?;
        info!("🔄 Reset {} allocation for {}", track, month);
        Ok(cached || stored)
    }

    pub async fn clear_player(&self, track: Track, month: MonthKey, player_id: &str) -> Result<bool> {
        self.ensure_loaded(track, month).await?;
        let cleared = self
            .ledger
            .clear_month(&LedgerKey::new(track, month, player_id));
        info!("Cleared {} rewards of player {} for {}", track, player_id, month);
        self.flush_logged().await;
        Ok(cleared)
    }

    pub async fn reset_ledger(&self, track: Track, month: MonthKey) -> Result<usize> {
        self.ensure_loaded(track, month).await?;
        let removed = self.ledger.reset_month(track, month);
        info!("🔄 Reset {} {} ledger records for {}", removed, track, month);
        self.flush_logged().await;
        Ok(removed)
    }

    /// Grant `item_spec` as the player's next day, counting the day
    pub async fn add_reward_day(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
        item_spec: &str,
    ) -> Result<(u32, RewardKind)> {
        let item = self.resolver.resolve_spec(item_spec)?;
        self.ensure_loaded(track, month).await?;

        let key = LedgerKey::new(track, month, player_id);
        let day = self.ledger.append_day(&key, item.clone())?;
        info!("Added {} day {} for player {} in {}: {}", track, day, player_id, month, item);

        self.flush_logged().await;
        Ok((day, item))
    }

    /// Replace the item of a day the player has already been rewarded for
    pub async fn set_reward_for_day(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
        day: u32,
        item_spec: &str,
    ) -> Result<RewardKind> {
        validate_day(month, day)?;
        let item = self.resolver.resolve_spec(item_spec)?;
        self.ensure_loaded(track, month).await?;

        let key = LedgerKey::new(track, month, player_id);
        if day > self.ledger.rewarded_days(&key) {
            return Err(RewardError::DayNotRewarded(day).into());
        }

        self.ledger.grant_item_for_day(&key, day, item.clone());
        info!("Set {} day {} for player {} in {}: {}", track, day, player_id, month, item);

        self.flush_logged().await;
        Ok(item)
    }

    /// Remove the latest rewarded day: its item is dropped and the count decreased.
    /// Returns the remaining day count and the removed slot.
    pub async fn remove_last_reward_day(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
    ) -> Result<(u32, Option<RewardKind>)> {
        self.ensure_loaded(track, month).await?;

        let key = LedgerKey::new(track, month, player_id);
        let (remaining, removed) = self.ledger.remove_last_day(&key)?;
        info!(
            "Removed {} day {} for player {} in {}",
            track,
            remaining + 1,
            player_id,
            month
        );

        self.flush_logged().await;
        Ok((remaining, removed))
    }

    /// Write dirty ledger records and new allocations to storage.
    /// Entries that fail are queued again for the next flush.
    pub async fn flush(&self) -> Result<()> {
        let _persisting = self.persist_lock.lock().await;
        let mut failures = 0;

        for (key, record) in self.ledger.take_dirty() {
            let result = match &record {
                Some(record) => {
                    self.storage
                        .save_player_record(key.track, key.month, &key.player_id, record)
                        .await
                }
                None => self
                    .storage
                    .delete_player_record(key.track, key.month, &key.player_id)
                    .await
                    .map(|_| ()),
            };
            if let Err(e) = result {
                error!(
                    "Failed to persist {} record of player {} for {}: {:#}",
                    key.track, key.player_id, key.month, e
                );
                self.ledger.mark_dirty(std::iter::once(key));
                failures += 1;
            }
        }

        for (track, allocation) in self.cache.take_unsaved() {
            if let Err(e) = self.storage.save_allocation(track, &allocation).await {
                error!(
                    "Failed to persist {} allocation for {}: {:#}",
                    track, allocation.month, e
                );
                self.cache.mark_unsaved(track, allocation.month);
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(anyhow!("{} documents could not be persisted", failures));
        }
        Ok(())
    }

    async fn flush_logged(&self) {
        if let Err(e) = self.flush().await {
            warn!("Changes kept in memory, will retry: {:#}", e);
        }
    }

    fn is_loaded(&self, track: Track, month: MonthKey) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(track, month))
    }
}

fn validate_day(month: MonthKey, day: u32) -> Result<(), RewardError> {
    if month.contains_day(day) {
        Ok(())
    } else {
        Err(RewardError::InvalidDay {
            day,
            month,
            days_in_month: month.days_in_month(),
        })
    }
}
