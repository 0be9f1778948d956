//! Per-month allocation cache.
//!
//! Each `(track, month)` allocation is computed at most once and reused until an
//! admin reset invalidates it. Fill draws are random, so repeated reads must hand
//! back the very same sequence.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::domain::catalog::ItemCatalogResolver;
use crate::backend::domain::fill_pool::{AllocationOptions, FillPoolAllocator, FillPools};
use crate::backend::domain::models::{MonthKey, MonthlyAllocation, RewardsConfig, Track};

type CacheKey = (Track, MonthKey);

pub struct MonthlyAllocationCache {
    config: Arc<RewardsConfig>,
    resolver: ItemCatalogResolver,
    allocator: FillPoolAllocator,
    entries: Mutex<HashMap<CacheKey, Arc<MonthlyAllocation>>>,
    unsaved: Mutex<HashSet<CacheKey>>,
    rng: Mutex<StdRng>,
}

impl MonthlyAllocationCache {
    pub fn new(config: Arc<RewardsConfig>, resolver: ItemCatalogResolver) -> Self {
        Self::with_rng(config, resolver, StdRng::from_entropy())
    }

    /// Cache with a fixed random source, used to make fill draws reproducible
    pub fn with_rng(config: Arc<RewardsConfig>, resolver: ItemCatalogResolver, rng: StdRng) -> Self {
        let pools = FillPools {
            normal: resolver.resolve_stacks(&config.fill.normal),
            rare: resolver.resolve_stacks(&config.fill.rare),
            loot_bag: resolver.resolve_stacks(&config.fill.loot_bag),
            rare_fill_chance: config.fill.rare_fill_chance,
            loot_bag_fill_chance: config.fill.loot_bag_fill_chance,
        };
        info!(
            "Fill pools ready: {} normal, {} rare, {} loot bag items",
            pools.normal.len(),
            pools.rare.len(),
            pools.loot_bag.len()
        );

        Self {
            config,
            resolver,
            allocator: FillPoolAllocator::new(pools),
            entries: Mutex::new(HashMap::new()),
            unsaved: Mutex::new(HashSet::new()),
            rng: Mutex::new(rng),
        }
    }

    /// The allocation for a track and month, computed on first access
    pub fn get_allocation(&self, track: Track, month: MonthKey) -> Arc<MonthlyAllocation> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(&(track, month)) {
            return Arc::clone(existing);
        }

        let allocation = Arc::new(self.compute(track, month));
        entries.insert((track, month), Arc::clone(&allocation));
        self.unsaved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((track, month));
        allocation
    }

    /// Cached allocation without computing one
    pub fn peek(&self, track: Track, month: MonthKey) -> Option<Arc<MonthlyAllocation>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(track, month))
            .cloned()
    }

    /// Drop the cached allocation so the next read recomputes it.
    /// Returns whether an entry was cached.
    pub fn invalidate(&self, track: Track, month: MonthKey) -> bool {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(track, month))
            .is_some();
        self.unsaved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(track, month));
        if removed {
            info!("Invalidated {} allocation for {}", track, month);
        }
        removed
    }

    /// Seed the cache with a stored allocation. Stored allocations of the wrong
    /// length are ignored so they get recomputed.
    pub fn restore(&self, track: Track, allocation: MonthlyAllocation) -> bool {
        if !allocation.has_valid_length() {
            warn!(
                "Ignoring stored {} allocation for {} with {} slots (month has {} days)",
                track,
                allocation.month,
                allocation.len(),
                allocation.month.days_in_month()
            );
            return false;
        }

        let month = allocation.month;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&(track, month)) {
            return false;
        }
        entries.insert((track, month), Arc::new(allocation));
        true
    }

    /// Allocations computed since the last call, for the persistence flush
    pub fn take_unsaved(&self) -> Vec<(Track, Arc<MonthlyAllocation>)> {
        let keys: Vec<CacheKey> = self
            .unsaved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        keys.into_iter()
            .filter_map(|(track, month)| {
                entries
                    .get(&(track, month))
                    .map(|allocation| (track, Arc::clone(allocation)))
            })
            .collect()
    }

    /// Queue an allocation for saving again after a failed flush
    pub fn mark_unsaved(&self, track: Track, month: MonthKey) {
        self.unsaved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((track, month));
    }

    fn compute(&self, track: Track, month: MonthKey) -> MonthlyAllocation {
        let specs = self.config.item_specs(track, month.month);
        let configured = self.resolver.resolve(specs);
        let options = AllocationOptions {
            shuffle: self.config.shuffle(track),
            use_fill_items: self.config.use_fill_items(track),
        };

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let slots = self
            .allocator
            .allocate(configured, month.days_in_month(), options, &mut *rng);

        if slots.is_empty() {
            info!("No {} rewards configured for {}", track, month);
        } else {
            info!("Computed {} allocation for {} with {} days", track, month, slots.len());
        }
        MonthlyAllocation::new(month, slots)
    }
}
