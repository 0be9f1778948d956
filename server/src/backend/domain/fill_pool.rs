//! Completes a month's rewards from the configured catalog.
//!
//! Catalogs shorter than the month are either repeated cyclically or, for the
//! general track with fill items enabled, padded with draws from three
//! weighted pools (rare, loot bag, normal). Rare and loot bag values are drawn
//! at most once per month.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::backend::domain::models::{
    RewardItemStack, RewardKind, DEFAULT_LOOT_BAG_FILL_CHANCE, DEFAULT_RARE_FILL_CHANCE,
};

/// Resolved fill pools with their draw chances
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPools {
    pub normal: Vec<RewardItemStack>,
    pub rare: Vec<RewardItemStack>,
    pub loot_bag: Vec<RewardItemStack>,
    /// A missing slot draws a rare item with probability `1 / rare_fill_chance`
    pub rare_fill_chance: i32,
    pub loot_bag_fill_chance: i32,
}

impl Default for FillPools {
    fn default() -> Self {
        Self {
            normal: Vec::new(),
            rare: Vec::new(),
            loot_bag: Vec::new(),
            rare_fill_chance: DEFAULT_RARE_FILL_CHANCE,
            loot_bag_fill_chance: DEFAULT_LOOT_BAG_FILL_CHANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationOptions {
    pub shuffle: bool,
    pub use_fill_items: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FillPoolAllocator {
    pools: FillPools,
}

impl FillPoolAllocator {
    pub fn new(pools: FillPools) -> Self {
        Self { pools }
    }

    /// Build a full month from `configured`. The result is empty when nothing
    /// is configured, otherwise it has exactly `days_in_month` slots.
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        configured: Vec<RewardKind>,
        days_in_month: u32,
        options: AllocationOptions,
        rng: &mut R,
    ) -> Vec<RewardKind> {
        let days = days_in_month as usize;
        let mut items = configured;

        if items.is_empty() || days == 0 {
            return Vec::new();
        }

        if items.len() >= days {
            items.truncate(days);
            if options.shuffle {
                items.shuffle(rng);
            }
            return items;
        }

        if options.use_fill_items {
            return self.fill_from_pools(items, days, rng);
        }

        if items.len() == 1 {
            return vec![items[0].clone(); days];
        }

        let mut allocation: Vec<RewardKind> =
            (0..days).map(|i| items[i % items.len()].clone()).collect();
        if options.shuffle {
            allocation.shuffle(rng);
        }
        allocation
    }

    fn fill_from_pools<R: Rng + ?Sized>(
        &self,
        mut items: Vec<RewardKind>,
        days: usize,
        rng: &mut R,
    ) -> Vec<RewardKind> {
        let missing = days - items.len();

        // Configured stacks count as used so a pool draw cannot duplicate them
        let mut used: HashSet<RewardItemStack> =
            items.iter().filter_map(RewardKind::as_stack).cloned().collect();

        for _ in 0..missing {
            let slot = self.draw_fill_item(&mut used, rng);
            items.push(slot);
        }

        debug!(
            "Filled {} missing days from fill pools ({} configured)",
            missing,
            days - missing
        );

        items.shuffle(rng);
        items
    }

    fn draw_fill_item<R: Rng + ?Sized>(
        &self,
        used: &mut HashSet<RewardItemStack>,
        rng: &mut R,
    ) -> RewardKind {
        let rare = roll_pool(&self.pools.rare, self.pools.rare_fill_chance, rng);
        let candidate = match rare {
            Some(item) => Some(item),
            None => roll_pool(&self.pools.loot_bag, self.pools.loot_bag_fill_chance, rng),
        };

        if let Some(item) = candidate {
            if used.insert(item.clone()) {
                return RewardKind::Normal(item.clone());
            }
        }

        match self.pools.normal.choose(rng) {
            Some(item) => RewardKind::Normal(item.clone()),
            None => RewardKind::Empty,
        }
    }
}

/// Pick from `pool` with probability `1 / chance`; disabled when `chance <= 0` or the pool is empty
fn roll_pool<'a, R: Rng + ?Sized>(
    pool: &'a [RewardItemStack],
    chance: i32,
    rng: &mut R,
) -> Option<&'a RewardItemStack> {
    if chance <= 0 || pool.is_empty() {
        return None;
    }
    if rng.gen_range(0..chance) != 0 {
        return None;
    }
    pool.choose(rng)
}
