//! # Domain Module
//!
//! Business logic of the daily rewards engine, independent of HTTP and of the
//! file layout used for persistence.
//!
//! ## Module Organization
//!
//! - **catalog**: item spec parsing and validation against the item registry
//! - **fill_pool**: completing a month from configured items and fill pools
//! - **allocation_cache**: one memoized allocation per track and month
//! - **ledger**: per-player, per-month claimed days and granted items
//! - **eligibility**: special track allow-lists
//! - **reward_service**: warm-up, grants, admin edits and persistence flushes
//! - **scheduler**: per-player reward state machine driven by events
//! - **calendar**: the clock abstraction
//! - **notifier**: hooks into the presentation layer
//!
//! ## Business Rules
//!
//! - An allocation has no slots or exactly one slot per day of its month
//! - `rewarded_days == 0` exactly when `last_rewarded_day` is empty
//! - A player is rewarded at most once per date and track
//! - Rare and loot bag fill items appear at most once per allocation

pub mod allocation_cache;
pub mod calendar;
pub mod catalog;
pub mod eligibility;
pub mod fill_pool;
pub mod ledger;
pub mod models;
pub mod notifier;
pub mod reward_service;
pub mod scheduler;

pub use allocation_cache::MonthlyAllocationCache;
pub use calendar::{Clock, FixedClock, SystemClock};
pub use catalog::{ConfiguredItemRegistry, ItemCatalogResolver, ItemRegistry};
pub use eligibility::EligibilityGate;
pub use fill_pool::{AllocationOptions, FillPoolAllocator, FillPools};
pub use ledger::{GrantRefusal, PlayerRewardLedger};
pub use notifier::{LogNotifier, RewardNotifier};
pub use reward_service::RewardService;
pub use scheduler::{spawn_ticker, RewardScheduler, RewardState, SchedulerEvent};
