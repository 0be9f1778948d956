//! # Storage Traits
//!
//! Storage abstraction used by the reward service, so the domain layer works
//! with any durable key-value document store.

use anyhow::Result;
use async_trait::async_trait;

use crate::backend::domain::models::{MonthKey, MonthlyAllocation, PlayerMonthRecord, Track};

/// Trait defining the interface for reward persistence
///
/// Corrupt or unreadable documents are reported as absent rather than as
/// errors; only failures of the medium itself are returned as `Err`.
#[async_trait]
pub trait RewardStorage: Send + Sync {
    /// Load one player's record for a track and month
    async fn load_player_record(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
    ) -> Result<Option<PlayerMonthRecord>>;

    /// Store (create or replace) one player's record
    async fn save_player_record(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
        record: &PlayerMonthRecord,
    ) -> Result<()>;

    /// Delete one player's record
    /// Returns true if a record was found and deleted
    async fn delete_player_record(&self, track: Track, month: MonthKey, player_id: &str) -> Result<bool>;

    /// All player records stored for a track and month
    async fn list_player_records(
        &self,
        track: Track,
        month: MonthKey,
    ) -> Result<Vec<(String, PlayerMonthRecord)>>;

    /// Load the stored allocation of a track and month
    async fn load_allocation(&self, track: Track, month: MonthKey) -> Result<Option<MonthlyAllocation>>;

    /// Store the allocation of a track; the month comes from the allocation itself
    async fn save_allocation(&self, track: Track, allocation: &MonthlyAllocation) -> Result<()>;

    /// Delete the stored allocation of a track and month
    /// Returns true if an allocation was found and deleted
    async fn delete_allocation(&self, track: Track, month: MonthKey) -> Result<bool>;
}
