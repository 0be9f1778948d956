//! # YAML Reward Repository
//!
//! File-based storage for ledger records and monthly allocations. Each player's
//! month is stored in `{track}/{YYYY-MM}/players/{player_id}.yaml` and each
//! month's allocation in `{track}/{YYYY-MM}/allocation.yaml`.
//!
//! ## YAML Format
//!
//! ```yaml
//! player_id: 0b5c6f1e-9a0f-4f5e-a3f4-2f1d2f6b3c11
//! track: general
//! month: 2026-10
//! rewarded_days: 2
//! last_rewarded_day: 2026-10-02
//! granted_items:
//!   - kind: normal
//!     item_id: minecraft:bread
//!     count: 8
//!   - kind: taken
//! updated_at: 2026-10-02T18:30:00+00:00
//! ```
//!
//! ## Features
//!
//! - Atomic file writes with temp files
//! - Corrupt documents are logged and read as missing
//! - Human-readable YAML format

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::connection::YamlConnection;
use crate::backend::domain::models::{
    MonthKey, MonthlyAllocation, PlayerMonthRecord, RewardKind, Track,
};
use crate::backend::storage::traits::RewardStorage;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlayerRecordDocument {
    player_id: String,
    track: Track,
    month: MonthKey,
    rewarded_days: u32,
    #[serde(default)]
    last_rewarded_day: String,
    #[serde(default)]
    granted_items: Vec<RewardKind>,
    #[serde(default)]
    updated_at: String,
}

impl PlayerRecordDocument {
    fn into_record(self) -> (String, PlayerMonthRecord) {
        (
            self.player_id,
            PlayerMonthRecord {
                rewarded_days: self.rewarded_days,
                last_rewarded_day: self.last_rewarded_day,
                granted_items: self.granted_items,
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AllocationDocument {
    track: Track,
    month: MonthKey,
    #[serde(default)]
    generated_at: String,
    slots: Vec<RewardKind>,
}

/// YAML-file reward repository
#[derive(Debug, Clone)]
pub struct YamlRewardRepository {
    connection: YamlConnection,
}

impl YamlRewardRepository {
    pub fn new(connection: YamlConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &YamlConnection {
        &self.connection
    }

    /// Read and parse a YAML document; missing and corrupt files both give `None`
    fn read_document<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        match serde_yaml::from_str::<T>(&content) {
            Ok(document) => Ok(Some(document)),
            Err(e) => {
                warn!("Ignoring corrupt document {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn delete_file(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}

#[async_trait]
impl RewardStorage for YamlRewardRepository {
    async fn load_player_record(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
    ) -> Result<Option<PlayerMonthRecord>> {
        let path = self.connection.player_file_path(track, month, player_id);
        let document: Option<PlayerRecordDocument> = Self::read_document(&path)?;
        match document {
            Some(doc) if doc.player_id != player_id => {
                warn!(
                    "Ignoring {}: it belongs to player {}, not {}",
                    path.display(),
                    doc.player_id,
                    player_id
                );
                Ok(None)
            }
            Some(doc) => Ok(Some(doc.into_record().1)),
            None => Ok(None),
        }
    }

    async fn save_player_record(
        &self,
        track: Track,
        month: MonthKey,
        player_id: &str,
        record: &PlayerMonthRecord,
    ) -> Result<()> {
        let document = PlayerRecordDocument {
            player_id: player_id.to_string(),
            track,
            month,
            rewarded_days: record.rewarded_days,
            last_rewarded_day: record.last_rewarded_day.clone(),
            granted_items: record.granted_items.clone(),
            updated_at: Utc::now().to_rfc3339(),
        };
        let yaml_content = serde_yaml::to_string(&document)?;
        let path = self.connection.player_file_path(track, month, player_id);
        self.connection.write_atomic(&path, &yaml_content)?;

        debug!(
            "Saved {} record of player {} for {} ({} days)",
            track, player_id, month, record.rewarded_days
        );
        Ok(())
    }

    async fn delete_player_record(&self, track: Track, month: MonthKey, player_id: &str) -> Result<bool> {
        let path = self.connection.player_file_path(track, month, player_id);
        let deleted = Self::delete_file(&path)?;
        if deleted {
            info!("Deleted {} record of player {} for {}", track, player_id, month);
        }
        Ok(deleted)
    }

    async fn list_player_records(
        &self,
        track: Track,
        month: MonthKey,
    ) -> Result<Vec<(String, PlayerMonthRecord)>> {
        let players_dir = self.connection.players_directory(track, month);
        if !players_dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&players_dir)
            .with_context(|| format!("Failed to list {}", players_dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("yaml") {
                continue;
            }

            let document: Option<PlayerRecordDocument> = match Self::read_document(&path) {
                Ok(document) => document,
                Err(e) => {
                    warn!("Skipping unreadable player record: {:#}", e);
                    continue;
                }
            };
            if let Some(document) = document {
                records.push(document.into_record());
            }
        }

        records.sort_by(|a, b| a.0.cmp(&b.0));
        debug!("Loaded {} {} records for {}", records.len(), track, month);
        Ok(records)
    }

    async fn load_allocation(&self, track: Track, month: MonthKey) -> Result<Option<MonthlyAllocation>> {
        let path = self.connection.allocation_file_path(track, month);
        let document: Option<AllocationDocument> = Self::read_document(&path)?;

        Ok(document.and_then(|doc| {
            if doc.month != month || doc.track != track {
                warn!(
                    "Allocation document {} belongs to {} {}, ignoring it",
                    path.display(),
                    doc.track,
                    doc.month
                );
                return None;
            }
            Some(MonthlyAllocation::new(doc.month, doc.slots))
        }))
    }

    async fn save_allocation(&self, track: Track, allocation: &MonthlyAllocation) -> Result<()> {
        let document = AllocationDocument {
            track,
            month: allocation.month,
            generated_at: Utc::now().to_rfc3339(),
            slots: allocation.slots.clone(),
        };
        let yaml_content = serde_yaml::to_string(&document)?;
        let path = self.connection.allocation_file_path(track, allocation.month);
        self.connection.write_atomic(&path, &yaml_content)?;

        info!("Saved {} allocation for {} to {}", track, allocation.month, path.display());
        Ok(())
    }

    async fn delete_allocation(&self, track: Track, month: MonthKey) -> Result<bool> {
        let path = self.connection.allocation_file_path(track, month);
        let deleted = Self::delete_file(&path)?;
        if deleted {
            info!("Deleted stored {} allocation for {}", track, month);
        }
        Ok(deleted)
    }
}
