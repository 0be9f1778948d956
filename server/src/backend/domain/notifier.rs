//! Hooks into the presentation layer.
use log::{debug, info};

use crate::backend::domain::models::{RewardKind, Track};

/// Receives reward events for players; the engine knows nothing about screens.
pub trait RewardNotifier: Send + Sync {
    /// A day's reward was committed to the player's ledger
    fn on_granted(&self, player_id: &str, track: Track, day: u32, item: &RewardKind);

    /// The player joined with rewards still waiting to be taken
    fn on_unclaimed_rewards(&self, player_id: &str, track: Track) {
        debug!("Player {} has unclaimed {} rewards", player_id, track);
    }
}

/// Notifier that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl RewardNotifier for LogNotifier {
    fn on_granted(&self, player_id: &str, track: Track, day: u32, item: &RewardKind) {
        info!("🎁 Player {} received {} reward for day {}: {}", player_id, track, day, item);
    }

    fn on_unclaimed_rewards(&self, player_id: &str, track: Track) {
        info!("📦 Player {} has unclaimed {} rewards", player_id, track);
    }
}
