//! Special track eligibility.
use std::sync::Arc;

use crate::backend::domain::models::{MonthKey, RewardsConfig};

/// Allow-list check for the special reward track
#[derive(Clone)]
pub struct EligibilityGate {
    config: Arc<RewardsConfig>,
}

impl EligibilityGate {
    pub fn new(config: Arc<RewardsConfig>) -> Self {
        Self { config }
    }

    /// An unset list (missing, empty, or a single empty entry) admits every
    /// player; otherwise the name must be listed.
    pub fn is_eligible(&self, month: MonthKey, player_name: &str) -> bool {
        is_listed(self.config.allowed_players(month.month), player_name)
    }
}

fn is_listed(allowed_players: &[String], player_name: &str) -> bool {
    match allowed_players {
        [] => true,
        [only] if only.is_empty() => true,
        names => names.iter().any(|name| name == player_name),
    }
}
