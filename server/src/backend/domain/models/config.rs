//! Domain model for the reward configuration file.
//!
//! ```yaml
//! data_directory: data
//! listen_address: 127.0.0.1:3030
//! check_interval_secs: 60
//! reward_time_per_day_mins: 30
//! known_items: []            # empty accepts every item id
//! general:
//!   shuffle: false
//!   use_fill_items: true
//!   months:
//!     1: ["minecraft:bread:4", "minecraft:emerald"]
//! special:
//!   enabled: true
//!   shuffle: false
//!   months:
//!     12: ["minecraft:diamond:2"]
//!   allowed_players:
//!     12: [""]               # unset, everyone may participate
//! fill:
//!   normal: ["minecraft:bread:4"]
//!   rare: ["minecraft:diamond"]
//!   loot_bag: ["daily_rewards:loot_bag"]
//!   rare_fill_chance: 7
//!   loot_bag_fill_chance: 15
//! ```
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::reward::Track;

pub const DEFAULT_RARE_FILL_CHANCE: i32 = 7;
pub const DEFAULT_LOOT_BAG_FILL_CHANCE: i32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    pub data_directory: PathBuf,
    pub listen_address: String,
    /// How often the scheduler re-evaluates online players
    pub check_interval_secs: u64,
    /// Online time a player needs within a session before the day's reward is due
    pub reward_time_per_day_mins: u64,
    pub known_items: Vec<String>,
    pub general: GeneralTrackConfig,
    pub special: SpecialTrackConfig,
    pub fill: FillPoolConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralTrackConfig {
    pub shuffle: bool,
    pub use_fill_items: bool,
    /// Item specs keyed by month number (1-12)
    pub months: BTreeMap<u32, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTrackConfig {
    pub enabled: bool,
    pub shuffle: bool,
    pub months: BTreeMap<u32, Vec<String>>,
    /// Player names allowed per month; empty or `[""]` admits everyone
    pub allowed_players: BTreeMap<u32, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillPoolConfig {
    pub normal: Vec<String>,
    pub rare: Vec<String>,
    pub loot_bag: Vec<String>,
    /// One in `rare_fill_chance` missing slots draws from the rare pool, 0 disables
    pub rare_fill_chance: i32,
    pub loot_bag_fill_chance: i32,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data"),
            listen_address: "127.0.0.1:3030".to_string(),
            check_interval_secs: 60,
            reward_time_per_day_mins: 30,
            known_items: Vec::new(),
            general: GeneralTrackConfig::default(),
            special: SpecialTrackConfig::default(),
            fill: FillPoolConfig::default(),
        }
    }
}

impl Default for GeneralTrackConfig {
    fn default() -> Self {
        let months = (1..=12)
            .map(|month| {
                (
                    month,
                    vec![
                        "minecraft:bread:8".to_string(),
                        "minecraft:iron_ingot:4".to_string(),
                        "minecraft:emerald".to_string(),
                    ],
                )
            })
            .collect();
        Self {
            shuffle: false,
            use_fill_items: true,
            months,
        }
    }
}

impl Default for SpecialTrackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shuffle: false,
            months: BTreeMap::new(),
            allowed_players: BTreeMap::new(),
        }
    }
}

impl Default for FillPoolConfig {
    fn default() -> Self {
        Self {
            normal: vec![
                "minecraft:apple:4".to_string(),
                "minecraft:cooked_beef:4".to_string(),
                "minecraft:coal:8".to_string(),
                "minecraft:torch:16".to_string(),
            ],
            rare: vec![
                "minecraft:diamond".to_string(),
                "minecraft:golden_apple".to_string(),
            ],
            loot_bag: Vec::new(),
            rare_fill_chance: DEFAULT_RARE_FILL_CHANCE,
            loot_bag_fill_chance: DEFAULT_LOOT_BAG_FILL_CHANCE,
        }
    }
}

impl RewardsConfig {
    /// Configured item specs of a track for a month number
    pub fn item_specs(&self, track: Track, month: u32) -> &[String] {
        let months = match track {
            Track::General => &self.general.months,
            Track::Special => {
                if !self.special.enabled {
                    return &[];
                }
                &self.special.months
            }
        };
        months.get(&month).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn allowed_players(&self, month: u32) -> &[String] {
        self.special
            .allowed_players
            .get(&month)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn shuffle(&self, track: Track) -> bool {
        match track {
            Track::General => self.general.shuffle,
            Track::Special => self.special.shuffle,
        }
    }

    /// Fill pools only ever pad the general track
    pub fn use_fill_items(&self, track: Track) -> bool {
        track == Track::General && self.general.use_fill_items
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn reward_time_per_day(&self) -> Duration {
        Duration::from_secs(self.reward_time_per_day_mins * 60)
    }

    /// Fix up out-of-range values, warning about each one
    pub fn normalized(mut self) -> Self {
        if self.check_interval_secs == 0 {
            warn!("check_interval_secs must be at least 1, using 1");
            self.check_interval_secs = 1;
        }
        if self.fill.rare_fill_chance < 0 {
            warn!(
                "rare_fill_chance {} is negative, disabling rare fill items",
                self.fill.rare_fill_chance
            );
            self.fill.rare_fill_chance = 0;
        }
        if self.fill.loot_bag_fill_chance < 0 {
            warn!(
                "loot_bag_fill_chance {} is negative, disabling loot bag fill items",
                self.fill.loot_bag_fill_chance
            );
            self.fill.loot_bag_fill_chance = 0;
        }
        retain_valid_months(&mut self.general.months, "general.months");
        retain_valid_months(&mut self.special.months, "special.months");
        retain_valid_months(&mut self.special.allowed_players, "special.allowed_players");
        self
    }
}

fn retain_valid_months(months: &mut BTreeMap<u32, Vec<String>>, section: &str) {
    months.retain(|month, _| {
        let valid = (1..=12).contains(month);
        if !valid {
            warn!("Ignoring {} entry for invalid month {}", section, month);
        }
        valid
    });
}
