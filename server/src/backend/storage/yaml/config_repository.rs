//! # Config Repository
//!
//! Loads the reward configuration from a single YAML file. A missing file is
//! created with the default configuration so operators have something to edit.

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::domain::models::RewardsConfig;

#[derive(Debug, Clone)]
pub struct ConfigRepository {
    path: PathBuf,
}

impl ConfigRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config file, writing the defaults first if it does not exist
    pub fn load_or_create(&self) -> Result<RewardsConfig> {
        if !self.path.exists() {
            let config = RewardsConfig::default();
            self.save(&config)?;
            info!("📝 Created default reward config at {}", self.path.display());
            return Ok(config);
        }

        let yaml_content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config {}", self.path.display()))?;
        if yaml_content.trim().is_empty() {
            warn!("Config {} is empty, using defaults", self.path.display());
            return Ok(RewardsConfig::default());
        }

        let config: RewardsConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse config {}", self.path.display()))?;
        info!("Loaded reward config from {}", self.path.display());
        Ok(config.normalized())
    }

    pub fn save(&self, config: &RewardsConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yaml::to_string(config)?;
        let temp_path = self.path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to write config {}", self.path.display()))?;
        Ok(())
    }
}
