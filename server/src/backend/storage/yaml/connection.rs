use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::domain::models::{MonthKey, Track};

/// YamlConnection resolves where reward documents live under the data directory
#[derive(Debug, Clone)]
pub struct YamlConnection {
    base_directory: PathBuf,
}

impl YamlConnection {
    /// Create a new connection with a base directory, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// `{base}/{track}/{YYYY-MM}`
    pub fn month_directory(&self, track: Track, month: MonthKey) -> PathBuf {
        self.base_directory
            .join(track.as_str())
            .join(month.to_string())
    }

    pub fn players_directory(&self, track: Track, month: MonthKey) -> PathBuf {
        self.month_directory(track, month).join("players")
    }

    pub fn player_file_path(&self, track: Track, month: MonthKey, player_id: &str) -> PathBuf {
        self.players_directory(track, month)
            .join(format!("{}.yaml", Self::file_stem_for_player(player_id)))
    }

    pub fn allocation_file_path(&self, track: Track, month: MonthKey) -> PathBuf {
        self.month_directory(track, month).join("allocation.yaml")
    }

    /// Player ids become file names. Bytes outside `[A-Za-z0-9_-]` are written as
    /// `%XX`, so distinct ids never share a file.
    pub fn file_stem_for_player(player_id: &str) -> String {
        if player_id.is_empty() {
            return "%".to_string();
        }

        let mut stem = String::with_capacity(player_id.len());
        for byte in player_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                stem.push(char::from(byte));
            } else {
                stem.push_str(&format!("%{:02X}", byte));
            }
        }
        stem
    }

    /// Write a file atomically: write to a temp file next to it, then rename
    pub fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }

        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move {} into place", temp_path.display()))?;

        debug!("Wrote {}", path.display());
        Ok(())
    }
}
