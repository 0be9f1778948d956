//! Temporary storage for tests. Everything lives under a `TempDir` that is
//! removed when the environment is dropped, even if the test panics.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::YamlConnection;
use super::reward_repository::YamlRewardRepository;
use crate::backend::storage::RewardStorage;

pub struct TestEnvironment {
    /// Kept alive so the directory is only removed on drop
    _temp_dir: TempDir,
    pub connection: YamlConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = YamlConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }

    pub fn reward_repository(&self) -> YamlRewardRepository {
        YamlRewardRepository::new(self.connection.clone())
    }

    /// Repository behind the storage trait, as the service holds it
    pub fn storage(&self) -> Arc<dyn RewardStorage> {
        Arc::new(self.reward_repository())
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("DAILY_REWARDS_DEBUG_TESTS").is_ok() {
            println!("🧹 Cleaning up test environment: {:?}", self.base_path);
        }
    }
}
