//! # Storage Module
//!
//! Durable storage for ledger records and monthly allocations.
//!
//! The domain never reads or writes files itself: the ledger and the allocation
//! cache only mark entries dirty, and the reward service flushes them through
//! the `RewardStorage` trait. The YAML implementation keeps one human-readable
//! document per player and month, plus one allocation document per month.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── general/
//! │   └── 2026-10/
//! │       ├── allocation.yaml
//! │       └── players/
//! │           └── {player_id}.yaml
//! └── special/
//!     └── 2026-10/
//!         └── ...
//! ```

pub mod traits;
pub mod yaml;

pub use traits::*;
pub use yaml::{ConfigRepository, YamlConnection, YamlRewardRepository};
