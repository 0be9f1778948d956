//! Item catalog resolution.
//!
//! Turns configured item specs (`itemId` or `itemId:count`) into reward slots,
//! checking every id against the item registry. Unknown items are logged and
//! dropped, they never fail the whole list.

use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::domain::models::{RewardError, RewardItemStack, RewardKind};

/// Reserved id that makes a day count without handing anything out
pub const SKIP_DAY_ITEM_ID: &str = "daily_rewards:skip_day";
/// Reserved id that makes a day count while keeping its slot locked
pub const LOCK_DAY_ITEM_ID: &str = "daily_rewards:lock_day";
/// The registry's "no item" sentinel
pub const EMPTY_ITEM_ID: &str = "minecraft:air";

/// Lookup of item ids known to the game
pub trait ItemRegistry: Send + Sync {
    /// Canonical id of the item, `None` if the registry does not know it
    fn resolve(&self, item_id: &str) -> Option<String>;
}

/// Registry backed by the `known_items` config list. An empty list accepts every id.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredItemRegistry {
    known_items: HashSet<String>,
}

impl ConfiguredItemRegistry {
    pub fn new<I, S>(known_items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_items: known_items
                .into_iter()
                .map(|id| id.into().trim().to_ascii_lowercase())
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    pub fn permissive() -> Self {
        Self::default()
    }
}

impl ItemRegistry for ConfiguredItemRegistry {
    fn resolve(&self, item_id: &str) -> Option<String> {
        let id = item_id.trim().to_ascii_lowercase();
        if id.is_empty() {
            return None;
        }
        if self.known_items.is_empty() || self.known_items.contains(&id) {
            Some(id)
        } else {
            None
        }
    }
}

/// Split an item spec into id and count.
///
/// The part after the last `:` is a count only when it is all digits, so
/// namespaced ids like `minecraft:apple` keep their namespace.
pub fn parse_item_spec(spec: &str) -> Result<(String, u32), RewardError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(RewardError::EmptyItemSpec);
    }

    let (item_id, count) = match spec.rsplit_once(':') {
        Some((id, suffix)) if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) => {
            let count = suffix
                .parse::<u32>()
                .map_err(|_| RewardError::InvalidItemCount(spec.to_string()))?;
            (id.trim(), count)
        }
        _ => (spec, 1),
    };

    if item_id.is_empty() {
        return Err(RewardError::EmptyItemSpec);
    }
    if count == 0 {
        return Err(RewardError::InvalidItemCount(spec.to_string()));
    }
    Ok((item_id.to_string(), count))
}

/// Resolves item specs against an `ItemRegistry`
#[derive(Clone)]
pub struct ItemCatalogResolver {
    registry: Arc<dyn ItemRegistry>,
}

impl ItemCatalogResolver {
    pub fn new(registry: Arc<dyn ItemRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve a single spec, reporting why it could not be used
    pub fn resolve_spec(&self, spec: &str) -> Result<RewardKind, RewardError> {
        let (item_id, count) = parse_item_spec(spec)?;

        match item_id.to_ascii_lowercase().as_str() {
            SKIP_DAY_ITEM_ID => return Ok(RewardKind::SkipDay),
            LOCK_DAY_ITEM_ID => return Ok(RewardKind::LockDay),
            _ => {}
        }

        match self.registry.resolve(&item_id) {
            Some(resolved) if resolved != EMPTY_ITEM_ID => {
                Ok(RewardKind::Normal(RewardItemStack::new(resolved, count)))
            }
            _ => Err(RewardError::UnknownItem(item_id)),
        }
    }

    /// Resolve a list of specs in order, skipping the ones that cannot be used
    pub fn resolve(&self, specs: &[String]) -> Vec<RewardKind> {
        let resolved: Vec<RewardKind> = specs
            .iter()
            .filter_map(|spec| match self.resolve_spec(spec) {
                Ok(kind) => Some(kind),
                Err(e) => {
                    warn!("Skipping reward item '{}': {}", spec, e);
                    None
                }
            })
            .collect();

        debug!("Resolved {} of {} item specs", resolved.len(), specs.len());
        resolved
    }

    /// Resolve specs that must be concrete stacks (fill pools), dropping skip/lock markers
    pub fn resolve_stacks(&self, specs: &[String]) -> Vec<RewardItemStack> {
        self.resolve(specs)
            .into_iter()
            .filter_map(|kind| match kind {
                RewardKind::Normal(stack) => Some(stack),
                other => {
                    warn!("Ignoring {} in a fill pool, only concrete items are allowed", other);
                    None
                }
            })
            .collect()
    }
}
