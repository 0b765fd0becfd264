use crate::record::types::ExpiryPolicy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_MAP_CONFIG_NAME: &str = "default";

/// Settings of one map (or of every map matching a wildcard name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Exact map name, a pattern with one `*`, or `default`.
    pub name: String,
    /// Number of backup replicas kept for each partition of this map.
    pub backup_count: u32,
    /// 0 disables time-to-live.
    pub time_to_live_seconds: u64,
    /// 0 disables max-idle eviction.
    pub max_idle_seconds: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MAP_CONFIG_NAME.to_string(),
            backup_count: 1,
            time_to_live_seconds: 0,
            max_idle_seconds: 0,
        }
    }
}

impl MapConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Expiry applied to replicated puts that carry no explicit one.
    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::from_seconds(self.time_to_live_seconds, self.max_idle_seconds)
    }

    /// Length of the literal part if this config's name is a wildcard pattern
    /// matching `map_name`.
    pub(crate) fn wildcard_match(&self, map_name: &str) -> Option<usize> {
        let (prefix, suffix) = self.name.split_once('*')?;
        let literal = prefix.len() + suffix.len();
        (map_name.len() >= literal && map_name.starts_with(prefix) && map_name.ends_with(suffix))
            .then_some(literal)
    }
}

/// Resolves the configuration of a map from its name (service prefix stripped).
pub trait MapConfigResolver: Send + Sync {
    fn find_matching_map_config(&self, name: &str) -> Arc<MapConfig>;
}
