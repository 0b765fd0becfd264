use super::map_config::{DEFAULT_MAP_CONFIG_NAME, MapConfig, MapConfigResolver};

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_PARTITION_COUNT: u32 = 256;

/// Node-wide configuration of the map service.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub partition_count: u32,
    pub maps: Vec<MapConfig>,

    #[serde(skip)]
    resolved: DashMap<String, Arc<MapConfig>>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            partition_count: DEFAULT_PARTITION_COUNT,
            maps: Vec::new(),
            resolved: DashMap::new(),
        }
    }
}

impl ServiceConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("Malformed service config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.partition_count == 0 {
            return Err(anyhow::anyhow!("partition_count must be at least 1"));
        }
        for map in &self.maps {
            if map.name.matches('*').count() > 1 {
                return Err(anyhow::anyhow!(
                    "Map config name '{}' has more than one wildcard",
                    map.name
                ));
            }
        }
        Ok(())
    }

    pub fn with_partition_count(mut self, partition_count: u32) -> Self {
        self.partition_count = partition_count;
        self
    }

    pub fn with_map(mut self, map: MapConfig) -> Self {
        self.maps.push(map);
        self.resolved.clear();
        self
    }

    fn resolve(&self, name: &str) -> MapConfig {
        if let Some(exact) = self.maps.iter().find(|map| map.name == name) {
            return exact.clone();
        }

        let wildcard = self
            .maps
            .iter()
            .filter_map(|map| map.wildcard_match(name).map(|literal| (literal, map)))
            .max_by_key(|(literal, _)| *literal)
            .map(|(_, map)| map);
        if let Some(map) = wildcard {
            return map.clone();
        }

        self.maps
            .iter()
            .find(|map| map.name == DEFAULT_MAP_CONFIG_NAME)
            .cloned()
            .unwrap_or_default()
    }
}

impl MapConfigResolver for ServiceConfig {
    fn find_matching_map_config(&self, name: &str) -> Arc<MapConfig> {
        if let Some(cached) = self.resolved.get(name) {
            return cached.clone();
        }
        let config = Arc::new(self.resolve(name));
        tracing::debug!("Map '{}' resolved to config '{}'", name, config.name);
        self.resolved.insert(name.to_string(), config.clone());
        config
    }
}
