use super::ids::IdGenerator;
use super::types::{Data, ExpiryPolicy, Record, RecordInit};
use crate::config::map_config::MapConfig;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// The records of one map within one partition.
///
/// Owned exclusively by its partition container, so every mutation runs under
/// the partition's single-writer discipline and no locking happens here.
pub struct RecordStore {
    name: String,
    partition_id: u32,
    config: Arc<MapConfig>,
    ids: Arc<dyn IdGenerator>,
    records: HashMap<Data, Record>,
}

impl RecordStore {
    pub fn new(
        name: impl Into<String>,
        partition_id: u32,
        config: Arc<MapConfig>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            name: name.into(),
            partition_id,
            config,
            ids,
            records: HashMap::new(),
        }
    }

    /// Full map name, service prefix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Returns `None` for keys that were never written or have been removed.
    pub fn get(&self, key: &Data) -> Option<&Record> {
        self.records.get(key)
    }

    /// Like `get`, but counts the read towards the record's hits and idle time.
    pub fn get_touch(&mut self, key: &Data) -> Option<&Record> {
        let record = self.records.get_mut(key)?;
        record.touch();
        Some(record)
    }

    pub fn contains_key(&self, key: &Data) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Data, &Record)> {
        self.records.iter()
    }

    /// Creates the record for `key` or replaces its value in place, then marks
    /// it active and dirty.
    ///
    /// A new record gets a fresh id from the service-wide generator, no owner and
    /// the given `expiry`. An existing record keeps its id, owner and expiry.
    pub fn upsert(&mut self, key: Data, value: Data, expiry: ExpiryPolicy) -> &mut Record {
        let record = match self.records.entry(key) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                record.set_value(value);
                record
            }
            Entry::Vacant(entry) => {
                let init = RecordInit {
                    id: self.ids.next_id(),
                    partition_id: self.partition_id,
                    key: entry.key().clone(),
                    value,
                    owner: None,
                    expiry,
                };
                entry.insert(Record::new(init))
            }
        };
        record.set_active();
        record.set_dirty(true);
        record
    }

    /// Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &Data) -> Option<Record> {
        self.records.remove(key)
    }

    /// Drops every record whose ttl or max-idle elapsed at `now`.
    pub fn purge_expired(&mut self, now: u64) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired(now));
        let purged = before - self.records.len();
        if purged > 0 {
            tracing::debug!(
                "Purged {} expired records from map {} in partition {}",
                purged,
                self.name,
                self.partition_id
            );
        }
        purged
    }

    /// Returns the keys of dirty records and marks them clean.
    pub fn take_dirty_keys(&mut self) -> Vec<Data> {
        self.records
            .values_mut()
            .filter(|record| record.is_dirty())
            .map(|record| {
                record.set_dirty(false);
                record.key().clone()
            })
            .collect()
    }
}
