use super::scheduled::{ScheduledOperation, ScheduledOperationKey};
use crate::config::map_config::{MapConfig, MapConfigResolver};
use crate::membership::types::Address;
use crate::record::ids::IdGenerator;
use crate::record::store::RecordStore;
use crate::record::types::ExpiryPolicy;
use crate::txn::log::TransactionLog;
use crate::txn::types::{PendingChange, TransactionLogItem, TxnId};

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Length of the service discriminator every map name starts with (e.g. `"m:"`).
pub const MAP_NAME_PREFIX_LEN: usize = 2;

/// Map name without its service prefix, counted in characters. Names shorter
/// than the prefix strip to "".
pub fn strip_map_prefix(name: &str) -> &str {
    name.char_indices()
        .nth(MAP_NAME_PREFIX_LEN)
        .map_or("", |(i, _)| &name[i..])
}

/// What a commit did to the record stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub upserted: usize,
    pub removed: usize,
}

/// The data tables of one partition: record stores by map name, transaction logs
/// by transaction id, and scheduled-operation slots.
pub struct PartitionState {
    partition_id: u32,
    this_address: Address,
    config: Arc<dyn MapConfigResolver>,
    ids: Arc<dyn IdGenerator>,
    maps: HashMap<String, RecordStore>,
    transactions: HashMap<TxnId, TransactionLog>,
    scheduled_operations: HashMap<ScheduledOperationKey, VecDeque<ScheduledOperation>>,
}

impl PartitionState {
    pub fn new(
        partition_id: u32,
        this_address: Address,
        config: Arc<dyn MapConfigResolver>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            partition_id,
            this_address,
            config,
            ids,
            maps: HashMap::new(),
            transactions: HashMap::new(),
            scheduled_operations: HashMap::new(),
        }
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn this_address(&self) -> &Address {
        &self.this_address
    }

    pub fn get_map_config(&self, name: &str) -> Arc<MapConfig> {
        self.config.find_matching_map_config(strip_map_prefix(name))
    }

    // --- Record stores ---

    /// Returns the store for `name`, creating it on first access.
    pub fn get_record_store(&mut self, name: &str) -> &mut RecordStore {
        record_store_entry(
            &mut self.maps,
            self.partition_id,
            self.config.as_ref(),
            &self.ids,
            name,
        )
    }

    /// Read-only lookup that never creates a store.
    pub fn record_store(&self, name: &str) -> Option<&RecordStore> {
        self.maps.get(name)
    }

    pub fn record_stores(&self) -> impl Iterator<Item = &RecordStore> {
        self.maps.values()
    }

    pub fn record_stores_mut(&mut self) -> impl Iterator<Item = &mut RecordStore> {
        self.maps.values_mut()
    }

    pub fn record_store_count(&self) -> usize {
        self.maps.len()
    }

    // --- Transactions ---

    pub fn get_transaction_log(&self, txn_id: &TxnId) -> Option<&TransactionLog> {
        self.transactions.get(txn_id)
    }

    pub fn add_transaction_log_item(&mut self, txn_id: &TxnId, item: TransactionLogItem) {
        self.transactions
            .entry(txn_id.clone())
            .or_insert_with(|| TransactionLog::new(txn_id.clone()))
            .add_log_item(item);
    }

    /// Installs `log` for `txn_id`, replacing any log already there.
    pub fn put_transaction_log(&mut self, txn_id: TxnId, log: TransactionLog) {
        self.transactions.insert(txn_id, log);
    }

    /// Releases the log of a finished transaction.
    pub fn remove_transaction_log(&mut self, txn_id: &TxnId) -> Option<TransactionLog> {
        self.transactions.remove(txn_id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn rollback(&mut self, txn_id: &TxnId) {
        if self.transactions.remove(txn_id).is_some() {
            tracing::debug!(
                "{} partition {} rolled back txn {}",
                self.this_address,
                self.partition_id,
                txn_id
            );
        }
    }

    /// Applies every pending change of `txn_id` to the record stores.
    ///
    /// Returns `None` if there is no log for `txn_id`. The log stays in place;
    /// callers release it with `remove_transaction_log`. Items are applied one by
    /// one with no undo, so atomicity across items holds only because nothing else
    /// runs on the partition in between.
    pub fn commit(&mut self, txn_id: &TxnId) -> Option<CommitReport> {
        let log = self.transactions.get(txn_id)?;
        let mut report = CommitReport::default();

        for item in log.items() {
            tracing::trace!(
                "{} partition {} commit {}: {:?}",
                self.this_address,
                self.partition_id,
                txn_id,
                item
            );
            let store = record_store_entry(
                &mut self.maps,
                self.partition_id,
                self.config.as_ref(),
                &self.ids,
                item.map_name(),
            );
            match item.change() {
                PendingChange::Remove => {
                    if store.remove(item.key()).is_some() {
                        report.removed += 1;
                    }
                }
                PendingChange::Put(value) => {
                    store.upsert(item.key().clone(), value.clone(), ExpiryPolicy::UNSET);
                    report.upserted += 1;
                }
            }
        }

        tracing::debug!(
            "{} partition {} committed txn {} ({} upserted, {} removed)",
            self.this_address,
            self.partition_id,
            txn_id,
            report.upserted,
            report.removed
        );
        Some(report)
    }

    // --- Scheduled operations ---

    pub fn schedule_operation(&mut self, key: ScheduledOperationKey, op: ScheduledOperation) {
        self.scheduled_operations.entry(key).or_default().push_back(op);
    }

    pub fn scheduled_operations(
        &self,
        key: &ScheduledOperationKey,
    ) -> Option<&VecDeque<ScheduledOperation>> {
        self.scheduled_operations.get(key)
    }

    /// Pops the oldest operation parked on `key`, dropping the slot once empty.
    pub fn take_scheduled_operation(
        &mut self,
        key: &ScheduledOperationKey,
    ) -> Option<ScheduledOperation> {
        let queue = self.scheduled_operations.get_mut(key)?;
        let op = queue.pop_front();
        if queue.is_empty() {
            self.scheduled_operations.remove(key);
        }
        op
    }

    pub fn scheduled_operation_count(&self) -> usize {
        self.scheduled_operations.values().map(VecDeque::len).sum()
    }
}

fn record_store_entry<'a>(
    maps: &'a mut HashMap<String, RecordStore>,
    partition_id: u32,
    config: &dyn MapConfigResolver,
    ids: &Arc<dyn IdGenerator>,
    name: &str,
) -> &'a mut RecordStore {
    maps.entry(name.to_string()).or_insert_with(|| {
        tracing::debug!("Creating record store {} in partition {}", name, partition_id);
        RecordStore::new(
            name,
            partition_id,
            config.find_matching_map_config(strip_map_prefix(name)),
            ids.clone(),
        )
    })
}
