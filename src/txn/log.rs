use super::types::{TransactionLogItem, TxnId};
use crate::record::types::Data;

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChangeKey {
    map_name: String,
    key: Data,
}

impl ChangeKey {
    fn of(item: &TransactionLogItem) -> Self {
        Self {
            map_name: item.map_name().to_string(),
            key: item.key().clone(),
        }
    }
}

/// Pending changes of one transaction within one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionLog {
    txn_id: TxnId,
    changes: HashMap<ChangeKey, TransactionLogItem>,
}

impl TransactionLog {
    pub fn new(txn_id: TxnId) -> Self {
        Self {
            txn_id,
            changes: HashMap::new(),
        }
    }

    pub fn txn_id(&self) -> &TxnId {
        &self.txn_id
    }

    /// Folds `item` into the log. Returns the pending item it replaced, if the
    /// transaction had already changed the same key of the same map.
    pub fn add_log_item(&mut self, item: TransactionLogItem) -> Option<TransactionLogItem> {
        self.changes.insert(ChangeKey::of(&item), item)
    }

    pub fn get(&self, map_name: &str, key: &Data) -> Option<&TransactionLogItem> {
        self.changes.get(&ChangeKey {
            map_name: map_name.to_string(),
            key: key.clone(),
        })
    }

    /// Latest pending change per key, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &TransactionLogItem> {
        self.changes.values()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
