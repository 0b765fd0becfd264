use crate::record::types::Data;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a cluster-wide transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TxnId(pub String);

impl TxnId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxnId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// What a commit will do to a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingChange {
    Put(Data),
    /// Tombstone: the key is deleted on commit.
    Remove,
}

/// One pending change of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLogItem {
    map_name: String,
    key: Data,
    change: PendingChange,
}

impl TransactionLogItem {
    pub fn put(map_name: impl Into<String>, key: Data, value: Data) -> Self {
        Self {
            map_name: map_name.into(),
            key,
            change: PendingChange::Put(value),
        }
    }

    pub fn remove(map_name: impl Into<String>, key: Data) -> Self {
        Self {
            map_name: map_name.into(),
            key,
            change: PendingChange::Remove,
        }
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn key(&self) -> &Data {
        &self.key
    }

    pub fn change(&self) -> &PendingChange {
        &self.change
    }

    /// `None` for removals.
    pub fn value(&self) -> Option<&Data> {
        match &self.change {
            PendingChange::Put(value) => Some(value),
            PendingChange::Remove => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.change == PendingChange::Remove
    }
}
