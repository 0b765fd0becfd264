use crate::partition::state::PartitionState;
use crate::record::types::{Data, ExpiryPolicy};
use crate::txn::log::TransactionLog;
use crate::txn::types::TxnId;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A versioned replicated mutation, as seen by the `BackupSequencer`.
pub trait BackupOperation {
    /// What the operation mutates when applied.
    type Target;

    /// Position of this operation in its partition's backup stream.
    fn version(&self) -> u64;

    /// Mutates `target` without telling the sender anything.
    fn apply(&self, target: &mut Self::Target);

    /// Tells the sender the operation was received.
    fn acknowledge(&self);

    fn apply_and_acknowledge(&self, target: &mut Self::Target) {
        self.apply(target);
        self.acknowledge();
    }
}

/// Acknowledgment of one backup operation, sent back towards the primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackupAck {
    pub partition_id: u32,
    pub version: u64,
}

/// Where acknowledgments go. Implemented by the network layer.
pub trait BackupAcknowledger: Send + Sync {
    fn acknowledge(&self, ack: BackupAck);
}

/// Acknowledger that forwards to an in-process channel.
pub struct ChannelAcknowledger {
    tx: mpsc::UnboundedSender<BackupAck>,
}

impl ChannelAcknowledger {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<BackupAck>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl BackupAcknowledger for ChannelAcknowledger {
    fn acknowledge(&self, ack: BackupAck) {
        if self.tx.send(ack).is_err() {
            tracing::warn!(
                "Dropped ack for partition {} version {}: receiver closed",
                ack.partition_id,
                ack.version
            );
        }
    }
}

/// Partition mutations replicated from the primary.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupMutation {
    /// `expiry: None` falls back to the map's configured ttl and max-idle.
    Put {
        map_name: String,
        key: Data,
        value: Data,
        expiry: Option<ExpiryPolicy>,
    },
    Remove {
        map_name: String,
        key: Data,
    },
    PutTransactionLog {
        log: TransactionLog,
    },
    Commit {
        txn_id: TxnId,
    },
    Rollback {
        txn_id: TxnId,
    },
    /// Releases the log of a transaction the primary has finished with.
    RemoveTransactionLog {
        txn_id: TxnId,
    },
}

/// A backup operation addressed to one partition replica.
pub struct BackupOp {
    partition_id: u32,
    version: u64,
    mutation: BackupMutation,
    acknowledger: Arc<dyn BackupAcknowledger>,
}

impl BackupOp {
    pub fn new(
        partition_id: u32,
        version: u64,
        mutation: BackupMutation,
        acknowledger: Arc<dyn BackupAcknowledger>,
    ) -> Self {
        Self {
            partition_id,
            version,
            mutation,
            acknowledger,
        }
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn mutation(&self) -> &BackupMutation {
        &self.mutation
    }
}

impl BackupOperation for BackupOp {
    type Target = PartitionState;

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&self, state: &mut PartitionState) {
        tracing::trace!(
            "{} applying backup v{} to partition {}",
            state.this_address(),
            self.version,
            self.partition_id
        );
        match &self.mutation {
            BackupMutation::Put {
                map_name,
                key,
                value,
                expiry,
            } => {
                let store = state.get_record_store(map_name);
                let expiry = expiry.unwrap_or_else(|| store.config().expiry_policy());
                store.upsert(key.clone(), value.clone(), expiry);
            }
            BackupMutation::Remove { map_name, key } => {
                state.get_record_store(map_name).remove(key);
            }
            BackupMutation::PutTransactionLog { log } => {
                state.put_transaction_log(log.txn_id().clone(), log.clone());
            }
            BackupMutation::Commit { txn_id } => {
                state.commit(txn_id);
            }
            BackupMutation::Rollback { txn_id } => {
                state.rollback(txn_id);
            }
            BackupMutation::RemoveTransactionLog { txn_id } => {
                state.remove_transaction_log(txn_id);
            }
        }
    }

    fn acknowledge(&self) {
        self.acknowledger.acknowledge(BackupAck {
            partition_id: self.partition_id,
            version: self.version,
        });
    }
}
