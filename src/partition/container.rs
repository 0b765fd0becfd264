use super::hooks::{DeadMemberHook, NoopDeadMemberHook};
use super::state::{CommitReport, PartitionState};
use crate::backup::operation::BackupOp;
use crate::backup::sequencer::{BackupSequencer, Delivery, HandleOutcome, SequencerState};
use crate::config::map_config::{MapConfig, MapConfigResolver};
use crate::membership::types::Address;
use crate::record::ids::IdGenerator;
use crate::record::store::RecordStore;
use crate::txn::log::TransactionLog;
use crate::txn::types::{TransactionLogItem, TxnId};

use std::sync::Arc;

/// Point-in-time counters of one partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionStats {
    pub partition_id: u32,
    pub applied_version: u64,
    pub buffered_backups: usize,
    pub record_stores: usize,
    pub records: usize,
    pub transactions: usize,
    pub scheduled_operations: usize,
}

/// One partition replica on this node.
pub struct PartitionContainer {
    partition_id: u32,
    sequencer: BackupSequencer<BackupOp>,
    state: PartitionState,
    dead_member_hook: Box<dyn DeadMemberHook>,
}

impl PartitionContainer {
    pub fn new(
        partition_id: u32,
        this_address: Address,
        config: Arc<dyn MapConfigResolver>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            partition_id,
            sequencer: BackupSequencer::new(),
            state: PartitionState::new(partition_id, this_address, config, ids),
            dead_member_hook: Box::new(NoopDeadMemberHook),
        }
    }

    pub fn with_dead_member_hook(mut self, hook: Box<dyn DeadMemberHook>) -> Self {
        self.dead_member_hook = hook;
        self
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn this_address(&self) -> &Address {
        self.state.this_address()
    }

    pub fn state(&self) -> &PartitionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PartitionState {
        &mut self.state
    }

    // --- Backup sequencing ---

    pub fn handle_backup_operation(&mut self, op: BackupOp) -> HandleOutcome {
        if op.partition_id() != self.partition_id {
            tracing::warn!(
                "{} partition {} received backup addressed to partition {}",
                self.this_address(),
                self.partition_id,
                op.partition_id()
            );
        }

        let outcome = self.sequencer.handle(op, &mut self.state);

        match outcome.delivery {
            Delivery::Applied { drained } => tracing::trace!(
                "{} partition {} applied backup v{} (+{} drained)",
                self.this_address(),
                self.partition_id,
                outcome.version,
                drained
            ),
            Delivery::Duplicate => tracing::debug!(
                "{} partition {} ignored duplicate backup v{} (applied v{})",
                self.this_address(),
                self.partition_id,
                outcome.version,
                self.sequencer.applied_version()
            ),
            Delivery::Buffered => tracing::debug!(
                "{} partition {} buffered backup v{} waiting for v{}",
                self.this_address(),
                self.partition_id,
                outcome.version,
                self.sequencer.applied_version().saturating_add(1)
            ),
        }

        if let Some(flush) = outcome.forced_flush {
            tracing::warn!(
                "{} partition {} forced flush of {} buffered backups past missing v{}, applied version now v{}",
                self.this_address(),
                self.partition_id,
                flush.applied,
                flush.first_missing,
                flush.applied_version
            );
        }

        outcome
    }

    pub fn increment_and_get_version(&mut self) -> u64 {
        self.sequencer.increment_and_get_version()
    }

    pub fn applied_version(&self) -> u64 {
        self.sequencer.applied_version()
    }

    pub fn sequencer_state(&self) -> SequencerState {
        self.sequencer.state()
    }

    pub fn buffered_backup_versions(&self) -> Vec<u64> {
        self.sequencer.buffered_versions()
    }

    // --- Maps ---

    /// Configuration of a map, resolved after stripping its service prefix.
    pub fn get_map_config(&self, name: &str) -> Arc<MapConfig> {
        self.state.get_map_config(name)
    }

    pub fn get_record_store(&mut self, name: &str) -> &mut RecordStore {
        self.state.get_record_store(name)
    }

    // --- Transactions ---

    pub fn get_transaction_log(&self, txn_id: &TxnId) -> Option<&TransactionLog> {
        self.state.get_transaction_log(txn_id)
    }

    pub fn add_transaction_log_item(&mut self, txn_id: &TxnId, item: TransactionLogItem) {
        self.state.add_transaction_log_item(txn_id, item);
    }

    pub fn put_transaction_log(&mut self, txn_id: TxnId, log: TransactionLog) {
        self.state.put_transaction_log(txn_id, log);
    }

    pub fn remove_transaction_log(&mut self, txn_id: &TxnId) -> Option<TransactionLog> {
        self.state.remove_transaction_log(txn_id)
    }

    pub fn commit(&mut self, txn_id: &TxnId) -> Option<CommitReport> {
        self.state.commit(txn_id)
    }

    pub fn rollback(&mut self, txn_id: &TxnId) {
        self.state.rollback(txn_id);
    }

    // --- Membership ---

    pub fn on_dead_address(&mut self, dead: &Address) {
        tracing::debug!(
            "{} partition {} notified of dead member {}",
            self.this_address(),
            self.partition_id,
            dead
        );
        self.dead_member_hook.on_dead_address(&mut self.state, dead);
    }

    pub fn stats(&self) -> PartitionStats {
        PartitionStats {
            partition_id: self.partition_id,
            applied_version: self.sequencer.applied_version(),
            buffered_backups: self.sequencer.buffered_len(),
            record_stores: self.state.record_store_count(),
            records: self.state.record_stores().map(RecordStore::len).sum(),
            transactions: self.state.transaction_count(),
            scheduled_operations: self.state.scheduled_operation_count(),
        }
    }
}
