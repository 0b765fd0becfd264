use super::partitioner::Partitioner;
use crate::backup::operation::BackupOp;
use crate::backup::sequencer::HandleOutcome;
use crate::config::service::ServiceConfig;
use crate::membership::types::{Address, MemberEvent};
use crate::partition::container::{PartitionContainer, PartitionStats};
use crate::partition::hooks::{DeadMemberHook, NoopDeadMemberHook};
use crate::partition::state::CommitReport;
use crate::record::ids::AtomicIdGenerator;
use crate::record::types::Data;
use crate::txn::log::TransactionLog;
use crate::txn::types::{TransactionLogItem, TxnId};

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

type PartitionTask = Box<dyn FnOnce(&mut PartitionContainer) + Send>;

enum PartitionCommand {
    Run(PartitionTask),
    Stop,
}

/// The partition containers of the local node, each behind its own worker task.
pub struct MapService {
    this_address: Address,
    config: Arc<ServiceConfig>,
    partitioner: Partitioner,
    partitions: Vec<mpsc::UnboundedSender<PartitionCommand>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl MapService {
    /// Starts one worker per partition. Must be called inside a tokio runtime.
    pub fn new(this_address: Address, config: ServiceConfig) -> Arc<Self> {
        Self::with_dead_member_hooks(this_address, config, |_| Box::new(NoopDeadMemberHook))
    }

    /// Like `new`, with a member-death hook built per partition by `make_hook`.
    pub fn with_dead_member_hooks<F>(
        this_address: Address,
        config: ServiceConfig,
        make_hook: F,
    ) -> Arc<Self>
    where
        F: Fn(u32) -> Box<dyn DeadMemberHook>,
    {
        let config = Arc::new(config);
        let ids = Arc::new(AtomicIdGenerator::new());
        let partitioner = Partitioner::new(config.partition_count);

        let mut partitions = Vec::with_capacity(partitioner.partition_count() as usize);
        let mut workers = Vec::with_capacity(partitioner.partition_count() as usize);

        for partition_id in 0..partitioner.partition_count() {
            let container =
                PartitionContainer::new(partition_id, this_address, config.clone(), ids.clone())
                    .with_dead_member_hook(make_hook(partition_id));
            let (tx, rx) = mpsc::unbounded_channel();
            partitions.push(tx);
            workers.push(tokio::spawn(partition_worker(container, rx)));
        }

        tracing::info!(
            "Map service on {} started {} partition workers",
            this_address,
            partitioner.partition_count()
        );

        Arc::new(Self {
            this_address,
            config,
            partitioner,
            partitions,
            workers: Mutex::new(workers),
        })
    }

    pub fn this_address(&self) -> &Address {
        &self.this_address
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn partitioner(&self) -> &Partitioner {
        &self.partitioner
    }

    pub fn partition_count(&self) -> u32 {
        self.partitioner.partition_count()
    }

    /// Runs `f` on the partition's worker, after every command queued before it.
    pub async fn execute<R, F>(&self, partition_id: u32, f: F) -> Result<R>
    where
        F: FnOnce(&mut PartitionContainer) -> R + Send + 'static,
        R: Send + 'static,
    {
        let tx = self
            .partitions
            .get(partition_id as usize)
            .ok_or_else(|| anyhow::anyhow!("Unknown partition {}", partition_id))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        let task: PartitionTask = Box::new(move |container| {
            let _ = reply_tx.send(f(container));
        });

        tx.send(PartitionCommand::Run(task))
            .map_err(|_| anyhow::anyhow!("Partition {} worker stopped", partition_id))?;

        reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("Partition {} worker dropped the reply", partition_id))
    }

    pub async fn handle_backup_operation(&self, op: BackupOp) -> Result<HandleOutcome> {
        self.execute(op.partition_id(), move |container| {
            container.handle_backup_operation(op)
        })
        .await
    }

    pub async fn increment_and_get_version(&self, partition_id: u32) -> Result<u64> {
        self.execute(partition_id, |container| container.increment_and_get_version())
            .await
    }

    pub async fn add_transaction_log_item(
        &self,
        partition_id: u32,
        txn_id: TxnId,
        item: TransactionLogItem,
    ) -> Result<()> {
        self.execute(partition_id, move |container| {
            container.add_transaction_log_item(&txn_id, item)
        })
        .await
    }

    pub async fn put_transaction_log(&self, partition_id: u32, log: TransactionLog) -> Result<()> {
        self.execute(partition_id, move |container| {
            container.put_transaction_log(log.txn_id().clone(), log)
        })
        .await
    }

    pub async fn get_transaction_log(
        &self,
        partition_id: u32,
        txn_id: TxnId,
    ) -> Result<Option<TransactionLog>> {
        self.execute(partition_id, move |container| {
            container.get_transaction_log(&txn_id).cloned()
        })
        .await
    }

    pub async fn commit(&self, partition_id: u32, txn_id: TxnId) -> Result<Option<CommitReport>> {
        self.execute(partition_id, move |container| container.commit(&txn_id))
            .await
    }

    /// Releases the log of a committed transaction.
    pub async fn remove_transaction_log(
        &self,
        partition_id: u32,
        txn_id: TxnId,
    ) -> Result<Option<TransactionLog>> {
        self.execute(partition_id, move |container| {
            container.remove_transaction_log(&txn_id)
        })
        .await
    }

    pub async fn rollback(&self, partition_id: u32, txn_id: TxnId) -> Result<()> {
        self.execute(partition_id, move |container| container.rollback(&txn_id))
            .await
    }

    /// Current value of `key` in map `map_name`, routed to the key's partition.
    pub async fn get(&self, map_name: &str, key: Data) -> Result<Option<Data>> {
        let partition_id = self.partitioner.partition_for_key(&key);
        let map_name = map_name.to_string();
        self.execute(partition_id, move |container| {
            container
                .state()
                .record_store(&map_name)
                .and_then(|store| store.get(&key))
                .map(|record| record.value().clone())
        })
        .await
    }

    pub async fn on_dead_address(&self, dead: Address) -> Result<()> {
        tracing::info!("Member {} is dead, notifying {} partitions", dead, self.partitions.len());
        for partition_id in 0..self.partition_count() {
            self.execute(partition_id, move |container| container.on_dead_address(&dead))
                .await?;
        }
        Ok(())
    }

    /// Forwards membership events until the stream closes or the service stops.
    pub fn spawn_member_listener(
        self: &Arc<Self>,
        mut events: broadcast::Receiver<MemberEvent>,
    ) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(MemberEvent::Dead(address)) => {
                        if let Err(e) = service.on_dead_address(address).await {
                            tracing::warn!("Stopping member listener: {}", e);
                            break;
                        }
                    }
                    Ok(MemberEvent::Joined(address)) => {
                        tracing::debug!("Member {} joined", address);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Member listener lagged, {} events skipped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    pub async fn stats(&self) -> Result<Vec<PartitionStats>> {
        let mut stats = Vec::with_capacity(self.partitions.len());
        for partition_id in 0..self.partition_count() {
            stats.push(self.execute(partition_id, |container| container.stats()).await?);
        }
        Ok(stats)
    }

    /// Stops every partition worker after its queued commands and waits for them.
    pub async fn shutdown(&self) {
        for tx in &self.partitions {
            let _ = tx.send(PartitionCommand::Stop);
        }
        let workers = std::mem::take(&mut *self.workers.lock().await);
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("Partition worker failed: {}", e);
            }
        }
        tracing::info!("Map service on {} stopped", self.this_address);
    }
}

async fn partition_worker(
    mut container: PartitionContainer,
    mut commands: mpsc::UnboundedReceiver<PartitionCommand>,
) {
    tracing::debug!("Partition {} worker started", container.partition_id());

    while let Some(command) = commands.recv().await {
        match command {
            PartitionCommand::Run(task) => task(&mut container),
            PartitionCommand::Stop => break,
        }
    }

    tracing::debug!("Partition {} worker stopped", container.partition_id());
}
