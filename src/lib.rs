//! Partition Replica Library
//!
//! The per-partition core of a distributed in-memory key-value store: the unit that
//! owns one partition's data on one node, applies replicated mutations in version
//! order, and commits or rolls back the partition's share of multi-key transactions.
//!
//! ## Architecture Modules
//! - **`record`**: Records and the per-map record stores of a partition.
//! - **`txn`**: Transaction logs of pending per-key changes.
//! - **`backup`**: Versioned replicated operations and the sequencer that orders,
//!   buffers, deduplicates and force-flushes them.
//! - **`partition`**: The `PartitionContainer` composing all of the above.
//! - **`service`**: The `MapService` running one worker task per partition, which
//!   serializes every mutation of a container.
//! - **`config`**: Service and per-map configuration with wildcard resolution.
//! - **`membership`**: Addresses and member events consumed from the membership layer.

pub mod backup;
pub mod config;
pub mod membership;
pub mod partition;
pub mod record;
pub mod service;
pub mod txn;
