//! Transaction Log Module
//!
//! A transaction that touches a partition leaves its pending changes here until
//! the partition container commits or rolls it back.
//!
//! ## Core Concepts
//! - **TxnId**: Cluster-wide transaction identifier. A transaction spanning several
//!   partitions has one `TransactionLog` per partition it touched.
//! - **TransactionLogItem**: One pending change (put or remove) of a key in a map.
//! - **TransactionLog**: The pending changes of one transaction, keyed by
//!   `(map name, key)`. A later change to the same key replaces the earlier one, so
//!   a commit only ever sees the latest value per key.

pub mod log;
pub mod types;
