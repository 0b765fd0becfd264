//! Partition Container Module
//!
//! Everything one node holds for one partition: the record stores of every map,
//! the pending transaction logs, the scheduled-operation slots and the backup
//! sequencer.
//!
//! ## Single Writer
//! A `PartitionContainer` is not synchronized. All mutating calls for one partition
//! must be serialized by the caller; the `MapService` does this by giving each
//! container its own worker task. The sequencer's version comparisons are only
//! correct under that discipline.
//!
//! ## Totality
//! Nothing here returns an error. Duplicate or out-of-order backups, commits and
//! rollbacks of unknown transactions, and removals of absent keys are all ordinary
//! inputs with a defined outcome.
//!
//! ## Submodules
//! - **`container`**: The composed container and its public surface.
//! - **`state`**: Map and transaction tables, commit and rollback. This is what
//!   backup operations mutate.
//! - **`scheduled`**: Storage slots for operations deferred by the lock layer.
//! - **`hooks`**: Extension point for member-death cleanup.

pub mod container;
pub mod hooks;
pub mod scheduled;
pub mod state;
