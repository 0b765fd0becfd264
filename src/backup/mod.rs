//! Backup Application Module
//!
//! Applies replicated ("backup") mutations to a partition replica in the order the
//! primary produced them, even though the network delivers them in any order and
//! possibly more than once.
//!
//! ## Sequencing
//! Every backup operation of a partition carries a version. The `BackupSequencer`
//! tracks the highest version applied without gaps and decides what happens to each
//! incoming operation:
//! - **Next in line** (`applied + 1`): applied and acknowledged, then any buffered
//!   successors are drained in order without a second acknowledgment.
//! - **Already applied** (`<= applied`): acknowledged only. Redelivery never
//!   touches partition state.
//! - **Ahead of a gap**: buffered and acknowledged right away.
//! - **Buffer overflow** (more than `FLUSH_THRESHOLD` buffered): every buffered
//!   operation is applied in ascending version order and the applied version jumps
//!   to the highest of them. The missing versions are skipped for good.
//!
//! The sequencer is a two-state machine: `CaughtUp` while the buffer is empty and
//! `CatchingUp` while it holds operations. A forced flush is the only transition that
//! leaves a gap behind and is reported as such in `HandleOutcome`.
//!
//! ## Acknowledged is not applied
//! The acknowledgment sent for a buffered operation confirms receipt only. If the
//! missing predecessor never arrives and the buffer overflows, the flush applies the
//! buffered operations but the lost one is never applied, even though the primary
//! may already count it as backed up. Memory for reordering stays bounded; the
//! price is that a permanently lost operation silently diverges the replica. Callers
//! must not treat an acknowledgment as proof of application.
//!
//! ## Submodules
//! - **`sequencer`**: The version state machine, generic over the operation type.
//! - **`operation`**: The `BackupOperation` trait and the concrete replicated
//!   partition mutations (`BackupOp`), with their acknowledgment sinks.

pub mod operation;
pub mod sequencer;

#[cfg(test)]
mod tests;
