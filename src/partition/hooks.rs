use super::state::PartitionState;
use crate::membership::types::Address;

/// Reaction of a partition to the death of a cluster member.
///
/// The default does nothing. An implementation is expected to drop the dead
/// member's scheduled operations, transactions and locks.
pub trait DeadMemberHook: Send {
    fn on_dead_address(&self, state: &mut PartitionState, dead: &Address) {
        let _ = (state, dead);
    }
}

pub struct NoopDeadMemberHook;

impl DeadMemberHook for NoopDeadMemberHook {}
