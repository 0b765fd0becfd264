use crate::membership::types::Address;
use crate::record::types::Data;

/// Slot of deferred operations waiting on one key of one map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScheduledOperationKey {
    pub map_name: String,
    pub key: Data,
}

impl ScheduledOperationKey {
    pub fn new(map_name: impl Into<String>, key: Data) -> Self {
        Self {
            map_name: map_name.into(),
            key,
        }
    }
}

/// An operation parked by the lock layer. Opaque to the partition; it only
/// stores these in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledOperation {
    pub operation_id: u64,
    pub caller: Address,
}
