use std::sync::atomic::{AtomicU64, Ordering};

/// Source of service-wide unique record ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u64;
}

/// Monotonic in-process id generator shared by every partition of a node.
#[derive(Debug, Default)]
pub struct AtomicIdGenerator {
    last: AtomicU64,
}

impl AtomicIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// The first id handed out will be `last + 1`.
    pub fn starting_at(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }
}

impl IdGenerator for AtomicIdGenerator {
    fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }
}
