use super::operation::BackupOperation;
use std::collections::HashMap;

/// Buffered operations beyond this count force a flush past the gap.
pub const FLUSH_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Nothing buffered; the applied version is the latest seen in order.
    CaughtUp,
    /// Operations are buffered behind a missing version.
    CatchingUp,
}

/// What happened to the handled operation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Applied and acknowledged; `drained` buffered successors were applied after it.
    Applied { drained: usize },
    /// Version already applied; acknowledged only.
    Duplicate,
    /// Ahead of a gap; buffered and acknowledged.
    Buffered,
}

/// A flush forced by buffer overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedFlush {
    /// First version that was missing when the flush started. Never applied
    /// unless it was among the buffered ones.
    pub first_missing: u64,
    /// Number of buffered operations applied by the flush.
    pub applied: usize,
    /// Applied version after the flush.
    pub applied_version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleOutcome {
    pub version: u64,
    pub delivery: Delivery,
    pub forced_flush: Option<ForcedFlush>,
}

/// Applied-version counter plus the bounded reorder buffer of one partition.
///
/// Not synchronized: the owning partition serializes every call.
pub struct BackupSequencer<O> {
    applied_version: u64,
    buffer: HashMap<u64, O>,
}

impl<O: BackupOperation> BackupSequencer<O> {
    pub fn new() -> Self {
        Self {
            applied_version: 0,
            buffer: HashMap::new(),
        }
    }

    pub fn applied_version(&self) -> u64 {
        self.applied_version
    }

    pub fn state(&self) -> SequencerState {
        if self.buffer.is_empty() {
            SequencerState::CaughtUp
        } else {
            SequencerState::CatchingUp
        }
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Buffered versions in ascending order.
    pub fn buffered_versions(&self) -> Vec<u64> {
        let mut versions: Vec<u64> = self.buffer.keys().copied().collect();
        versions.sort_unstable();
        versions
    }

    /// Advances the counter to stamp a new outgoing backup operation.
    ///
    /// Used when this partition is the primary. On a replica the counter tracks
    /// the applied version instead, so both uses share it.
    pub fn increment_and_get_version(&mut self) -> u64 {
        self.applied_version = self.applied_version.saturating_add(1);
        self.applied_version
    }

    /// Routes `op` through the sequencing rules. Every call ends with the operation
    /// either applied or acknowledged; nothing is rejected.
    pub fn handle(&mut self, op: O, target: &mut O::Target) -> HandleOutcome {
        let version = op.version();

        let delivery = if self.applied_version.checked_add(1) == Some(version) {
            op.apply_and_acknowledge(target);
            self.applied_version = version;
            let drained = self.drain_contiguous(target);
            Delivery::Applied { drained }
        } else if version <= self.applied_version {
            op.acknowledge();
            Delivery::Duplicate
        } else {
            op.acknowledge();
            self.buffer.insert(version, op);
            Delivery::Buffered
        };

        let forced_flush = if self.buffer.len() > FLUSH_THRESHOLD {
            Some(self.force_flush(target))
        } else {
            None
        };

        HandleOutcome {
            version,
            delivery,
            forced_flush,
        }
    }

    /// Buffered successors were acknowledged when buffered; apply them silently.
    fn drain_contiguous(&mut self, target: &mut O::Target) -> usize {
        let mut drained = 0;
        while let Some(next) = self.applied_version.checked_add(1)
            && let Some(op) = self.buffer.remove(&next)
        {
            op.apply(target);
            self.applied_version = next;
            drained += 1;
        }
        drained
    }

    fn force_flush(&mut self, target: &mut O::Target) -> ForcedFlush {
        let first_missing = self.applied_version.saturating_add(1);

        let mut pending: Vec<O> = self.buffer.drain().map(|(_, op)| op).collect();
        pending.sort_by_key(|op| op.version());

        let applied = pending.len();
        for op in pending {
            op.apply(target);
            self.applied_version = op.version();
        }

        ForcedFlush {
            first_missing,
            applied,
            applied_version: self.applied_version,
        }
    }
}

impl<O: BackupOperation> Default for BackupSequencer<O> {
    fn default() -> Self {
        Self::new()
    }
}
