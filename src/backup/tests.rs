//! Backup Sequencing Tests
//!
//! ## Test Scopes
//! - **In-order delivery**: apply + acknowledge, applied version tracking.
//! - **Duplicates**: acknowledge only, no state change.
//! - **Gaps**: buffering, draining once the gap closes.
//! - **Overflow**: forced flush past a gap that never closes.
//! - **Shuffled delivery**: ordering and acknowledgment properties over random
//!   delivery orders.

#[cfg(test)]
mod tests {
    use crate::backup::operation::BackupOperation;
    use crate::backup::sequencer::{
        BackupSequencer, Delivery, FLUSH_THRESHOLD, ForcedFlush, SequencerState,
    };
    use rand::seq::SliceRandom;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records applications into the target and acknowledgments into a shared log.
    struct RecordingOp {
        version: u64,
        acks: Rc<RefCell<Vec<u64>>>,
    }

    impl BackupOperation for RecordingOp {
        type Target = Vec<u64>;

        fn version(&self) -> u64 {
            self.version
        }

        fn apply(&self, applied: &mut Vec<u64>) {
            applied.push(self.version);
        }

        fn acknowledge(&self) {
            self.acks.borrow_mut().push(self.version);
        }
    }

    struct Harness {
        sequencer: BackupSequencer<RecordingOp>,
        applied: Vec<u64>,
        acks: Rc<RefCell<Vec<u64>>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                sequencer: BackupSequencer::new(),
                applied: Vec::new(),
                acks: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn deliver(&mut self, version: u64) -> crate::backup::sequencer::HandleOutcome {
            let op = RecordingOp {
                version,
                acks: self.acks.clone(),
            };
            self.sequencer.handle(op, &mut self.applied)
        }

        fn acks(&self) -> Vec<u64> {
            self.acks.borrow().clone()
        }
    }

    // ============================================================
    // IN-ORDER DELIVERY
    // ============================================================

    #[test]
    fn test_starts_caught_up_at_zero() {
        let harness = Harness::new();
        assert_eq!(harness.sequencer.applied_version(), 0);
        assert_eq!(harness.sequencer.state(), SequencerState::CaughtUp);
    }

    #[test]
    fn test_in_order_delivery_applies_each_once() {
        let mut harness = Harness::new();

        for version in 1..=10 {
            let outcome = harness.deliver(version);
            assert_eq!(outcome.delivery, Delivery::Applied { drained: 0 });
            assert!(outcome.forced_flush.is_none());
        }

        assert_eq!(harness.sequencer.applied_version(), 10);
        assert_eq!(harness.applied, (1..=10).collect::<Vec<_>>());
        assert_eq!(harness.acks(), (1..=10).collect::<Vec<_>>());
    }

    // ============================================================
    // DUPLICATES
    // ============================================================

    #[test]
    fn test_redelivery_only_acknowledges() {
        let mut harness = Harness::new();
        for version in 1..=3 {
            harness.deliver(version);
        }

        let outcome = harness.deliver(2);
        assert_eq!(outcome.delivery, Delivery::Duplicate);
        let outcome = harness.deliver(3);
        assert_eq!(outcome.delivery, Delivery::Duplicate);

        assert_eq!(harness.applied, vec![1, 2, 3], "Duplicates must not mutate state");
        assert_eq!(harness.sequencer.applied_version(), 3);
        assert_eq!(harness.acks(), vec![1, 2, 3, 2, 3]);
    }

    #[test]
    fn test_version_zero_is_a_duplicate() {
        let mut harness = Harness::new();
        assert_eq!(harness.deliver(0).delivery, Delivery::Duplicate);
        assert!(harness.applied.is_empty());
        assert_eq!(harness.acks(), vec![0]);
    }

    // ============================================================
    // GAPS
    // ============================================================

    #[test]
    fn test_gap_is_buffered_then_drained() {
        let mut harness = Harness::new();

        harness.deliver(1);
        assert_eq!(harness.sequencer.applied_version(), 1);

        assert_eq!(harness.deliver(3).delivery, Delivery::Buffered);
        assert_eq!(harness.sequencer.buffered_versions(), vec![3]);
        assert_eq!(harness.sequencer.applied_version(), 1);
        assert_eq!(harness.sequencer.state(), SequencerState::CatchingUp);

        let outcome = harness.deliver(4);
        assert_eq!(outcome.delivery, Delivery::Buffered);
        assert!(outcome.forced_flush.is_none());
        assert_eq!(harness.sequencer.buffered_versions(), vec![3, 4]);
        assert_eq!(harness.sequencer.applied_version(), 1);

        let outcome = harness.deliver(2);
        assert_eq!(outcome.delivery, Delivery::Applied { drained: 2 });
        assert_eq!(harness.sequencer.applied_version(), 4);
        assert_eq!(harness.sequencer.buffered_len(), 0);
        assert_eq!(harness.sequencer.state(), SequencerState::CaughtUp);

        assert_eq!(harness.applied, vec![1, 2, 3, 4]);
        // Drained operations were acknowledged when buffered, not again.
        assert_eq!(harness.acks(), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_drain_stops_at_next_gap() {
        let mut harness = Harness::new();
        harness.deliver(2);
        harness.deliver(4);

        let outcome = harness.deliver(1);

        assert_eq!(outcome.delivery, Delivery::Applied { drained: 1 });
        assert_eq!(harness.sequencer.applied_version(), 2);
        assert_eq!(harness.sequencer.buffered_versions(), vec![4]);
    }

    #[test]
    fn test_rebuffering_same_version_keeps_one_entry() {
        let mut harness = Harness::new();
        harness.deliver(3);
        harness.deliver(3);

        assert_eq!(harness.sequencer.buffered_versions(), vec![3]);
        assert_eq!(harness.acks(), vec![3, 3]);
    }

    // ============================================================
    // FORCED FLUSH
    // ============================================================

    #[test]
    fn test_buffer_at_threshold_does_not_flush() {
        let mut harness = Harness::new();
        for version in 2..2 + FLUSH_THRESHOLD as u64 {
            assert!(harness.deliver(version).forced_flush.is_none());
        }
        assert_eq!(harness.sequencer.buffered_len(), FLUSH_THRESHOLD);
        assert!(harness.applied.is_empty());
    }

    #[test]
    fn test_overflow_flushes_past_missing_version() {
        let mut harness = Harness::new();
        harness.deliver(1);
        harness.deliver(5);
        harness.deliver(3);
        harness.deliver(4);

        let outcome = harness.deliver(6);

        assert_eq!(outcome.delivery, Delivery::Buffered);
        assert_eq!(
            outcome.forced_flush,
            Some(ForcedFlush {
                first_missing: 2,
                applied: 4,
                applied_version: 6,
            })
        );
        assert_eq!(harness.applied, vec![1, 3, 4, 5, 6], "Flush applies in version order");
        assert_eq!(harness.sequencer.applied_version(), 6);
        assert_eq!(harness.sequencer.state(), SequencerState::CaughtUp);

        // The skipped version arriving late is now a duplicate and is never applied.
        assert_eq!(harness.deliver(2).delivery, Delivery::Duplicate);
        assert_eq!(harness.applied, vec![1, 3, 4, 5, 6]);
        assert_eq!(harness.acks(), vec![1, 5, 3, 4, 6, 2]);
    }

    #[test]
    fn test_flush_jumps_over_inner_gaps() {
        let mut harness = Harness::new();
        for version in [10, 20, 30, 40] {
            harness.deliver(version);
        }

        assert_eq!(harness.applied, vec![10, 20, 30, 40]);
        assert_eq!(harness.sequencer.applied_version(), 40);
        assert_eq!(harness.deliver(41).delivery, Delivery::Applied { drained: 0 });
    }

    // ============================================================
    // VERSION STAMPING
    // ============================================================

    #[test]
    fn test_increment_and_get_version() {
        let mut harness = Harness::new();
        assert_eq!(harness.sequencer.increment_and_get_version(), 1);
        assert_eq!(harness.sequencer.increment_and_get_version(), 2);
        assert_eq!(harness.sequencer.applied_version(), 2);
        assert_eq!(harness.deliver(2).delivery, Delivery::Duplicate);
    }

    // ============================================================
    // SHUFFLED DELIVERY
    // ============================================================

    #[test]
    fn test_shuffled_delivery_properties() {
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let mut versions: Vec<u64> = (1..=25).collect();
            versions.shuffle(&mut rng);

            let mut harness = Harness::new();
            for &version in &versions {
                harness.deliver(version);
                assert!(harness.sequencer.buffered_len() <= FLUSH_THRESHOLD);
            }

            // Every delivery produced exactly one acknowledgment.
            let mut acks = harness.acks();
            acks.sort_unstable();
            assert_eq!(acks, (1..=25).collect::<Vec<_>>(), "order: {:?}", versions);

            // Applications are strictly increasing, so nothing is applied twice.
            assert!(
                harness.applied.windows(2).all(|w| w[0] < w[1]),
                "order: {:?}, applied: {:?}",
                versions,
                harness.applied
            );

            assert_eq!(harness.sequencer.applied_version(), 25);
            assert_eq!(harness.sequencer.state(), SequencerState::CaughtUp);
        }
    }

    #[test]
    fn test_small_reorderings_never_skip() {
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            // Swap neighbours only: at most one op waits in the buffer.
            let mut versions: Vec<u64> = (1..=30).collect();
            let mut i = 0;
            while i + 1 < versions.len() {
                if rand::Rng::gen_bool(&mut rng, 0.5) {
                    versions.swap(i, i + 1);
                    i += 2;
                } else {
                    i += 1;
                }
            }

            let mut harness = Harness::new();
            for &version in &versions {
                let outcome = harness.deliver(version);
                assert!(outcome.forced_flush.is_none());
            }

            assert_eq!(harness.applied, (1..=30).collect::<Vec<_>>());
        }
    }

    // ============================================================
    // VERSION CEILING
    // ============================================================

    #[test]
    fn test_flush_up_to_max_version_keeps_handling() {
        let mut harness = Harness::new();

        for version in u64::MAX - 3..=u64::MAX {
            harness.deliver(version);
        }
        assert_eq!(harness.sequencer.applied_version(), u64::MAX);
        assert_eq!(harness.sequencer.state(), SequencerState::CaughtUp);

        let outcome = harness.deliver(5);

        assert_eq!(outcome.delivery, Delivery::Duplicate);
        assert_eq!(harness.acks().last(), Some(&5));
        assert_eq!(harness.applied.len(), 4);
    }

    #[test]
    fn test_in_order_delivery_reaches_max_version() {
        let mut harness = Harness::new();
        for version in u64::MAX - 5..=u64::MAX - 2 {
            harness.deliver(version);
        }
        assert_eq!(harness.sequencer.applied_version(), u64::MAX - 2);

        // Buffer the last version, then close the gap so the drain reaches the ceiling.
        assert_eq!(harness.deliver(u64::MAX).delivery, Delivery::Buffered);
        let outcome = harness.deliver(u64::MAX - 1);

        assert_eq!(outcome.delivery, Delivery::Applied { drained: 1 });
        assert_eq!(harness.sequencer.applied_version(), u64::MAX);
        assert_eq!(harness.sequencer.buffered_len(), 0);
    }

    #[test]
    fn test_increment_and_get_version_saturates() {
        let mut harness = Harness::new();
        for version in u64::MAX - 3..=u64::MAX {
            harness.deliver(version);
        }

        assert_eq!(harness.sequencer.increment_and_get_version(), u64::MAX);
        assert_eq!(harness.sequencer.applied_version(), u64::MAX);
    }
}
