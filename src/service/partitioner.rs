use crate::record::types::Data;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Maps keys to partition ids.
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    partition_count: u32,
}

impl Partitioner {
    /// `partition_count` must be at least 1; `ServiceConfig::validate` enforces it.
    pub fn new(partition_count: u32) -> Self {
        Self {
            partition_count: partition_count.max(1),
        }
    }

    pub fn partition_count(&self) -> u32 {
        self.partition_count
    }

    pub fn partition_for_key(&self, key: &Data) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.as_bytes().hash(&mut hasher);
        (hasher.finish() % self.partition_count as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_deterministic() {
        let partitioner = Partitioner::new(271);

        let p1 = partitioner.partition_for_key(&Data::from("order-100"));
        let p2 = partitioner.partition_for_key(&Data::from("order-100"));
        assert_eq!(p1, p2);
        assert!(p1 < 271);
    }

    #[test]
    fn test_partition_distribution() {
        let partitioner = Partitioner::new(64);
        let mut used = std::collections::HashSet::new();

        for i in 0..5000 {
            used.insert(partitioner.partition_for_key(&Data::from(format!("key-{}", i).as_str())));
        }

        // 5000 keys over 64 partitions should touch nearly all of them.
        assert!(used.len() > 48, "only {} partitions used", used.len());
    }

    #[test]
    fn test_zero_partition_count_is_clamped() {
        let partitioner = Partitioner::new(0);
        assert_eq!(partitioner.partition_count(), 1);
        assert_eq!(partitioner.partition_for_key(&Data::from("k")), 0);
    }
}
