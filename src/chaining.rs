use alloc::vec::Vec;

use crate::error::TableError;
use crate::hash_table::Insertion;
use crate::hash_table::Stats;
use crate::hashing::primary_hash;
use crate::snapshot::SlotView;

/// Separate-chaining storage: one growable chain per bucket.
///
/// Keys are appended to the chain's backing vector, so the logical chain
/// (newest first) is the vector read back to front. Duplicates are kept as
/// separate entries.
#[derive(Clone)]
pub(crate) struct ChainedBuckets {
    buckets: Vec<Vec<i32>>,
}

impl ChainedBuckets {
    pub(crate) fn with_size(table_size: usize) -> Result<Self, TableError> {
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(table_size)
            .map_err(|_| TableError::AllocationFailed { slots: table_size })?;
        buckets.resize_with(table_size, Vec::new);

        Ok(Self { buckets })
    }

    pub(crate) fn insert(&mut self, key: i32, stats: &mut Stats) -> Result<Insertion, TableError> {
        let index = primary_hash(key, self.buckets.len());
        let bucket = &mut self.buckets[index];

        bucket
            .try_reserve(1)
            .map_err(|_| TableError::AllocationFailed {
                slots: bucket.len() + 1,
            })?;

        if !bucket.is_empty() {
            stats.collisions += 1;
        }
        bucket.push(key);
        stats.inserted += 1;

        Ok(Insertion::Inserted { index })
    }

    pub(crate) fn search(&self, key: i32) -> bool {
        self.buckets[primary_hash(key, self.buckets.len())].contains(&key)
    }

    /// Unlinks the newest entry equal to `key`.
    pub(crate) fn remove(&mut self, key: i32, stats: &mut Stats) -> bool {
        let index = primary_hash(key, self.buckets.len());
        let bucket = &mut self.buckets[index];

        match bucket.iter().rposition(|&k| k == key) {
            Some(position) => {
                bucket.remove(position);
                stats.inserted -= 1;
                true
            }
            None => false,
        }
    }

    /// The chain at `index`, newest key first.
    pub(crate) fn chain(&self, index: usize) -> impl Iterator<Item = i32> + '_ {
        self.buckets[index].iter().rev().copied()
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.buckets.len()).flat_map(move |index| self.chain(index))
    }

    pub(crate) fn slot_view(&self, index: usize) -> SlotView {
        let bucket = &self.buckets[index];
        if bucket.is_empty() {
            SlotView::Empty
        } else {
            SlotView::Chain(self.chain(index).collect())
        }
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn stats_for(size: usize) -> Stats {
        Stats {
            table_size: size,
            ..Stats::default()
        }
    }

    #[test]
    fn chain_is_newest_first() {
        let mut stats = stats_for(3);
        let mut buckets = ChainedBuckets::with_size(3).unwrap();
        // 1, 4 and 10 all land in bucket 1 of a 3-slot table.
        for key in [1, 4, 10] {
            assert_eq!(
                buckets.insert(key, &mut stats).unwrap(),
                Insertion::Inserted { index: 1 }
            );
        }

        assert_eq!(buckets.chain(1).collect::<Vec<_>>(), [10, 4, 1]);
        assert_eq!(buckets.slot_view(1), SlotView::Chain(vec![10, 4, 1]));
        assert_eq!(buckets.slot_view(0), SlotView::Empty);
        assert_eq!(stats.collisions, 2);
        assert_eq!(stats.inserted, 3);
        assert_eq!(stats.probes, 0);
    }

    #[test]
    fn remove_unlinks_one_duplicate() {
        let mut stats = stats_for(3);
        let mut buckets = ChainedBuckets::with_size(3).unwrap();
        buckets.insert(4, &mut stats).unwrap();
        buckets.insert(1, &mut stats).unwrap();
        buckets.insert(4, &mut stats).unwrap();
        assert_eq!(buckets.chain(1).collect::<Vec<_>>(), [4, 1, 4]);

        assert!(buckets.remove(4, &mut stats));
        assert_eq!(buckets.chain(1).collect::<Vec<_>>(), [1, 4]);
        assert!(buckets.search(4));

        assert!(buckets.remove(4, &mut stats));
        assert!(!buckets.search(4));
        assert!(!buckets.remove(4, &mut stats));
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.collisions, 2);
    }
}
