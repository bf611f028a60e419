use alloc::vec::Vec;

use crate::error::TableError;
use crate::hash_table::Insertion;
use crate::hash_table::Stats;
use crate::hashing::ProbeSequence;
use crate::hashing::Probing;
use crate::snapshot::SlotView;
use crate::snapshot::Tombstone;

/// The state of one open-addressing slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Empty,
    Occupied(i32),
    /// A removed key. Probes continue past it; inserts may reuse it.
    Deleted,
}

/// Open-addressing storage shared by the linear, quadratic and double-hashing
/// strategies, which differ only in `probing`.
#[derive(Clone)]
pub(crate) struct OpenSlots {
    slots: Vec<Slot>,
    probing: Probing,
}

impl OpenSlots {
    pub(crate) fn with_size(table_size: usize, probing: Probing) -> Result<Self, TableError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(table_size)
            .map_err(|_| TableError::AllocationFailed { slots: table_size })?;
        slots.resize(table_size, Slot::Empty);

        Ok(Self { slots, probing })
    }

    #[inline]
    fn probe(&self, key: i32) -> ProbeSequence {
        ProbeSequence::with_probing(self.probing, key, self.slots.len())
    }

    /// Places `key` at the first empty slot of its probe sequence, or at the
    /// first tombstone passed on the way there.
    ///
    /// A matching occupied slot ends the probe as a duplicate. If the whole
    /// sequence is exhausted without reaching an empty slot the table is full,
    /// and nothing changes except the probe count, even when tombstones were
    /// passed.
    pub(crate) fn insert(&mut self, key: i32, stats: &mut Stats) -> Result<Insertion, TableError> {
        let mut first_deleted = None;
        let mut attempts = 0;

        for index in self.probe(key) {
            attempts += 1;
            stats.probes += 1;

            match self.slots[index] {
                Slot::Empty => {
                    let target = first_deleted.unwrap_or(index);
                    return Ok(self.occupy(target, key, attempts, stats));
                }
                Slot::Deleted => {
                    first_deleted.get_or_insert(index);
                }
                Slot::Occupied(existing) if existing == key => {
                    return Ok(Insertion::Duplicate { index });
                }
                Slot::Occupied(_) => {}
            }
        }

        Err(TableError::TableFull {
            key,
            capacity: self.slots.len(),
        })
    }

    fn occupy(&mut self, index: usize, key: i32, attempts: usize, stats: &mut Stats) -> Insertion {
        self.slots[index] = Slot::Occupied(key);
        stats.inserted += 1;
        if attempts > 1 {
            stats.collisions += 1;
        }
        Insertion::Inserted { index }
    }

    /// Walks the probe sequence until `key` or an empty slot is found,
    /// calling `on_probe` for every slot inspected.
    fn find(&self, key: i32, mut on_probe: impl FnMut()) -> Option<usize> {
        for index in self.probe(key) {
            on_probe();
            match self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied(existing) if existing == key => return Some(index),
                Slot::Occupied(_) | Slot::Deleted => {}
            }
        }
        None
    }

    pub(crate) fn search(&self, key: i32, stats: &mut Stats) -> bool {
        self.find(key, || stats.probes += 1).is_some()
    }

    /// Replaces `key`'s slot with a tombstone so probe chains running through
    /// it stay intact. Removal does not count probes.
    pub(crate) fn remove(&mut self, key: i32, stats: &mut Stats) -> bool {
        match self.find(key, || {}) {
            Some(index) => {
                self.slots[index] = Slot::Deleted;
                stats.inserted -= 1;
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn slot(&self, index: usize) -> Slot {
        self.slots[index]
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.slots.iter().filter_map(|slot| match *slot {
            Slot::Occupied(key) => Some(key),
            Slot::Empty | Slot::Deleted => None,
        })
    }

    pub(crate) fn slot_view(&self, index: usize) -> SlotView {
        match self.slots[index] {
            Slot::Empty => SlotView::Empty,
            Slot::Occupied(key) => SlotView::Key(key),
            Slot::Deleted => SlotView::Tombstone(Tombstone),
        }
    }

    /// The probe attempt (0-based) at which the occupied slot `index` is
    /// reached by its own key's probe sequence.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn probe_depth(&self, index: usize) -> Option<usize> {
        match self.slots[index] {
            Slot::Occupied(key) => self.probe(key).position(|i| i == index),
            Slot::Empty | Slot::Deleted => None,
        }
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn linear(size: usize) -> (OpenSlots, Stats) {
        let stats = Stats {
            table_size: size,
            ..Stats::default()
        };
        (OpenSlots::with_size(size, Probing::Linear).unwrap(), stats)
    }

    #[test]
    fn collision_moves_to_next_slot() {
        let (mut slots, mut stats) = linear(5);
        // 10 and 15 both hash to slot 4 of a 5-slot table.
        assert_eq!(
            slots.insert(10, &mut stats).unwrap(),
            Insertion::Inserted { index: 4 }
        );
        assert_eq!(
            slots.insert(15, &mut stats).unwrap(),
            Insertion::Inserted { index: 0 }
        );
        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.probes, 3);
        assert_eq!(stats.inserted, 2);
    }

    #[test]
    fn tombstone_is_reused_after_empty_slot_is_found() {
        let (mut slots, mut stats) = linear(5);
        slots.insert(10, &mut stats).unwrap(); // slot 4
        slots.insert(15, &mut stats).unwrap(); // slot 0
        slots.insert(4, &mut stats).unwrap(); // home 0, lands in 1
        assert!(slots.remove(10, &mut stats));
        assert_eq!(slots.slot(4), Slot::Deleted);

        // 24 also hashes to 4: it passes the tombstone, 15 and 4, stops at
        // the empty slot 2 and goes back to the tombstone.
        assert_eq!(
            slots.insert(24, &mut stats).unwrap(),
            Insertion::Inserted { index: 4 }
        );
        assert_eq!(slots.slot(2), Slot::Empty);
    }

    #[test]
    fn exhausted_sequence_fails_even_past_a_tombstone() {
        let (mut slots, mut stats) = linear(3);
        for key in [1, 2, 3] {
            slots.insert(key, &mut stats).unwrap();
        }
        assert!(slots.remove(2, &mut stats));
        let before = slots.slots().to_vec();
        let inserted = stats.inserted;
        let collisions = stats.collisions;
        let probes = stats.probes;

        let err = slots.insert(100, &mut stats).unwrap_err();
        assert!(err.is_table_full());
        assert_eq!(slots.slots(), &before[..]);
        assert_eq!(stats.inserted, inserted);
        assert_eq!(stats.collisions, collisions);
        assert_eq!(stats.probes, probes + 3);
        assert!(!slots.search(100, &mut stats));
    }

    #[test]
    fn remove_does_not_count_probes() {
        let (mut slots, mut stats) = linear(5);
        slots.insert(10, &mut stats).unwrap();
        slots.insert(15, &mut stats).unwrap();
        let probes = stats.probes;

        assert!(slots.remove(15, &mut stats));
        assert!(!slots.remove(24, &mut stats));
        assert_eq!(stats.probes, probes);
    }

    #[test]
    fn full_table_rejects_without_changes() {
        let (mut slots, mut stats) = linear(3);
        for key in [1, 2, 3] {
            slots.insert(key, &mut stats).unwrap();
        }
        let before = slots.slots().to_vec();

        let err = slots.insert(4, &mut stats).unwrap_err();
        assert!(err.is_table_full());
        assert_eq!(slots.slots(), &before[..]);
        assert_eq!(stats.inserted, 3);
    }

    #[test]
    fn search_skips_tombstones_and_stops_at_empty() {
        let (mut slots, mut stats) = linear(5);
        slots.insert(10, &mut stats).unwrap();
        slots.insert(15, &mut stats).unwrap();
        assert!(slots.remove(10, &mut stats));

        let probes = stats.probes;
        assert!(slots.search(15, &mut stats));
        assert_eq!(stats.probes, probes + 2);

        // 24 hashes to 4: tombstone, 15, then the empty slot 1.
        let probes = stats.probes;
        assert!(!slots.search(24, &mut stats));
        assert_eq!(stats.probes, probes + 3);
    }

    #[test]
    fn views_describe_each_slot() {
        let (mut slots, mut stats) = linear(5);
        slots.insert(10, &mut stats).unwrap();
        slots.insert(15, &mut stats).unwrap();
        slots.remove(10, &mut stats);

        let views = (0..5).map(|i| slots.slot_view(i)).collect::<Vec<_>>();
        assert_eq!(
            views,
            vec![
                SlotView::Key(15),
                SlotView::Empty,
                SlotView::Empty,
                SlotView::Empty,
                SlotView::Tombstone(Tombstone),
            ]
        );
        assert_eq!(slots.keys().collect::<Vec<_>>(), [15]);
        assert_eq!(slots.probe_depth(0), Some(1));
        assert_eq!(slots.probe_depth(4), None);
    }
}
