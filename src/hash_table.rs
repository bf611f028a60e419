use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt::Debug;
use std::io;

use serde::Deserialize;
use serde::Serialize;

use crate::chaining::ChainedBuckets;
use crate::error::TableError;
use crate::hashing::Probing;
use crate::open_addressing::OpenSlots;
#[cfg(any(test, feature = "stats"))]
use crate::open_addressing::Slot;
use crate::snapshot::SlotView;
use crate::snapshot::Snapshot;
use crate::strategy::Strategy;

/// Smallest table size a [`HashTable`] is built with; smaller requests are
/// raised to this.
pub const MIN_TABLE_SIZE: usize = 3;

/// Running counters of a [`HashTable`].
///
/// `collisions` and `probes` are cumulative since the table was created and
/// never decrease, not even on removal. `inserted` is the current number of
/// live entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Number of slots (or buckets), fixed at construction.
    pub table_size: usize,
    /// Live entries. Under chaining, duplicate keys count once per insert.
    pub inserted: usize,
    /// Inserts that did not land in their first-choice slot, or that joined a
    /// non-empty chain.
    pub collisions: usize,
    /// Open-addressing slot inspections made by insert and search. Removal
    /// does not add to it.
    pub probes: usize,
}

/// Where a successful [`HashTable::insert`] left the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The key was stored as a new entry at slot (or bucket) `index`.
    Inserted {
        /// Slot or bucket index.
        index: usize,
    },
    /// Open addressing only: the key was already present at `index`, and
    /// nothing changed.
    Duplicate {
        /// Slot index of the existing entry.
        index: usize,
    },
}

impl Insertion {
    /// The slot or bucket holding the key.
    pub fn index(self) -> usize {
        match self {
            Insertion::Inserted { index } | Insertion::Duplicate { index } => index,
        }
    }

    /// Returns `true` if a new entry was created.
    pub fn is_new(self) -> bool {
        matches!(self, Insertion::Inserted { .. })
    }
}

#[derive(Clone)]
enum Storage {
    Chained(ChainedBuckets),
    Open(OpenSlots),
}

/// A fixed-size hash table of `i32` keys with a selectable collision-resolution
/// strategy.
///
/// The table size and [`Strategy`] are chosen at construction and never
/// change; there is no resizing. Every operation updates the table's
/// [`Stats`], and the full slot layout can be captured at any time with
/// [`snapshot`](Self::snapshot).
///
/// Duplicate handling differs by strategy: the probing strategies store a key
/// at most once and treat a repeated insert as a no-op, while chaining keeps
/// every inserted copy as its own chain entry.
///
/// ## Example
///
/// ```rust
/// use probe_hash::HashTable;
/// use probe_hash::Strategy;
///
/// let mut table = HashTable::new(5, Strategy::LinearProbing).unwrap();
/// table.insert(10).unwrap();
/// table.insert(15).unwrap();
///
/// assert!(table.search(15));
/// assert!(table.remove(10));
/// assert!(!table.search(10));
///
/// let stats = table.stats();
/// assert_eq!(stats.inserted, 1);
/// assert_eq!(stats.collisions, 1);
/// ```
#[derive(Clone)]
pub struct HashTable {
    storage: Storage,
    strategy: Strategy,
    stats: Stats,
}

impl Debug for HashTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let slots = (0..self.stats.table_size)
            .map(|index| match self.slot_view(index) {
                SlotView::Empty => "..".to_string(),
                SlotView::Tombstone(_) => "xx".to_string(),
                SlotView::Key(key) => format!("{key}"),
                SlotView::Chain(keys) => format!("{keys:?}"),
            })
            .collect::<Vec<String>>();

        f.debug_struct("HashTable")
            .field("strategy", &self.strategy)
            .field("slots", &slots.join(", "))
            .field("stats", &self.stats)
            .finish()
    }
}

impl HashTable {
    /// Creates an empty table with `table_size` slots using `strategy`.
    ///
    /// Sizes below [`MIN_TABLE_SIZE`] are raised to it. Fails with
    /// [`TableError::AllocationFailed`] if the slot array cannot be reserved.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    /// use probe_hash::Strategy;
    ///
    /// let table = HashTable::new(0, Strategy::QuadraticProbing).unwrap();
    /// assert_eq!(table.table_size(), 3);
    /// assert!(table.is_empty());
    /// ```
    pub fn new(table_size: usize, strategy: Strategy) -> Result<Self, TableError> {
        let table_size = table_size.max(MIN_TABLE_SIZE);

        let storage = match Probing::for_strategy(strategy) {
            None => Storage::Chained(ChainedBuckets::with_size(table_size)?),
            Some(probing) => Storage::Open(OpenSlots::with_size(table_size, probing)?),
        };
        log::debug!("created {strategy} table with {table_size} slots");

        Ok(Self {
            storage,
            strategy,
            stats: Stats {
                table_size,
                ..Stats::default()
            },
        })
    }

    /// The collision-resolution strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Number of slots (or buckets).
    pub fn table_size(&self) -> usize {
        self.stats.table_size
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.stats.inserted
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.stats.inserted == 0
    }

    /// Live entries divided by table size. Can exceed 1.0 under chaining.
    pub fn load_factor(&self) -> f64 {
        self.stats.inserted as f64 / self.stats.table_size as f64
    }

    /// Inserts `key`.
    ///
    /// Under chaining the key is always added to its bucket's chain, even if
    /// it is already present. Under open addressing an existing key yields
    /// [`Insertion::Duplicate`] without changing anything, and
    /// [`TableError::TableFull`] is returned once the probe sequence is
    /// exhausted without reaching an empty slot, even if tombstones were
    /// passed on the way. A failed insert
    /// leaves the stored keys untouched; only the probe counter advances.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    /// use probe_hash::Insertion;
    /// use probe_hash::Strategy;
    ///
    /// let mut table = HashTable::new(5, Strategy::LinearProbing).unwrap();
    /// assert_eq!(table.insert(10).unwrap(), Insertion::Inserted { index: 4 });
    /// assert_eq!(table.insert(10).unwrap(), Insertion::Duplicate { index: 4 });
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, key: i32) -> Result<Insertion, TableError> {
        let result = match &mut self.storage {
            Storage::Chained(buckets) => buckets.insert(key, &mut self.stats),
            Storage::Open(slots) => slots.insert(key, &mut self.stats),
        };

        match &result {
            Ok(insertion) => log::trace!("insert {key}: {insertion:?}"),
            Err(err) => log::debug!("insert {key} into {} table failed: {err}", self.strategy),
        }
        result
    }

    /// Returns `true` if `key` is stored.
    ///
    /// Takes `&mut self` because open-addressing lookups add to the probe
    /// counter. Tombstones are stepped over; an empty slot ends the search.
    pub fn search(&mut self, key: i32) -> bool {
        match &self.storage {
            Storage::Chained(buckets) => buckets.search(key),
            Storage::Open(slots) => slots.search(key, &mut self.stats),
        }
    }

    /// Removes one entry equal to `key`, returning whether one was found.
    ///
    /// Chaining unlinks the newest matching chain entry. Open addressing marks
    /// the slot as a tombstone rather than emptying it, so other keys whose
    /// probe sequences pass through it remain reachable.
    pub fn remove(&mut self, key: i32) -> bool {
        let removed = match &mut self.storage {
            Storage::Chained(buckets) => buckets.remove(key, &mut self.stats),
            Storage::Open(slots) => slots.remove(key, &mut self.stats),
        };
        log::trace!("remove {key}: {removed}");
        removed
    }

    /// A copy of the current counters.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Iterates over the stored keys in slot order. Chains are read newest
    /// first, and chained duplicates appear once per copy.
    pub fn keys(&self) -> Box<dyn Iterator<Item = i32> + '_> {
        match &self.storage {
            Storage::Chained(buckets) => Box::new(buckets.keys()),
            Storage::Open(slots) => Box::new(slots.keys()),
        }
    }

    fn slot_view(&self, index: usize) -> SlotView {
        match &self.storage {
            Storage::Chained(buckets) => buckets.slot_view(index),
            Storage::Open(slots) => slots.slot_view(index),
        }
    }

    /// Captures the counters and every slot's content.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            strategy: self.strategy,
            table_size: self.stats.table_size,
            inserted: self.stats.inserted,
            collisions: self.stats.collisions,
            probes: self.stats.probes,
            buckets: (0..self.stats.table_size)
                .map(|index| self.slot_view(index))
                .collect(),
        }
    }

    /// Writes a JSON [`Snapshot`] of the table to `sink`.
    ///
    /// The table is not modified, whether or not the write succeeds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    /// use probe_hash::Strategy;
    /// use probe_hash::snapshot::Snapshot;
    ///
    /// let mut table = HashTable::new(3, Strategy::Chaining).unwrap();
    /// table.insert(1).unwrap();
    ///
    /// let mut out = Vec::new();
    /// table.write_snapshot(&mut out).unwrap();
    ///
    /// let parsed = Snapshot::from_reader(&out[..]).unwrap();
    /// assert_eq!(parsed, table.snapshot());
    /// ```
    pub fn write_snapshot<W: io::Write>(&self, sink: W) -> Result<(), TableError> {
        self.snapshot().write_json(sink)
    }

    /// Counts live keys by the probe attempt at which they sit.
    ///
    /// Available with the `stats` feature.
    ///
    /// Entry `d` of the result is the number of keys found on attempt `d` of
    /// their probe sequence, or at depth `d` of their chain counting from the
    /// newest entry. The vector is as long as the deepest key plus one and is
    /// empty for an empty table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        let mut record = |depth: usize| {
            if hist.len() <= depth {
                hist.resize(depth + 1, 0);
            }
            hist[depth] += 1;
        };

        match &self.storage {
            Storage::Chained(buckets) => {
                for len in buckets.chain_lengths() {
                    (0..len).for_each(&mut record);
                }
            }
            Storage::Open(slots) => {
                for index in 0..self.stats.table_size {
                    if let Some(depth) = slots.probe_depth(index) {
                        record(depth);
                    }
                }
            }
        }

        hist
    }

    /// Returns slot utilization and clustering figures for the table.
    ///
    /// Available with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let table_size = self.stats.table_size;
        let (occupied_slots, tombstones, longest_run) = match &self.storage {
            Storage::Chained(buckets) => {
                let occupied = buckets.chain_lengths().filter(|&len| len > 0).count();
                let longest = buckets.chain_lengths().max().unwrap_or(0);
                (occupied, 0, longest)
            }
            Storage::Open(slots) => {
                let slots = slots.slots();
                let occupied = slots
                    .iter()
                    .filter(|slot| matches!(slot, Slot::Occupied(_)))
                    .count();
                let tombstones = slots.iter().filter(|slot| **slot == Slot::Deleted).count();
                (occupied, tombstones, longest_cluster(slots))
            }
        };

        DebugStats {
            populated: self.stats.inserted,
            table_size,
            occupied_slots,
            tombstones,
            empty_slots: table_size - occupied_slots - tombstones,
            longest_run,
            load_factor: self.load_factor(),
        }
    }

    /// Pretty-prints the probe histogram horizontally using stdout.
    ///
    /// Available with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.stats.inserted);

        let make_bar = |count: usize| -> String {
            if count == 0 {
                return String::new();
            }
            let units = (count * total_units).div_ceil(max);
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            bar.extend(partial);
            bar
        };

        for (depth, &count) in hist.iter().enumerate() {
            println!("{:>3} | {} ({})", depth, make_bar(count), count);
        }
    }
}

/// Longest circular run of non-empty slots (occupied or tombstone).
#[cfg(any(test, feature = "stats"))]
fn longest_cluster(slots: &[Slot]) -> usize {
    if slots.iter().all(|slot| *slot != Slot::Empty) {
        return slots.len();
    }

    // Start just after an empty slot so runs that wrap around are counted once.
    let start = slots.iter().position(|slot| *slot == Slot::Empty).unwrap_or(0);
    let mut longest = 0;
    let mut run = 0;
    for offset in 1..=slots.len() {
        if slots[(start + offset) % slots.len()] == Slot::Empty {
            run = 0;
        } else {
            run += 1;
            longest = longest.max(run);
        }
    }
    longest
}

/// Slot utilization figures for a [`HashTable`].
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Live entries.
    pub populated: usize,
    /// Number of slots (or buckets).
    pub table_size: usize,
    /// Slots holding a key, or buckets with a non-empty chain.
    pub occupied_slots: usize,
    /// Tombstoned slots; always 0 under chaining.
    pub tombstones: usize,
    /// Slots that are neither occupied nor tombstoned.
    pub empty_slots: usize,
    /// Longest chain under chaining; longest run of consecutive non-empty
    /// slots under open addressing.
    pub longest_run: usize,
    /// Live entries divided by table size.
    pub load_factor: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.table_size,
            self.load_factor * 100.0
        );
        println!(
            "Slot Usage: {} occupied, {} tombstones, {} empty",
            self.occupied_slots, self.tombstones, self.empty_slots
        );
        println!("Longest run: {}", self.longest_run);
    }
}
