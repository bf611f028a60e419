//! Point-in-time JSON views of a table, for external viewers.
//!
//! A snapshot document looks like this:
//!
//! ```json
//! {
//!   "strategy": "LINEAR_PROBING",
//!   "table_size": 5,
//!   "inserted": 2,
//!   "collisions": 1,
//!   "probes": 4,
//!   "buckets": [
//!     15,
//!     null,
//!     null,
//!     null,
//!     { "deleted": true }
//!   ]
//! }
//! ```
//!
//! Each entry of `buckets` describes one slot: `null` when empty, the stored
//! key for an occupied open-addressing slot, `{"deleted": true}` for a
//! tombstone, and for chaining an array holding the bucket's chain with the
//! most recently inserted key first.
//!
//! Parsing is strict: the bucket count must equal `table_size`, every bucket
//! must have a shape the strategy can produce, and `inserted` must match the
//! number of stored keys.

use std::io;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::error::TableError;
use crate::hash_table::Stats;
use crate::strategy::Strategy;

/// A deserializable copy of a table's counters and slot contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct Snapshot {
    /// The table's collision-resolution strategy.
    pub strategy: Strategy,
    /// Number of slots (or buckets).
    pub table_size: usize,
    /// Live entries at the time of the snapshot.
    pub inserted: usize,
    /// Cumulative collisions since the table was created.
    pub collisions: usize,
    /// Cumulative probes since the table was created.
    pub probes: usize,
    /// One view per slot, in index order.
    pub buckets: Vec<SlotView>,
}

/// Why a parsed document is not a snapshot any table could have written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSnapshot {
    /// `buckets` does not hold exactly one entry per slot.
    #[error("table_size is {table_size} but {buckets} buckets were listed")]
    BucketCount {
        /// The declared table size.
        table_size: usize,
        /// The number of entries in `buckets`.
        buckets: usize,
    },

    /// A bucket has a shape the strategy never produces, such as a chain
    /// under open addressing or a tombstone under chaining.
    #[error("bucket {index} cannot appear in a {strategy} table")]
    BucketShape {
        /// The offending bucket's index.
        index: usize,
        /// The declared strategy.
        strategy: Strategy,
    },

    /// `inserted` disagrees with the keys listed in `buckets`.
    #[error("inserted is {inserted} but {keys} keys were listed")]
    InsertedCount {
        /// The declared live entry count.
        inserted: usize,
        /// The number of keys found in `buckets`.
        keys: usize,
    },
}

#[derive(Deserialize)]
struct RawSnapshot {
    strategy: Strategy,
    table_size: usize,
    inserted: usize,
    collisions: usize,
    probes: usize,
    buckets: Vec<SlotView>,
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = InvalidSnapshot;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        if raw.buckets.len() != raw.table_size {
            return Err(InvalidSnapshot::BucketCount {
                table_size: raw.table_size,
                buckets: raw.buckets.len(),
            });
        }

        let chained = !raw.strategy.is_open_addressing();
        for (index, slot) in raw.buckets.iter().enumerate() {
            let allowed = match slot {
                SlotView::Empty => true,
                SlotView::Chain(keys) => chained && !keys.is_empty(),
                SlotView::Key(_) | SlotView::Tombstone(_) => !chained,
            };
            if !allowed {
                return Err(InvalidSnapshot::BucketShape {
                    index,
                    strategy: raw.strategy,
                });
            }
        }

        let snapshot = Snapshot {
            strategy: raw.strategy,
            table_size: raw.table_size,
            inserted: raw.inserted,
            collisions: raw.collisions,
            probes: raw.probes,
            buckets: raw.buckets,
        };
        let keys = snapshot.keys().count();
        if keys != snapshot.inserted {
            return Err(InvalidSnapshot::InsertedCount {
                inserted: snapshot.inserted,
                keys,
            });
        }
        Ok(snapshot)
    }
}

/// The content of a single slot in a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotView {
    /// Nothing stored. Encoded as `null`.
    Empty,
    /// An open-addressing slot holding a key.
    Key(i32),
    /// A non-empty chaining bucket, newest key first.
    Chain(Vec<i32>),
    /// An open-addressing slot whose key was removed.
    Tombstone(Tombstone),
}

/// The tombstone marker, encoded as `{"deleted": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TombstoneRepr", into = "TombstoneRepr")]
pub struct Tombstone;

#[derive(Serialize, Deserialize)]
struct TombstoneRepr {
    deleted: bool,
}

impl TryFrom<TombstoneRepr> for Tombstone {
    type Error = &'static str;

    fn try_from(repr: TombstoneRepr) -> Result<Self, Self::Error> {
        if repr.deleted {
            Ok(Tombstone)
        } else {
            Err("tombstone marker must have \"deleted\": true")
        }
    }
}

impl From<Tombstone> for TombstoneRepr {
    fn from(_: Tombstone) -> Self {
        TombstoneRepr { deleted: true }
    }
}

impl SlotView {
    /// The keys held by this slot, in snapshot order.
    pub fn keys(&self) -> &[i32] {
        match self {
            SlotView::Key(key) => core::slice::from_ref(key),
            SlotView::Chain(keys) => keys,
            SlotView::Empty | SlotView::Tombstone(_) => &[],
        }
    }

    /// Returns `true` for the tombstone marker.
    pub fn is_tombstone(&self) -> bool {
        matches!(self, SlotView::Tombstone(_))
    }
}

impl Snapshot {
    /// The counters recorded in this snapshot.
    pub fn stats(&self) -> Stats {
        Stats {
            table_size: self.table_size,
            inserted: self.inserted,
            collisions: self.collisions,
            probes: self.probes,
        }
    }

    /// Every stored key, slot by slot.
    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.buckets.iter().flat_map(|slot| slot.keys().iter().copied())
    }

    /// Number of tombstone markers.
    pub fn tombstones(&self) -> usize {
        self.buckets.iter().filter(|slot| slot.is_tombstone()).count()
    }

    /// Writes the snapshot as pretty-printed JSON followed by a newline.
    ///
    /// The sink is borrowed for the duration of the call only; flushing and
    /// closing it remain the caller's business.
    pub fn write_json<W: io::Write>(&self, mut sink: W) -> Result<(), TableError> {
        serde_json::to_writer_pretty(&mut sink, self)?;
        sink.write_all(b"\n")?;
        Ok(())
    }

    /// Renders the snapshot as a pretty-printed JSON string.
    pub fn to_json_string(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot document, rejecting documents that no table of the
    /// declared strategy and size could have written.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::Strategy;
    /// use probe_hash::snapshot::Snapshot;
    /// use probe_hash::snapshot::SlotView;
    ///
    /// let snapshot = Snapshot::from_json_str(
    ///     r#"{"strategy": "DOUBLE_HASHING", "table_size": 3, "inserted": 1,
    ///         "collisions": 0, "probes": 1, "buckets": [null, 7, {"deleted": true}]}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(snapshot.strategy, Strategy::DoubleHashing);
    /// assert_eq!(snapshot.buckets[1], SlotView::Key(7));
    /// assert_eq!(snapshot.tombstones(), 1);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a snapshot document from a reader.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, TableError> {
        Ok(serde_json::from_reader(reader)?)
    }
}
