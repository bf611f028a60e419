#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod chaining;
mod open_addressing;

/// Construction parameters that can be loaded from configuration files.
pub mod config;

/// Error type shared by all table operations.
pub mod error;

/// The table engine: construction, insert/search/remove, counters and
/// diagnostics.
pub mod hash_table;

pub mod hashing;

pub mod snapshot;

/// Collision-resolution strategies and their string names.
pub mod strategy;

pub use config::TableConfig;
pub use error::TableError;
#[cfg(feature = "stats")]
pub use hash_table::DebugStats;
pub use hash_table::HashTable;
pub use hash_table::Insertion;
pub use hash_table::MIN_TABLE_SIZE;
pub use hash_table::Stats;
pub use snapshot::Snapshot;
pub use strategy::Strategy;
pub use strategy::parse_strategy;
