use serde::Deserialize;
use serde::Serialize;

use crate::error::TableError;
use crate::hash_table::HashTable;
use crate::strategy::Strategy;

/// Default table size used by [`TableConfig::default`].
pub const DEFAULT_TABLE_SIZE: usize = 101;

/// Construction parameters for a [`HashTable`].
///
/// Missing fields fall back to the defaults (101 slots, chaining), and the
/// strategy accepts the same spellings as
/// [`parse_strategy`](crate::parse_strategy), unknown names included.
///
/// # Examples
///
/// ```rust
/// use probe_hash::Strategy;
/// use probe_hash::TableConfig;
///
/// let config: TableConfig =
///     serde_json::from_str(r#"{"table_size": 31, "strategy": "quadratic"}"#).unwrap();
/// assert_eq!(config.strategy, Strategy::QuadraticProbing);
///
/// let table = config.build().unwrap();
/// assert_eq!(table.table_size(), 31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Requested number of slots; raised to
    /// [`MIN_TABLE_SIZE`](crate::MIN_TABLE_SIZE) if smaller.
    pub table_size: usize,
    /// Collision-resolution strategy.
    pub strategy: Strategy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            strategy: Strategy::Chaining,
        }
    }
}

impl TableConfig {
    /// Sets the requested table size.
    pub fn with_table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    /// Sets the collision-resolution strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Creates an empty table with these parameters.
    pub fn build(self) -> Result<HashTable, TableError> {
        HashTable::new(self.table_size, self.strategy)
    }
}
