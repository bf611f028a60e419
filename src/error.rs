use thiserror::Error;

/// Errors reported by [`HashTable`](crate::HashTable) operations.
///
/// A key that is absent on search or remove is not an error; those operations
/// return `false` instead.
#[derive(Error, Debug)]
pub enum TableError {
    /// Memory for the table representation or a chain node could not be
    /// reserved. The table is left exactly as it was before the call.
    #[error("allocation failed while reserving {slots} slots")]
    AllocationFailed {
        /// Number of elements the failed reservation asked for.
        slots: usize,
    },

    /// Every slot of the key's probe sequence was occupied by another key.
    #[error("no free slot for key {key} after {capacity} probes")]
    TableFull {
        /// The key that could not be placed.
        key: i32,
        /// The table size, which is also the probe limit.
        capacity: usize,
    },

    /// The snapshot could not be encoded, decoded, or written to its sink.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The snapshot sink rejected a write outside of JSON encoding.
    #[error("snapshot sink error: {0}")]
    Io(#[from] std::io::Error),
}

impl TableError {
    /// Returns `true` if retrying with a larger table could succeed.
    pub fn is_table_full(&self) -> bool {
        matches!(self, TableError::TableFull { .. })
    }
}
