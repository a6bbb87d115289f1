//! Error types for the balancer.

use thiserror::Error;

/// Result type alias for the balancer.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or rebuilding a balancer.
///
/// Duplicate or unknown cells passed to `add_cells`/`remove_cells` are not
/// errors; they are skipped and left out of the returned count. An empty
/// registry at lookup time is reported as `None`, not as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Rejected construction parameters (empty cell set, oversized table,
    /// non-prime table size, ...). No partial state is created.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A full sweep over every cell claimed no slot although the table was
    /// still incomplete. Only possible when the permutations do not cover
    /// every slot, i.e. with a composite table size.
    #[error("Permutation exhausted: {filled} of {table_size} slots filled")]
    PermutationExhausted { filled: usize, table_size: usize },
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }
}
