//! Error types for validation and greedy selection.

use thiserror::Error;

/// Result alias used across the core crate.
pub type SelectionResultOf<T> = Result<T, SelectionError>;

/// Errors raised before or during a greedy search.
///
/// All of them are deterministic functions of the input: retrying with the
/// same matrix and the same requested size fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Matrix is not square.
    #[error("matrix must be square, got {rows} rows x {cols} columns")]
    Shape { rows: usize, cols: usize },

    /// Rows of different length, the input is not a 2-D table.
    #[error("row {row} has {found} entries, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Flat buffer does not match the declared dimensions.
    #[error("buffer holds {found} values, dimensions require {expected}")]
    BufferLength { expected: usize, found: usize },

    /// Fewer than two selectable items, or a requested size below two.
    #[error(
        "a dissimilar set needs at least 2 items: requested {requested}, {available} non-missing items available"
    )]
    InsufficientPopulation { requested: usize, available: usize },

    /// No finite row maximum after the first seed index.
    #[error("no seed partner found after row {first}: every later row maximum is missing")]
    SeedPairUnavailable { first: usize },

    /// Every remaining candidate was poisoned by missing or non-positive values.
    #[error("no eligible candidate left after selecting {selected} of {target} items")]
    CandidatesExhausted { selected: usize, target: usize },
}
