//! # downselect-core
//!
//! Greedy similarity down-selection over a square dissimilarity matrix.
//!
//! Given an N×N matrix whose diagonal holds the NaN sentinel, find a set of n
//! items that are heuristically maximally dissimilar to each other. Choosing
//! n of N exactly is exponential, so the set is grown greedily from the most
//! dissimilar pair, each step adding the item whose product of dissimilarities
//! to the selected items is largest (kept as a sum of logarithms).
//!
//! ```
//! use downselect_core::{DissimilarityMatrix, PreflightStage, GreedySearch, SelectionConfig, SENTINEL};
//!
//! let s = SENTINEL;
//! let matrix = DissimilarityMatrix::from_rows(vec![
//!     vec![s, 1.0, 1.0, 1.0, 5.0],
//!     vec![1.0, s, 1.0, 1.0, 1.0],
//!     vec![1.0, 1.0, s, 1.0, 1.0],
//!     vec![1.0, 1.0, 1.0, s, 1.0],
//!     vec![5.0, 1.0, 1.0, 1.0, s],
//! ])
//! .unwrap();
//!
//! let validated = PreflightStage::new()
//!     .execute(SelectionConfig::new(matrix, 3))
//!     .unwrap();
//! let result = GreedySearch::new().execute(&validated).unwrap();
//! assert_eq!(result.indices, vec![0, 4, 1]);
//! ```
//!
//! ## Modules
//!
//! - [`matrix`] - NaN-aware dense matrix
//! - [`preflight`] - validation and set-size clamping
//! - [`logdomain`] - parallel NaN-aware reductions and log accumulation
//! - [`greedy`] - the search and its ranked output

pub mod error;
pub mod greedy;
pub mod logdomain;
pub mod matrix;
pub mod preflight;

pub use error::{SelectionError, SelectionResultOf};
pub use greedy::{GreedySearch, RankedIndex, RankedSelection, SelectionResult, search, seed_pair};
pub use matrix::{DissimilarityMatrix, SENTINEL, is_sentinel};
pub use preflight::{
    DEFAULT_N, MIN_SET_SIZE, PreflightStage, SelectionConfig, ValidatedSelection, clamp, validate,
    validate_rows,
};

#[cfg(test)]
mod tests;

#[cfg(test)]
pub(crate) fn init() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("debug");
        let _ = env_logger::Builder::from_env(env).is_test(true).try_init();
    });
}
