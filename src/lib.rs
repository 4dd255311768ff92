//! # downselect
//!
//! Pick the `n` most mutually dissimilar items out of `N`, given their
//! pairwise dissimilarity matrix. The greedy search lives in
//! [`downselect_core`]; this crate adds the stateful [`DownSelector`]
//! pipeline, matrix loaders and writers, benchmark reports and the CLI.
//!
//! ```no_run
//! use downselect::{DownSelectBuilder, storage};
//!
//! let matrix = storage::load_matrix("rmsd.csv").unwrap();
//! let mut selector = DownSelectBuilder::new().with_n(10).build(matrix);
//!
//! let ranked = selector.run().unwrap();
//! selector.save("SDS").unwrap();
//! println!("{:?}", ranked.indices());
//! ```

pub mod benchmark;
pub mod builder;
pub mod cli;
pub mod core;
pub mod dataset;
pub mod error;
pub mod storage;

pub use benchmark::{BenchmarkReport, total_dissimilarity};
pub use builder::{ConfigValue, DEFAULT_OUTPUT_DIR, DownSelectBuilder};
pub use crate::core::{DownSelector, SelectorState, StateMetadata, select};
pub use dataset::make_toy_dataset;
pub use error::{DownSelectError, DownSelectResult};
pub use storage::{MatrixFormat, StorageError};

pub use downselect_core::{
    DEFAULT_N, DissimilarityMatrix, RankedIndex, RankedSelection, SENTINEL, SelectionError,
    SelectionResult,
};

#[cfg(test)]
mod tests;
