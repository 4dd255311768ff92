//! Benchmark: total log-dissimilarity of a selected set.
//!
//! The score of a set is the sum of `ln D[i, j]` over its pairs. The full
//! selected submatrix is summed and halved, which equals the upper-triangle
//! sum for a symmetric matrix. Sentinel, zero and negative entries have no
//! finite logarithm and are left out of the sum.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use downselect_core::{DissimilarityMatrix, RankedSelection, logdomain::finite_ln_sum};

use crate::storage::StorageResult;

pub fn total_dissimilarity(matrix: &DissimilarityMatrix, ranked: &RankedSelection) -> f64 {
    let sub = matrix.submatrix(&ranked.indices());
    finite_ln_sum(sub.as_slice()) / 2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// N, rows of the full matrix
    pub population: usize,
    /// Size of the selected set
    pub n: usize,
    pub total_dissimilarity: f64,
    pub elapsed: Duration,
}

impl BenchmarkReport {
    pub fn new(
        matrix: &DissimilarityMatrix,
        ranked: &RankedSelection,
        elapsed: Duration,
    ) -> Self {
        Self {
            population: matrix.nrows(),
            n: ranked.len(),
            total_dissimilarity: total_dissimilarity(matrix, ranked),
            elapsed,
        }
    }

    /// Same report with a different wall-clock measure.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }

    pub fn file_name(&self) -> String {
        format!("SDS-N{}-n{}.txt", self.population, self.n)
    }

    pub fn render(&self) -> String {
        format!(
            "Total dissimilarity: {}\nElapsed time: {:.6} minutes\n",
            self.total_dissimilarity,
            self.elapsed_minutes()
        )
    }

    /// Write `SDS-N{N}-n{n}.txt` under `dir`, creating it if needed.
    pub fn write_report(&self, dir: impl AsRef<Path>) -> StorageResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join(self.file_name());
        fs::write(&path, self.render())?;
        info!("  ✓ Benchmark report written to {}", path.display());

        Ok(path)
    }
}
