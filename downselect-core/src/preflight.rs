// downselect-core/src/preflight.rs
//! Preflight stage: validate the matrix and settle the set size
//!
//! Runs before any numeric work:
//! - Shape check (square, genuinely 2-D) on a defensive copy
//! - Sentinel-diagonal inspection (warn only)
//! - Clamp the requested set size to the number of non-missing items
//!
//! Clamping is an accommodation, not a failure: a request larger than the
//! valid population is reduced silently and callers read the effective size
//! back from [`ValidatedSelection`].

use crate::error::{SelectionError, SelectionResultOf};
use crate::matrix::DissimilarityMatrix;

/// Set size used when the caller does not ask for one.
pub const DEFAULT_N: usize = 3;

/// The greedy search seeds with a pair.
pub const MIN_SET_SIZE: usize = 2;

/// Caller input: the matrix and the requested set size, nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub matrix: DissimilarityMatrix,
    pub requested_n: usize,
}

impl SelectionConfig {
    pub fn new(matrix: DissimilarityMatrix, requested_n: usize) -> Self {
        Self {
            matrix,
            requested_n,
        }
    }

    /// Config with [`DEFAULT_N`].
    pub fn with_default_n(matrix: DissimilarityMatrix) -> Self {
        Self::new(matrix, DEFAULT_N)
    }
}

/// Output of the preflight stage, derived from a [`SelectionConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSelection {
    /// Copy of the caller's matrix, safe to read during the search
    pub matrix: DissimilarityMatrix,
    pub requested_n: usize,
    /// Set size the search will produce
    pub effective_n: usize,
    /// N, rows of the matrix
    pub population: usize,
    /// M, rows that are not entirely missing
    pub valid_population: usize,
    /// Diagonal positions that do not hold the sentinel
    pub non_sentinel_diagonal: Vec<usize>,
}

impl ValidatedSelection {
    pub fn was_clamped(&self) -> bool {
        self.effective_n < self.requested_n
    }

    pub fn summary(&self) -> String {
        format!(
            "Preflight: N={}, valid={}, n={} (requested {}), clamped={}",
            self.population,
            self.valid_population,
            self.effective_n,
            self.requested_n,
            self.was_clamped()
        )
    }
}

/// Check the matrix is square and hand back an independent copy.
pub fn validate(matrix: &DissimilarityMatrix) -> SelectionResultOf<DissimilarityMatrix> {
    let (rows, cols) = matrix.dim();
    if !matrix.is_square() {
        return Err(SelectionError::Shape { rows, cols });
    }
    Ok(matrix.clone())
}

/// Validate nested rows as they come from a loader.
pub fn validate_rows(rows: Vec<Vec<f64>>) -> SelectionResultOf<DissimilarityMatrix> {
    let matrix = DissimilarityMatrix::from_rows(rows)?;
    validate(&matrix)
}

/// Reduce `requested_n` to the number of non-missing rows.
///
/// Fails when fewer than [`MIN_SET_SIZE`] items would be selected.
pub fn clamp(requested_n: usize, matrix: &DissimilarityMatrix) -> SelectionResultOf<usize> {
    let available = matrix.valid_population();
    let effective = requested_n.min(available);

    if available < MIN_SET_SIZE || effective < MIN_SET_SIZE {
        return Err(SelectionError::InsufficientPopulation {
            requested: requested_n,
            available,
        });
    }

    Ok(effective)
}

/// Preflight stage executor
#[derive(Debug, Default, Clone, Copy)]
pub struct PreflightStage;

impl PreflightStage {
    pub fn new() -> Self {
        Self
    }

    /// Validate, inspect and clamp; consumes the config.
    pub fn execute(&self, config: SelectionConfig) -> SelectionResultOf<ValidatedSelection> {
        let SelectionConfig {
            matrix,
            requested_n,
        } = config;
        let (rows, cols) = matrix.dim();

        log::info!("╔═══════════════════════════════════════════════════════╗");
        log::info!("║  PREFLIGHT                                            ║");
        log::info!("╚═══════════════════════════════════════════════════════╝");
        log::info!("🔍 Checking {} x {} matrix, requested n = {}", rows, cols, requested_n);

        log::debug!("Step 1/3: Validating shape...");
        let matrix = validate(&matrix)?;
        log::info!("  ✓ Square matrix, N = {}", rows);

        log::debug!("Step 2/3: Inspecting diagonal...");
        let non_sentinel_diagonal = matrix.non_sentinel_diagonal();
        if non_sentinel_diagonal.is_empty() {
            log::info!("  ✓ Diagonal holds the sentinel everywhere");
        } else {
            log::warn!(
                "  ⚠️  {} diagonal entries are not NaN; self-relations will be masked during the search",
                non_sentinel_diagonal.len()
            );
            if non_sentinel_diagonal.len() <= 20 {
                log::debug!("  Non-sentinel diagonal indices: {:?}", non_sentinel_diagonal);
            }
        }

        log::debug!("Step 3/3: Clamping set size...");
        let valid_population = matrix.valid_population();
        if valid_population < rows {
            log::info!(
                "  ℹ️  {} of {} rows are entirely missing",
                rows - valid_population,
                rows
            );
        }
        let effective_n = clamp(requested_n, &matrix)?;
        if effective_n < requested_n {
            log::info!(
                "  ℹ️  Requested n = {} exceeds {} valid items, reduced to {}",
                requested_n,
                valid_population,
                effective_n
            );
        } else {
            log::info!("  ✓ n = {} within {} valid items", effective_n, valid_population);
        }

        let output = ValidatedSelection {
            matrix,
            requested_n,
            effective_n,
            population: rows,
            valid_population,
            non_sentinel_diagonal,
        };
        log::info!("{}", output.summary());

        Ok(output)
    }
}
