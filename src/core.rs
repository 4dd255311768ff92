//! The stateful selection pipeline.
//!
//! `DownSelector` owns a matrix and a requested set size and walks the
//! stages in order:
//!
//! ```text
//! preflight -> search -> post_process -> [benchmark] -> save
//! ```
//!
//! Each stage stores its output; later stages run the earlier ones when
//! their output is missing. Changing the matrix or the set size drops
//! everything derived from them.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use downselect_core::{
    DissimilarityMatrix, GreedySearch, PreflightStage, RankedSelection, SelectionConfig,
    SelectionResult, ValidatedSelection,
};

use crate::benchmark::BenchmarkReport;
use crate::builder::{ConfigValue, DownSelectBuilder};
use crate::error::{DownSelectError, DownSelectResult};
use crate::storage::delimited::{self, Delimiter};
use crate::storage::json::JsonMatrix;

#[derive(Debug, Clone)]
pub struct DownSelector {
    matrix: DissimilarityMatrix,
    requested_n: usize,
    benchmark_enabled: bool,
    output_dir: PathBuf,

    validated: Option<ValidatedSelection>,
    result: Option<SelectionResult>,
    ranked: Option<RankedSelection>,
    report: Option<BenchmarkReport>,
    search_elapsed: Option<Duration>,
}

impl DownSelector {
    /// Selector with default settings and the given set size.
    pub fn new(matrix: DissimilarityMatrix, requested_n: usize) -> Self {
        DownSelectBuilder::new().with_n(requested_n).build(matrix)
    }

    pub(crate) fn from_builder(builder: DownSelectBuilder, matrix: DissimilarityMatrix) -> Self {
        Self {
            matrix,
            requested_n: builder.n,
            benchmark_enabled: builder.benchmark,
            output_dir: builder.output_dir,
            validated: None,
            result: None,
            ranked: None,
            report: None,
            search_elapsed: None,
        }
    }

    fn reset(&mut self) {
        self.validated = None;
        self.result = None;
        self.ranked = None;
        self.report = None;
        self.search_elapsed = None;
    }

    pub fn set_matrix(&mut self, matrix: DissimilarityMatrix) {
        debug!("Replacing matrix, dropping derived state");
        self.matrix = matrix;
        self.reset();
    }

    pub fn set_n(&mut self, n: usize) {
        debug!("Setting requested n = {}, dropping derived state", n);
        self.requested_n = n;
        self.reset();
    }

    pub fn matrix(&self) -> &DissimilarityMatrix {
        &self.matrix
    }

    pub fn requested_n(&self) -> usize {
        self.requested_n
    }

    /// N, known once the preflight has run.
    pub fn population(&self) -> Option<usize> {
        self.validated.as_ref().map(|v| v.population)
    }

    /// Set size after clamping, known once the preflight has run.
    pub fn effective_n(&self) -> Option<usize> {
        self.validated.as_ref().map(|v| v.effective_n)
    }

    pub fn validated(&self) -> Option<&ValidatedSelection> {
        self.validated.as_ref()
    }

    pub fn result(&self) -> Option<&SelectionResult> {
        self.result.as_ref()
    }

    pub fn ranked(&self) -> Option<&RankedSelection> {
        self.ranked.as_ref()
    }

    pub fn report(&self) -> Option<&BenchmarkReport> {
        self.report.as_ref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn config(&self) -> DownSelectBuilder {
        DownSelectBuilder::new()
            .with_n(self.requested_n)
            .with_benchmark(self.benchmark_enabled)
            .with_output_dir(&self.output_dir)
    }

    // -------------------- Stages --------------------

    fn compute_preflight(&self) -> DownSelectResult<ValidatedSelection> {
        let config = SelectionConfig::new(self.matrix.clone(), self.requested_n);
        Ok(PreflightStage::new().execute(config)?)
    }

    /// Validate the matrix and clamp the set size.
    pub fn preflight(&mut self) -> DownSelectResult<&ValidatedSelection> {
        let validated = self.compute_preflight()?;
        Ok(self.validated.insert(validated))
    }

    fn ensure_validated(&mut self) -> DownSelectResult<&ValidatedSelection> {
        let validated = match self.validated.take() {
            Some(v) => v,
            None => self.compute_preflight()?,
        };
        Ok(self.validated.insert(validated))
    }

    /// Run the greedy search, preflighting first if needed.
    pub fn search(&mut self) -> DownSelectResult<&SelectionResult> {
        let start = Instant::now();
        let result = {
            let validated = self.ensure_validated()?;
            GreedySearch::new().execute(validated)?
        };
        let elapsed = start.elapsed();
        debug!("Search finished in {:?}", elapsed);

        self.ranked = None;
        self.report = None;
        self.search_elapsed = Some(elapsed);
        Ok(self.result.insert(result))
    }

    /// Attach ranks 1..=n to the selection.
    pub fn post_process(&mut self) -> DownSelectResult<&RankedSelection> {
        if self.result.is_none() {
            self.search()?;
        }
        let ranked = self
            .result
            .as_ref()
            .map(SelectionResult::rank)
            .unwrap_or_default();
        Ok(self.ranked.insert(ranked))
    }

    /// Total log-dissimilarity of the ranked selection.
    pub fn benchmark(&mut self) -> DownSelectResult<&BenchmarkReport> {
        if self.ranked.is_none() {
            self.post_process()?;
        }
        let ranked = self.ranked.as_ref().cloned().unwrap_or_default();
        let elapsed = self.search_elapsed.unwrap_or_default();

        let report = BenchmarkReport::new(&self.matrix, &ranked, elapsed);
        info!(
            "  ✓ Total dissimilarity of {} items: {:.6}",
            report.n, report.total_dissimilarity
        );
        Ok(self.report.insert(report))
    }

    /// `SDS_N{N}_{n}_dissimilar.csv`
    pub fn result_file_name(&self) -> Option<String> {
        self.validated
            .as_ref()
            .map(|v| format!("SDS_N{}_{}_dissimilar.csv", v.population, v.effective_n))
    }

    /// Write the ranked selection under `dir`, running missing stages first.
    pub fn save(&mut self, dir: impl AsRef<Path>) -> DownSelectResult<PathBuf> {
        if self.ranked.is_none() {
            self.post_process()?;
        }
        let file_name = self
            .result_file_name()
            .ok_or_else(|| DownSelectError::State("no preflight output to name the result".into()))?;
        let ranked = self
            .ranked
            .as_ref()
            .ok_or_else(|| DownSelectError::State("no ranked selection to save".into()))?;

        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        delimited::save_ranked(ranked, &path, Delimiter::Comma)?;
        info!("  ✓ Ranked selection written to {}", path.display());

        Ok(path)
    }

    /// Preflight, search and rank; benchmark too when enabled.
    pub fn run(&mut self) -> DownSelectResult<RankedSelection> {
        info!("╔═══════════════════════════════════════════════════════╗");
        info!("║  SIMILARITY DOWN-SELECTION                            ║");
        info!("╚═══════════════════════════════════════════════════════╝");

        self.preflight()?;
        self.search()?;
        let ranked = self.post_process()?.clone();
        if self.benchmark_enabled {
            self.benchmark()?;
        }

        Ok(ranked)
    }

    // -------------------- Snapshots --------------------

    pub fn snapshot(&self) -> SelectorState {
        SelectorState {
            metadata: StateMetadata::new(self.config().builder_config_typed())
                .with_dimensions(self.matrix.nrows(), self.matrix.ncols())
                .with_progress(self.population(), self.effective_n()),
            matrix: JsonMatrix::from(&self.matrix),
            result: self.result.clone(),
            ranked: self.ranked.clone(),
            report: self.report.clone(),
        }
    }

    /// Resume from a snapshot. The preflight is re-run when the snapshot
    /// got past it and must agree with the recorded set size.
    pub fn from_snapshot(state: SelectorState) -> DownSelectResult<Self> {
        let SelectorState {
            metadata,
            matrix,
            result,
            ranked,
            report,
        } = state;

        let builder = DownSelectBuilder::from_config(&metadata.builder_config);
        let mut selector = builder.build(matrix.into_matrix()?);

        if let Some(expected) = metadata.effective_n() {
            let found = selector.preflight()?.effective_n;
            if found != expected {
                return Err(DownSelectError::State(format!(
                    "snapshot records n = {} but preflight gives {}",
                    expected, found
                )));
            }
        }

        let recorded = [
            ("result", result.as_ref().map(SelectionResult::len)),
            ("ranked selection", ranked.as_ref().map(RankedSelection::len)),
            ("benchmark report", report.as_ref().map(|r| r.n)),
        ];
        for (stage, len) in recorded {
            let Some(len) = len else { continue };
            if selector.validated.is_none() {
                return Err(DownSelectError::State(format!(
                    "snapshot holds a {} but no preflight record",
                    stage
                )));
            }
            if selector.effective_n() != Some(len) {
                return Err(DownSelectError::State(format!(
                    "snapshot {} has {} items, expected {:?}",
                    stage,
                    len,
                    selector.effective_n()
                )));
            }
        }

        selector.result = result;
        selector.ranked = ranked;
        selector.report = report;
        Ok(selector)
    }
}

/// Select `n` maximally dissimilar items with default settings.
pub fn select(matrix: DissimilarityMatrix, n: usize) -> DownSelectResult<RankedSelection> {
    DownSelector::new(matrix, n).run()
}

// ============================================================================
// Snapshot types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMetadata {
    pub timestamp: String,
    pub n_rows: usize,
    pub n_cols: usize,
    pub builder_config: HashMap<String, ConfigValue>,
    /// `population` and `effective_n` once the preflight has run
    pub progress: HashMap<String, ConfigValue>,
}

impl StateMetadata {
    pub fn new(builder_config: HashMap<String, ConfigValue>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            n_rows: 0,
            n_cols: 0,
            builder_config,
            progress: HashMap::new(),
        }
    }

    pub fn with_dimensions(mut self, rows: usize, cols: usize) -> Self {
        self.n_rows = rows;
        self.n_cols = cols;
        self
    }

    pub fn with_progress(mut self, population: Option<usize>, effective_n: Option<usize>) -> Self {
        self.progress
            .insert("population".to_string(), ConfigValue::OptionUsize(population));
        self.progress
            .insert("effective_n".to_string(), ConfigValue::OptionUsize(effective_n));
        self
    }

    pub fn effective_n(&self) -> Option<usize> {
        self.progress.get("effective_n").and_then(ConfigValue::as_usize)
    }

    pub fn population(&self) -> Option<usize> {
        self.progress.get("population").and_then(ConfigValue::as_usize)
    }

    /// Get human-readable config summary
    pub fn config_summary(&self) -> String {
        let mut lines: Vec<String> = self
            .builder_config
            .iter()
            .chain(self.progress.iter())
            .map(|(key, value)| format!("  {} = {}", key, value))
            .collect();
        lines.sort();
        lines.join("\n")
    }
}

/// Everything needed to resume a selector, serde-ready.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorState {
    pub metadata: StateMetadata,
    pub matrix: JsonMatrix,
    pub result: Option<SelectionResult>,
    pub ranked: Option<RankedSelection>,
    pub report: Option<BenchmarkReport>,
}
