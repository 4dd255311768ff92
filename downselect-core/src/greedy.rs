// downselect-core/src/greedy.rs
//! Greedy down-selection: grow a maximally dissimilar set one item at a time
//!
//! Input: square matrix D [N, N], sentinel diagonal, set size n ≥ 2
//!
//! Step 1: Seed pair
//!   row_max[i] = max_j D[i, j]                  # finite entries only
//!   ind1 = argmax(row_max)                      # first occurrence
//!   ind2 = ind1 + 1 + argmax(row_max[ind1+1..]) # suffix only
//!
//! Step 2: Log-domain running product
//!   logsum = ln D[ind1, :]
//!   repeat n - 2 times:
//!     logsum += ln D[last, :]
//!     next = argmax_finite(logsum)
//!
//! Output:
//!   - indices: Vec<usize>  [n], selection order is the dissimilarity rank
//!
//! The ind2 rule searches the suffix after ind1 only, so a tied maximum
//! sitting before ind1 can never become ind2. Downstream consumers rely on
//! that exact deterministic output; keep it.
//!
//! A column whose logsum turns non-finite (sentinel, zero or negative entry
//! against any selected row) is never chosen afterwards. Selected indices
//! poison themselves through their sentinel diagonal and are also masked
//! explicitly.

use serde::{Deserialize, Serialize};

use crate::error::{SelectionError, SelectionResultOf};
use crate::logdomain::{accumulate_ln, argmax_finite, argmax_present, row_maxima};
use crate::matrix::{DissimilarityMatrix, SENTINEL};
use crate::preflight::{MIN_SET_SIZE, ValidatedSelection};

/// Ordered output of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Matrix indices in selection order
    pub indices: Vec<usize>,
    /// Score at the moment each index was picked: row maximum for the seed
    /// pair, accumulated log-sum for the others
    pub scores: Vec<f64>,
}

impl SelectionResult {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Seed pair, the two first picks.
    pub fn seed_pair(&self) -> Option<(usize, usize)> {
        match self.indices.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }

    /// The selection a search with `k` items would have produced.
    pub fn prefix(&self, k: usize) -> SelectionResult {
        let k = k.min(self.len());
        SelectionResult {
            indices: self.indices[..k].to_vec(),
            scores: self.scores[..k].to_vec(),
        }
    }

    /// Attach ranks 1..=n in selection order.
    pub fn rank(&self) -> RankedSelection {
        RankedSelection {
            entries: self
                .indices
                .iter()
                .enumerate()
                .map(|(pos, &index)| RankedIndex {
                    index,
                    rank: pos + 1,
                })
                .collect(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Selection: n={}, seed={:?}, indices={:?}",
            self.len(),
            self.seed_pair(),
            self.indices
        )
    }
}

/// One selected matrix index and its 1-based dissimilarity rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedIndex {
    pub index: usize,
    pub rank: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSelection {
    pub entries: Vec<RankedIndex>,
}

impl RankedSelection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.index).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedIndex> {
        self.entries.iter()
    }
}

/// Pick the two seeds from the row maxima.
pub fn seed_pair(matrix: &DissimilarityMatrix) -> SelectionResultOf<(usize, usize)> {
    let row_max = row_maxima(matrix);

    let ind1 = argmax_present(&row_max).ok_or(SelectionError::InsufficientPopulation {
        requested: MIN_SET_SIZE,
        available: 0,
    })?;
    let ind2 = argmax_present(&row_max[ind1 + 1..])
        .map(|offset| ind1 + 1 + offset)
        .ok_or(SelectionError::SeedPairUnavailable { first: ind1 })?;

    Ok((ind1, ind2))
}

/// Run the greedy search for `n` items on a square matrix.
pub fn search(matrix: &DissimilarityMatrix, n: usize) -> SelectionResultOf<SelectionResult> {
    let (rows, cols) = matrix.dim();
    if !matrix.is_square() {
        return Err(SelectionError::Shape { rows, cols });
    }
    if n < MIN_SET_SIZE {
        return Err(SelectionError::InsufficientPopulation {
            requested: n,
            available: matrix.valid_population(),
        });
    }

    let (ind1, ind2) = seed_pair(matrix)?;
    log::debug!("Seed pair: ({}, {})", ind1, ind2);

    let mut indices = Vec::with_capacity(n);
    let mut scores = Vec::with_capacity(n);
    for ind in [ind1, ind2] {
        indices.push(ind);
        scores.push(
            matrix
                .row(ind)
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(f64::NEG_INFINITY, f64::max),
        );
    }

    let mut logsum = vec![0.0; rows];
    accumulate_ln(&mut logsum, matrix.row(ind1));
    logsum[ind1] = SENTINEL;
    logsum[ind2] = SENTINEL;

    for step in 0..n.saturating_sub(MIN_SET_SIZE) {
        let last = indices[indices.len() - 1];
        accumulate_ln(&mut logsum, matrix.row(last));

        let next = argmax_finite(&logsum).ok_or(SelectionError::CandidatesExhausted {
            selected: indices.len(),
            target: n,
        })?;
        log::trace!(
            "step {}: picked {} (logsum = {:.6})",
            step + MIN_SET_SIZE + 1,
            next,
            logsum[next]
        );

        indices.push(next);
        scores.push(logsum[next]);
        logsum[next] = SENTINEL;
    }

    Ok(SelectionResult { indices, scores })
}

/// Greedy search stage executor
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedySearch;

impl GreedySearch {
    pub fn new() -> Self {
        Self
    }

    /// Search the preflighted matrix for `effective_n` items.
    pub fn execute(&self, validated: &ValidatedSelection) -> SelectionResultOf<SelectionResult> {
        log::info!("╔═══════════════════════════════════════════════════════╗");
        log::info!("║  GREEDY SEARCH                                        ║");
        log::info!("╚═══════════════════════════════════════════════════════╝");
        log::info!(
            "🔎 Searching most dissimilar set of size n = {} among N = {}",
            validated.effective_n,
            validated.population
        );

        let result = search(&validated.matrix, validated.effective_n)?;

        log::info!("  ✓ {}", result.summary());
        Ok(result)
    }
}
