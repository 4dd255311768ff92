// downselect-core/src/logdomain.rs
//! NaN-aware reductions and log-domain accumulation
//!
//! The greedy search wants, for every candidate column, the product of its
//! dissimilarities to all selected rows. At 50,000 × 50,000 scale a running
//! product of sub-unit values underflows, so the product is kept as a sum of
//! natural logarithms:
//!
//! ```text
//! Π_s d(s, j)  ⇔  Σ_s ln d(s, j)
//! ```
//!
//! `ln` of a sentinel (NaN), of zero (−∞) or of a negative value (NaN) is not
//! finite. Once such a term enters the accumulator the column stays non-finite
//! forever and every reduction here skips it: that is how missing data
//! disqualifies a candidate.
//!
//! Reductions run on rayon and keep first-occurrence tie-breaking, so the
//! parallel result is identical to a left-to-right scan.

use rayon::prelude::*;

use crate::matrix::DissimilarityMatrix;

/// Minimum slice length handed to a single rayon task.
pub const PAR_MIN_LEN: usize = 4096;

/// Largest finite value of `values`, skipping sentinels and infinities.
pub fn finite_max(values: &[f64]) -> Option<f64> {
    values
        .par_iter()
        .with_min_len(PAR_MIN_LEN)
        .copied()
        .filter(|v| v.is_finite())
        .reduce_with(f64::max)
}

/// Per-row finite maximum; `None` for rows without any finite entry.
pub fn row_maxima(matrix: &DissimilarityMatrix) -> Vec<Option<f64>> {
    (0..matrix.nrows())
        .into_par_iter()
        .map(|i| {
            matrix
                .row(i)
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .reduce(f64::max)
        })
        .collect()
}

/// Keep the larger value; on equal values keep the lower index.
#[inline]
fn first_max(a: (usize, f64), b: (usize, f64)) -> (usize, f64) {
    if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) {
        b
    } else {
        a
    }
}

/// Index of the largest finite value, first occurrence on ties.
///
/// Returns `None` when no entry is finite.
pub fn argmax_finite(values: &[f64]) -> Option<usize> {
    values
        .par_iter()
        .with_min_len(PAR_MIN_LEN)
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .reduce_with(first_max)
        .map(|(i, _)| i)
}

/// [`argmax_finite`] over optional values, `None` entries never win.
pub fn argmax_present(values: &[Option<f64>]) -> Option<usize> {
    values
        .par_iter()
        .with_min_len(PAR_MIN_LEN)
        .enumerate()
        .filter_map(|(i, v)| (*v).filter(|x| x.is_finite()).map(|x| (i, x)))
        .reduce_with(first_max)
        .map(|(i, _)| i)
}

/// `acc[j] += ln(row[j])` for every column.
///
/// # Panics
/// Panics if the lengths differ.
pub fn accumulate_ln(acc: &mut [f64], row: &[f64]) {
    assert_eq!(acc.len(), row.len(), "accumulator and row length differ");
    acc.par_iter_mut()
        .with_min_len(PAR_MIN_LEN)
        .zip(row.par_iter())
        .for_each(|(a, &d)| *a += d.ln());
}

/// Sum of `ln(v)` over the values whose logarithm is finite.
pub fn finite_ln_sum(values: &[f64]) -> f64 {
    values
        .par_iter()
        .with_min_len(PAR_MIN_LEN)
        .map(|v| v.ln())
        .filter(|l| l.is_finite())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SENTINEL;

    #[test]
    fn test_finite_max_skips_sentinel() {
        assert_eq!(finite_max(&[SENTINEL, 1.0, 3.0, 2.0]), Some(3.0));
        assert_eq!(finite_max(&[SENTINEL, SENTINEL]), None);
        assert_eq!(finite_max(&[]), None);
    }

    #[test]
    fn test_argmax_first_occurrence() {
        assert_eq!(argmax_finite(&[1.0, 5.0, 2.0, 5.0]), Some(1));
        assert_eq!(argmax_finite(&[SENTINEL, f64::NEG_INFINITY]), None);
    }

    #[test]
    fn test_accumulate_ln_poisons_sentinel() {
        let mut acc = vec![0.0; 3];
        accumulate_ln(&mut acc, &[SENTINEL, 1.0, std::f64::consts::E]);
        assert!(acc[0].is_nan());
        assert_eq!(acc[1], 0.0);
        assert!((acc[2] - 1.0).abs() < 1e-12);
    }
}
