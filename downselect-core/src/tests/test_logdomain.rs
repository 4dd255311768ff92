// downselect-core/src/tests/test_logdomain.rs

use approx::assert_relative_eq;

use crate::logdomain::*;
use crate::matrix::SENTINEL;
use crate::tests::test_data::{random_symmetric, toy_five};

#[test]
fn test_row_maxima_ignore_sentinel() {
    crate::init();

    let maxima = row_maxima(&toy_five());
    assert_eq!(maxima, vec![Some(5.0), Some(1.0), Some(1.0), Some(1.0), Some(5.0)]);
}

#[test]
fn test_row_maxima_missing_row_is_none() {
    let mut m = random_symmetric(4, 2);
    for j in 0..4 {
        m.set_symmetric(3, j, SENTINEL);
    }
    let maxima = row_maxima(&m);
    assert!(maxima[3].is_none());
    assert!(maxima[..3].iter().all(|v| v.is_some()));
}

#[test]
fn test_argmax_present_never_picks_missing() {
    assert_eq!(argmax_present(&[None, Some(1.0), None, Some(2.0)]), Some(3));
    assert_eq!(argmax_present(&[None, None]), None);
    assert_eq!(argmax_present(&[]), None);
}

#[test]
fn test_parallel_argmax_keeps_first_occurrence() {
    crate::init();

    // Long enough to be split across rayon tasks
    let len = PAR_MIN_LEN * 5;
    let mut values: Vec<f64> = (0..len).map(|i| (i % 97) as f64 * 1e-3).collect();
    values[len - 10] = 42.0;
    values[PAR_MIN_LEN + 3] = 42.0;
    values[7] = SENTINEL;
    values[8] = f64::INFINITY;

    assert_eq!(argmax_finite(&values), Some(PAR_MIN_LEN + 3));
}

#[test]
fn test_accumulate_matches_product() {
    crate::init();

    let rows = [vec![0.5, 2.0, 0.1], vec![0.25, 3.0, 10.0], vec![4.0, 0.5, 0.3]];
    let mut acc = vec![0.0; 3];
    for row in &rows {
        accumulate_ln(&mut acc, row);
    }

    for j in 0..3 {
        let product: f64 = rows.iter().map(|r| r[j]).product();
        assert_relative_eq!(acc[j], product.ln(), epsilon = 1e-12);
    }
}

#[test]
fn test_accumulate_survives_underflow() {
    // 2000 factors of 1e-200 underflow a direct product to zero
    let mut acc = vec![0.0; 2];
    let row = vec![1e-200, 1e-200];
    for _ in 0..2000 {
        accumulate_ln(&mut acc, &row);
    }

    let direct: f64 = (0..2000).map(|_| 1e-200f64).product();
    assert_eq!(direct, 0.0);
    assert!(acc[0].is_finite());
    assert_relative_eq!(acc[0], 2000.0 * (1e-200f64).ln(), max_relative = 1e-12);
}

#[test]
fn test_non_positive_values_become_non_finite() {
    let mut acc = vec![0.0; 3];
    accumulate_ln(&mut acc, &[0.0, -1.0, SENTINEL]);
    assert_eq!(acc[0], f64::NEG_INFINITY);
    assert!(acc[1].is_nan());
    assert!(acc[2].is_nan());

    // Once non-finite, adding finite terms never recovers
    accumulate_ln(&mut acc, &[5.0, 5.0, 5.0]);
    assert!(acc.iter().all(|v| !v.is_finite()));
    assert_eq!(argmax_finite(&acc), None);
}

#[test]
fn test_finite_ln_sum_skips_sentinel() {
    let sum = finite_ln_sum(&[SENTINEL, std::f64::consts::E, 1.0, 0.0]);
    assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
}
