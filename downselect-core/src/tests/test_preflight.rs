// downselect-core/src/tests/test_preflight.rs

use crate::error::SelectionError;
use crate::matrix::{DissimilarityMatrix, SENTINEL};
use crate::preflight::*;
use crate::tests::test_data::{random_symmetric, toy_five};

#[test]
fn test_preflight_no_clamp_needed() {
    crate::init();

    let stage = PreflightStage::new();
    let output = stage
        .execute(SelectionConfig::new(random_symmetric(20, 1), 3))
        .unwrap();

    assert_eq!(output.population, 20);
    assert_eq!(output.valid_population, 20);
    assert_eq!(output.effective_n, 3);
    assert!(!output.was_clamped());
    assert!(output.non_sentinel_diagonal.is_empty());
}

#[test]
fn test_preflight_clamps_to_population() {
    crate::init();

    // Same cases as the toy 20 x 20 dataset: 3 -> 3, 20 -> 20, 21 -> 20
    for (requested, expected) in [(3, 3), (20, 20), (21, 20)] {
        let output = PreflightStage::new()
            .execute(SelectionConfig::new(random_symmetric(20, 2), requested))
            .unwrap();
        assert_eq!(output.effective_n, expected, "requested {}", requested);
        assert_eq!(output.requested_n, requested);
    }
}

#[test]
fn test_clamp_counts_only_non_missing_rows() {
    crate::init();

    let mut m = random_symmetric(8, 3);
    for j in 0..8 {
        m.set_symmetric(0, j, SENTINEL);
        m.set_symmetric(6, j, SENTINEL);
    }

    assert_eq!(clamp(8, &m).unwrap(), 6);
    assert_eq!(clamp(4, &m).unwrap(), 4);
}

#[test]
fn test_clamp_rejects_n_one() {
    assert_eq!(
        clamp(1, &toy_five()),
        Err(SelectionError::InsufficientPopulation {
            requested: 1,
            available: 5
        })
    );
    assert!(clamp(0, &toy_five()).is_err());
}

#[test]
fn test_clamp_rejects_single_valid_item() {
    let mut m = DissimilarityMatrix::missing(4);
    m.set(2, 1, 0.3);

    assert_eq!(m.valid_population(), 1);
    assert_eq!(
        clamp(3, &m),
        Err(SelectionError::InsufficientPopulation {
            requested: 3,
            available: 1
        })
    );
}

#[test]
fn test_preflight_rejects_non_square() {
    crate::init();

    let m = DissimilarityMatrix::from_vec(vec![0.5; 12], 3, 4).unwrap();
    let err = PreflightStage::new()
        .execute(SelectionConfig::new(m, 2))
        .unwrap_err();

    assert_eq!(err, SelectionError::Shape { rows: 3, cols: 4 });
}

#[test]
fn test_validate_rows_rejects_ragged_input() {
    let err = validate_rows(vec![vec![SENTINEL, 1.0], vec![1.0, SENTINEL, 2.0]]).unwrap_err();
    assert!(matches!(err, SelectionError::Ragged { row: 1, .. }));
}

#[test]
fn test_validate_is_idempotent_copy() {
    let original = toy_five();
    let once = validate(&original).unwrap();
    let twice = validate(&once).unwrap();

    assert_eq!(once, original);
    assert_eq!(twice, once);
    assert_ne!(once.as_slice().as_ptr(), original.as_slice().as_ptr());
}

#[test]
fn test_preflight_reports_non_sentinel_diagonal() {
    crate::init();

    let mut m = toy_five();
    m.set(1, 1, 0.0);
    m.set(3, 3, 2.0);

    let output = PreflightStage::new()
        .execute(SelectionConfig::with_default_n(m))
        .unwrap();

    assert_eq!(output.non_sentinel_diagonal, vec![1, 3]);
    assert_eq!(output.effective_n, DEFAULT_N);
}

#[test]
fn test_summary_mentions_clamp() {
    let output = PreflightStage::new()
        .execute(SelectionConfig::new(toy_five(), 9))
        .unwrap();
    let summary = output.summary();
    assert!(summary.contains("n=5"));
    assert!(summary.contains("requested 9"));
    assert!(summary.contains("clamped=true"));
}
