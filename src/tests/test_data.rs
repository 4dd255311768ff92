use downselect_core::{DissimilarityMatrix, SENTINEL};

use crate::dataset::make_toy_dataset;

/// Five items, all pairs at 1.0 except (0, 4) at 5.0.
pub fn toy_five() -> DissimilarityMatrix {
    let s = SENTINEL;
    DissimilarityMatrix::from_rows(vec![
        vec![s, 1.0, 1.0, 1.0, 5.0],
        vec![1.0, s, 1.0, 1.0, 1.0],
        vec![1.0, 1.0, s, 1.0, 1.0],
        vec![1.0, 1.0, 1.0, s, 1.0],
        vec![5.0, 1.0, 1.0, 1.0, s],
    ])
    .unwrap()
}

/// Toy matrix with item `missing` blanked out entirely.
pub fn with_missing_item(n: usize, seed: u64, missing: usize) -> DissimilarityMatrix {
    let mut m = make_toy_dataset(n, seed);
    for j in 0..n {
        m.set_symmetric(missing, j, SENTINEL);
    }
    m
}
