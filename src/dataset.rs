use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use downselect_core::DissimilarityMatrix;

/// Symmetric toy matrix: sentinel diagonal, off-diagonal entries uniform in
/// the open interval (0, 1). Same `(n, seed)` gives the same matrix.
pub fn make_toy_dataset(n: usize, seed: u64) -> DissimilarityMatrix {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut matrix = DissimilarityMatrix::missing(n);

    for i in 0..n {
        for j in (i + 1)..n {
            let mut value: f64 = rng.random();
            while value <= 0.0 {
                value = rng.random();
            }
            matrix.set_symmetric(i, j, value);
        }
    }

    log::debug!("Generated {} x {} toy matrix (seed {})", n, n, seed);
    matrix
}
