// downselect-core/src/matrix.rs
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;
use sprs::CsMat;

use crate::error::{SelectionError, SelectionResultOf};

/// Marker for self-relations and missing pairwise data.
pub const SENTINEL: f64 = f64::NAN;

#[inline]
pub fn is_sentinel(value: f64) -> bool {
    value.is_nan()
}

/// Dense row-major dissimilarity table.
///
/// Element `(i, j)` scores how different items `i` and `j` are, larger meaning
/// more different. The diagonal holds [`SENTINEL`]; so may unknown relations,
/// and a row made only of sentinels marks an item that keeps its index but
/// can never be selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MatrixParts")]
pub struct DissimilarityMatrix {
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

/// Serialized field layout; deserialization goes through [`DissimilarityMatrix::from_vec`].
#[derive(Deserialize)]
struct MatrixParts {
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

impl TryFrom<MatrixParts> for DissimilarityMatrix {
    type Error = SelectionError;

    fn try_from(parts: MatrixParts) -> Result<Self, Self::Error> {
        Self::from_vec(parts.data, parts.nrows, parts.ncols)
    }
}

impl DissimilarityMatrix {
    /// Build from a flat row-major buffer.
    pub fn from_vec(data: Vec<f64>, nrows: usize, ncols: usize) -> SelectionResultOf<Self> {
        if data.len() != nrows * ncols {
            return Err(SelectionError::BufferLength {
                expected: nrows * ncols,
                found: data.len(),
            });
        }
        Ok(Self { data, nrows, ncols })
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> SelectionResultOf<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);

        let mut data = Vec::with_capacity(nrows * ncols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != ncols {
                return Err(SelectionError::Ragged {
                    row: i,
                    expected: ncols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }

        Ok(Self { data, nrows, ncols })
    }

    /// Square matrix filled with the sentinel.
    pub fn missing(n: usize) -> Self {
        Self {
            data: vec![SENTINEL; n * n],
            nrows: n,
            ncols: n,
        }
    }

    /// Copy out of a smartcore dense matrix.
    pub fn from_dense(dense: &DenseMatrix<f64>) -> Self {
        let (nrows, ncols) = dense.shape();
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(*dense.get((i, j)));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Row-major copy into a smartcore dense matrix.
    pub fn to_dense(&self) -> DenseMatrix<f64> {
        DenseMatrix::from_iterator(self.data.iter().copied(), self.nrows, self.ncols, 0)
    }

    /// Densify a sparse matrix; entries not stored become [`SENTINEL`].
    pub fn from_sparse(sparse: &CsMat<f64>) -> Self {
        let (nrows, ncols) = sparse.shape();
        let mut data = vec![SENTINEL; nrows * ncols];
        for (value, (i, j)) in sparse.iter() {
            data[i * ncols + j] = *value;
        }
        Self { data, nrows, ncols }
    }

    #[inline]
    pub fn dim(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.ncols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.ncols + j] = value;
    }

    /// Set `(i, j)` and `(j, i)` together.
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.set(i, j, value);
        self.set(j, i, value);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Row `i` holds nothing but sentinels.
    pub fn is_missing_row(&self, i: usize) -> bool {
        self.row(i).iter().all(|v| is_sentinel(*v))
    }

    /// Number of rows that are not entirely missing.
    pub fn valid_population(&self) -> usize {
        (0..self.nrows).filter(|&i| !self.is_missing_row(i)).count()
    }

    /// Diagonal positions that do not hold the sentinel.
    pub fn non_sentinel_diagonal(&self) -> Vec<usize> {
        (0..self.nrows.min(self.ncols))
            .filter(|&i| !is_sentinel(self.get(i, i)))
            .collect()
    }

    /// Square submatrix over `indices`, in the given order.
    pub fn submatrix(&self, indices: &[usize]) -> Self {
        let k = indices.len();
        let mut data = Vec::with_capacity(k * k);
        for &i in indices {
            for &j in indices {
                data.push(self.get(i, j));
            }
        }
        Self {
            data,
            nrows: k,
            ncols: k,
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data
            .chunks(self.ncols.max(1))
            .take(self.nrows)
            .map(|r| r.to_vec())
            .collect()
    }
}

/// Equality treats two sentinels at the same position as equal.
impl PartialEq for DissimilarityMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a == b || (is_sentinel(*a) && is_sentinel(*b)))
    }
}
