//! JSON object container.
//!
//! JSON has no NaN, so matrices travel as rows of optional numbers where
//! `null` is the sentinel. Infinite entries are not representable and are
//! written as `null` too.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use downselect_core::DissimilarityMatrix;

use crate::core::SelectorState;
use crate::storage::{StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonMatrix {
    pub rows: Vec<Vec<Option<f64>>>,
}

impl From<&DissimilarityMatrix> for JsonMatrix {
    fn from(matrix: &DissimilarityMatrix) -> Self {
        let rows = (0..matrix.nrows())
            .map(|i| {
                matrix
                    .row(i)
                    .iter()
                    .map(|&v| v.is_finite().then_some(v))
                    .collect()
            })
            .collect();
        Self { rows }
    }
}

impl JsonMatrix {
    pub fn into_matrix(self) -> StorageResult<DissimilarityMatrix> {
        let rows = self
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect();
        DissimilarityMatrix::from_rows(rows).map_err(|e| StorageError::Invalid(e.to_string()))
    }
}

pub fn save_matrix(matrix: &DissimilarityMatrix, path: impl AsRef<Path>) -> StorageResult<()> {
    let json = serde_json::to_string(&JsonMatrix::from(matrix))
        .map_err(|e| StorageError::Serde(format!("Failed to serialize matrix: {}", e)))?;

    fs::write(path.as_ref(), json)
        .map_err(|e| StorageError::Io(format!("Failed to write matrix: {}", e)))?;

    Ok(())
}

pub fn load_matrix(path: impl AsRef<Path>) -> StorageResult<DissimilarityMatrix> {
    let json = fs::read_to_string(path.as_ref())
        .map_err(|e| StorageError::Io(format!("Failed to read matrix: {}", e)))?;

    let matrix: JsonMatrix = serde_json::from_str(&json)
        .map_err(|e| StorageError::Serde(format!("Failed to parse matrix: {}", e)))?;

    matrix.into_matrix()
}

/// Save a selector snapshot to JSON file
pub fn save_state(state: &SelectorState, path: impl AsRef<Path>) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| StorageError::Serde(format!("Failed to serialize state: {}", e)))?;

    fs::write(path.as_ref(), json)
        .map_err(|e| StorageError::Io(format!("Failed to write state: {}", e)))?;

    info!("Saved selector state to {:?}", path.as_ref());
    Ok(())
}

/// Load a selector snapshot from JSON file
pub fn load_state(path: impl AsRef<Path>) -> StorageResult<SelectorState> {
    info!("loading state from {:?}", path.as_ref());
    let json = fs::read_to_string(path.as_ref())
        .map_err(|e| StorageError::Io(format!("Failed to read state: {}", e)))?;

    serde_json::from_str(&json)
        .map_err(|e| StorageError::Serde(format!("Failed to parse state: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use downselect_core::SENTINEL;

    #[test]
    fn test_sentinel_becomes_null() {
        let m = DissimilarityMatrix::from_rows(vec![vec![SENTINEL, 0.25], vec![0.25, SENTINEL]])
            .unwrap();

        let json = serde_json::to_string(&JsonMatrix::from(&m)).unwrap();
        assert_eq!(json, r#"{"rows":[[null,0.25],[0.25,null]]}"#);

        let back: JsonMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_matrix().unwrap(), m);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let parsed: JsonMatrix = serde_json::from_str(r#"{"rows":[[null,1.0],[1.0]]}"#).unwrap();
        assert!(matches!(parsed.into_matrix(), Err(StorageError::Invalid(_))));
    }
}
