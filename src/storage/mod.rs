//! Matrix loading, result writing and selector state snapshots.
//!
//! Formats are a closed set picked from the file extension:
//!
//! | Extension | Load | Save |
//! |-----------|------|------|
//! | `.csv`, `.tsv` | matrix | matrix, ranked result |
//! | `.parquet` | dense or sparse matrix | dense matrix, ranked result |
//! | `.json` | matrix | matrix, selector state |

pub mod delimited;
pub mod json;
pub mod parquet;

use std::path::Path;

use downselect_core::{DissimilarityMatrix, RankedSelection};

use crate::core::SelectorState;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Arrow(String),
    Parquet(String),
    Serde(String),
    Parse(String),
    Invalid(String),
    UnsupportedFormat(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Arrow(e) => write!(f, "Arrow error: {}", e),
            StorageError::Parquet(e) => write!(f, "Parquet error: {}", e),
            StorageError::Serde(e) => write!(f, "Serde error: {}", e),
            StorageError::Parse(e) => write!(f, "Parse error: {}", e),
            StorageError::Invalid(e) => write!(f, "Invalid: {}", e),
            StorageError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported format: '{}' (expected csv, tsv, parquet or json)", ext)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================================
// Format dispatch
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    Csv,
    Tsv,
    Parquet,
    Json,
}

impl MatrixFormat {
    /// Format from the (trimmed, case-insensitive) file extension.
    pub fn from_path(path: impl AsRef<Path>) -> StorageResult<Self> {
        let raw = path.as_ref().to_string_lossy();
        let trimmed = Path::new(raw.trim());
        let ext = trimmed
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(MatrixFormat::Csv),
            "tsv" => Ok(MatrixFormat::Tsv),
            "parquet" => Ok(MatrixFormat::Parquet),
            "json" => Ok(MatrixFormat::Json),
            other => Err(StorageError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MatrixFormat::Csv => "csv",
            MatrixFormat::Tsv => "tsv",
            MatrixFormat::Parquet => "parquet",
            MatrixFormat::Json => "json",
        }
    }
}

fn trimmed(path: &Path) -> std::path::PathBuf {
    std::path::PathBuf::from(path.to_string_lossy().trim())
}

/// Load a square-or-not matrix; shape is checked later by the preflight.
pub fn load_matrix(path: impl AsRef<Path>) -> StorageResult<DissimilarityMatrix> {
    let path = trimmed(path.as_ref());
    log::info!("Loading matrix from {:?}", path);

    let matrix = match MatrixFormat::from_path(&path)? {
        MatrixFormat::Csv => delimited::load_matrix(&path, delimited::Delimiter::Comma)?,
        MatrixFormat::Tsv => delimited::load_matrix(&path, delimited::Delimiter::Tab)?,
        MatrixFormat::Parquet => parquet::load_matrix(&path)?,
        MatrixFormat::Json => json::load_matrix(&path)?,
    };

    let (rows, cols) = matrix.dim();
    log::info!("  ✓ Loaded {} x {} matrix", rows, cols);
    Ok(matrix)
}

/// Save a matrix in the format given by the extension.
pub fn save_matrix(matrix: &DissimilarityMatrix, path: impl AsRef<Path>) -> StorageResult<()> {
    let path = trimmed(path.as_ref());
    match MatrixFormat::from_path(&path)? {
        MatrixFormat::Csv => delimited::save_matrix(matrix, &path, delimited::Delimiter::Comma),
        MatrixFormat::Tsv => delimited::save_matrix(matrix, &path, delimited::Delimiter::Tab),
        MatrixFormat::Parquet => parquet::save_dense_matrix(matrix, &path),
        MatrixFormat::Json => json::save_matrix(matrix, &path),
    }
}

/// Write the ranked selection: two columns, matrix index and rank.
pub fn save_ranked(ranked: &RankedSelection, path: impl AsRef<Path>) -> StorageResult<()> {
    let path = trimmed(path.as_ref());
    match MatrixFormat::from_path(&path)? {
        MatrixFormat::Csv => delimited::save_ranked(ranked, &path, delimited::Delimiter::Comma),
        MatrixFormat::Tsv => delimited::save_ranked(ranked, &path, delimited::Delimiter::Tab),
        MatrixFormat::Parquet => parquet::save_ranked(ranked, &path),
        MatrixFormat::Json => Err(StorageError::UnsupportedFormat(
            "json (use save_state for the object container)".to_string(),
        )),
    }
}

/// Read a ranked selection back from delimited text or Parquet.
pub fn load_ranked(path: impl AsRef<Path>) -> StorageResult<RankedSelection> {
    let path = trimmed(path.as_ref());
    match MatrixFormat::from_path(&path)? {
        MatrixFormat::Csv => delimited::load_ranked(&path, delimited::Delimiter::Comma),
        MatrixFormat::Tsv => delimited::load_ranked(&path, delimited::Delimiter::Tab),
        MatrixFormat::Parquet => parquet::load_ranked(&path),
        MatrixFormat::Json => Err(StorageError::UnsupportedFormat(
            "json (use load_state for the object container)".to_string(),
        )),
    }
}

/// Persist the full selector state; only the JSON container supports it.
pub fn save_state(state: &SelectorState, path: impl AsRef<Path>) -> StorageResult<()> {
    let path = trimmed(path.as_ref());
    match MatrixFormat::from_path(&path)? {
        MatrixFormat::Json => json::save_state(state, &path),
        other => Err(StorageError::UnsupportedFormat(format!(
            "{} (selector state needs json)",
            other.extension()
        ))),
    }
}

pub fn load_state(path: impl AsRef<Path>) -> StorageResult<SelectorState> {
    let path = trimmed(path.as_ref());
    match MatrixFormat::from_path(&path)? {
        MatrixFormat::Json => json::load_state(&path),
        other => Err(StorageError::UnsupportedFormat(format!(
            "{} (selector state needs json)",
            other.extension()
        ))),
    }
}
