use arrow::{
    array::{Float64Array, RecordBatch, StringArray, UInt64Array},
    datatypes::{DataType, Field, Schema, SchemaRef},
};
use log::{debug, info};
use parquet::{
    arrow::{
        ArrowWriter,
        arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder},
    },
    basic::Compression,
    file::properties::WriterProperties,
};
use sprs::{CsMat, TriMat};
use std::{fs::File, path::Path, sync::Arc};

use downselect_core::{DissimilarityMatrix, RankedIndex, RankedSelection, is_sentinel};

use crate::storage::{StorageError, StorageResult};

pub const RANK_INDEX_COLUMN: &str = "matrix index";
pub const RANK_COLUMN: &str = "n Dissimilar";

/// Dense files carry one `col_{j}` column per matrix column, sparse files
/// carry COO triplets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParquetLayout {
    Dense,
    Sparse,
}

fn name_id_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "matrix".to_string())
}

fn write_batch(path: &Path, schema: SchemaRef, batch: &RecordBatch) -> StorageResult<()> {
    let file = File::create(path).map_err(|e| StorageError::Io(e.to_string()))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))
        .map_err(|e| StorageError::Parquet(e.to_string()))?;

    writer
        .write(batch)
        .map_err(|e| StorageError::Parquet(e.to_string()))?;

    writer
        .close()
        .map_err(|e| StorageError::Parquet(e.to_string()))?;

    Ok(())
}

fn open_reader(path: &Path) -> StorageResult<(SchemaRef, ParquetRecordBatchReader)> {
    let file = File::open(path).map_err(|e| StorageError::Io(e.to_string()))?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| StorageError::Parquet(e.to_string()))?;
    let schema = builder.schema().clone();

    let reader = builder
        .build()
        .map_err(|e| StorageError::Parquet(e.to_string()))?;

    Ok((schema, reader))
}

fn u64_column<'a>(batch: &'a RecordBatch, name: &str) -> StorageResult<&'a UInt64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
        .ok_or_else(|| StorageError::Invalid(format!("{} column missing", name)))
}

fn f64_column<'a>(batch: &'a RecordBatch, name: &str) -> StorageResult<&'a Float64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| StorageError::Invalid(format!("{} column missing", name)))
}

/// Layout of a file on disk, read from its schema only.
pub fn detect_layout(path: impl AsRef<Path>) -> StorageResult<ParquetLayout> {
    let (schema, _) = open_reader(path.as_ref())?;
    if schema.field_with_name("row").is_ok() && schema.field_with_name("value").is_ok() {
        Ok(ParquetLayout::Sparse)
    } else if schema.field_with_name("n_cols").is_ok() {
        Ok(ParquetLayout::Dense)
    } else {
        Err(StorageError::Invalid(
            "Parquet schema is neither a dense nor a sparse matrix".to_string(),
        ))
    }
}

/// Load either layout into a dissimilarity matrix.
pub fn load_matrix(path: impl AsRef<Path>) -> StorageResult<DissimilarityMatrix> {
    match detect_layout(path.as_ref())? {
        ParquetLayout::Dense => load_dense_matrix(path),
        ParquetLayout::Sparse => {
            let sparse = load_sparse_matrix(path)?;
            debug!("Densifying sparse matrix with {} stored entries", sparse.nnz());
            Ok(DissimilarityMatrix::from_sparse(&sparse))
        }
    }
}

// ============================================================================
// Dense Matrix Storage
// ============================================================================

/// Save a matrix column by column; the sentinel is stored as a plain NaN.
pub fn save_dense_matrix(
    matrix: &DissimilarityMatrix,
    path: impl AsRef<Path>,
) -> StorageResult<()> {
    let path = path.as_ref();
    let name_id = name_id_of(path);
    let (n_rows, n_cols) = matrix.dim();

    let mut fields = vec![
        Field::new("name_id", DataType::Utf8, false),
        Field::new("n_rows", DataType::UInt64, false),
        Field::new("n_cols", DataType::UInt64, false),
    ];

    for i in 0..n_cols {
        fields.push(Field::new(format!("col_{}", i), DataType::Float64, false));
    }

    let schema = Arc::new(Schema::new(fields));

    let name_array = StringArray::from(vec![name_id.as_str(); n_rows]);
    let n_rows_array = UInt64Array::from(vec![n_rows as u64; n_rows]);
    let n_cols_array = UInt64Array::from(vec![n_cols as u64; n_rows]);

    let mut columns: Vec<Arc<dyn arrow::array::Array>> = vec![
        Arc::new(name_array),
        Arc::new(n_rows_array),
        Arc::new(n_cols_array),
    ];

    for col_idx in 0..n_cols {
        let col_data: Vec<f64> = (0..n_rows)
            .map(|row_idx| matrix.get(row_idx, col_idx))
            .collect();
        columns.push(Arc::new(Float64Array::from(col_data)));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns)
        .map_err(|e| StorageError::Arrow(e.to_string()))?;

    write_batch(path, schema, &batch)?;
    info!("Saved dense {} x {} matrix to {:?}", n_rows, n_cols, path);

    Ok(())
}

/// Load a dense matrix, concatenating however many record batches the
/// reader hands back.
pub fn load_dense_matrix(path: impl AsRef<Path>) -> StorageResult<DissimilarityMatrix> {
    let (_, reader) = open_reader(path.as_ref())?;

    let mut dims: Option<(usize, usize)> = None;
    let mut flat_data: Vec<f64> = Vec::new();
    let mut current_row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| StorageError::Parquet(e.to_string()))?;
        let batch_rows = batch.num_rows();
        if batch_rows == 0 {
            continue;
        }

        let (total_rows, cols) = match dims {
            Some(d) => d,
            None => {
                let r = u64_column(&batch, "n_rows")?.value(0) as usize;
                let c = u64_column(&batch, "n_cols")?.value(0) as usize;
                flat_data = vec![0.0; r * c];
                dims = Some((r, c));
                (r, c)
            }
        };

        if current_row_offset + batch_rows > total_rows {
            return Err(StorageError::Invalid(format!(
                "Parquet file holds more than the {} rows its metadata claims",
                total_rows
            )));
        }

        // Row-major: this batch fills rows [offset, offset + batch_rows)
        for col_idx in 0..cols {
            let col = f64_column(&batch, &format!("col_{}", col_idx))?;
            for (k, value) in col.values().iter().enumerate() {
                flat_data[(current_row_offset + k) * cols + col_idx] = *value;
            }
        }

        current_row_offset += batch_rows;
    }

    let (n_rows, n_cols) =
        dims.ok_or_else(|| StorageError::Invalid("No data in parquet file".to_string()))?;

    if current_row_offset != n_rows {
        return Err(StorageError::Invalid(format!(
            "Parquet file contained {} rows, but metadata claimed {}",
            current_row_offset, n_rows
        )));
    }

    DissimilarityMatrix::from_vec(flat_data, n_rows, n_cols)
        .map_err(|e| StorageError::Invalid(e.to_string()))
}

// ============================================================================
// Sparse Matrix Storage
// ============================================================================

/// Save the non-sentinel entries as COO triplets.
pub fn save_sparse_matrix(
    matrix: &DissimilarityMatrix,
    path: impl AsRef<Path>,
) -> StorageResult<()> {
    let path = path.as_ref();
    let name_id = name_id_of(path);
    let (n_rows, n_cols) = matrix.dim();

    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for row_idx in 0..n_rows {
        for (col_idx, &value) in matrix.row(row_idx).iter().enumerate() {
            if !is_sentinel(value) {
                rows.push(row_idx as u64);
                cols.push(col_idx as u64);
                vals.push(value);
            }
        }
    }
    let nnz = vals.len();

    let schema = Arc::new(Schema::new(vec![
        Field::new("name_id", DataType::Utf8, false),
        Field::new("n_rows", DataType::UInt64, false),
        Field::new("n_cols", DataType::UInt64, false),
        Field::new("nnz", DataType::UInt64, false),
        Field::new("row", DataType::UInt64, false),
        Field::new("col", DataType::UInt64, false),
        Field::new("value", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec![name_id.as_str(); nnz])),
            Arc::new(UInt64Array::from(vec![n_rows as u64; nnz])),
            Arc::new(UInt64Array::from(vec![n_cols as u64; nnz])),
            Arc::new(UInt64Array::from(vec![nnz as u64; nnz])),
            Arc::new(UInt64Array::from(rows)),
            Arc::new(UInt64Array::from(cols)),
            Arc::new(Float64Array::from(vals)),
        ],
    )
    .map_err(|e| StorageError::Arrow(e.to_string()))?;

    write_batch(path, schema, &batch)?;
    info!(
        "Saved sparse {} x {} matrix ({} stored entries) to {:?}",
        n_rows, n_cols, nnz, path
    );

    Ok(())
}

/// Load COO triplets into a CSR matrix.
pub fn load_sparse_matrix(path: impl AsRef<Path>) -> StorageResult<CsMat<f64>> {
    let (_, reader) = open_reader(path.as_ref())?;

    let mut trimat: Option<TriMat<f64>> = None;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| StorageError::Parquet(e.to_string()))?;
        if batch.num_rows() == 0 {
            continue;
        }

        // Extract dimensions from the first non-empty batch
        if trimat.is_none() {
            let n_rows = u64_column(&batch, "n_rows")?.value(0) as usize;
            let n_cols = u64_column(&batch, "n_cols")?.value(0) as usize;
            trimat = Some(TriMat::new((n_rows, n_cols)));
        }
        let Some(tm) = trimat.as_mut() else {
            continue;
        };

        let row_col = u64_column(&batch, "row")?;
        let col_col = u64_column(&batch, "col")?;
        let val_col = f64_column(&batch, "value")?;

        let (n_rows, n_cols) = (tm.rows(), tm.cols());
        for i in 0..row_col.len() {
            let (r, c) = (row_col.value(i) as usize, col_col.value(i) as usize);
            if r >= n_rows || c >= n_cols {
                return Err(StorageError::Invalid(format!(
                    "Triplet ({}, {}) outside {} x {} matrix",
                    r, c, n_rows, n_cols
                )));
            }
            tm.add_triplet(r, c, val_col.value(i));
        }
    }

    trimat
        .ok_or_else(|| StorageError::Invalid("No data in parquet file".to_string()))
        .map(|tm| tm.to_csr())
}

// ============================================================================
// Ranked selection
// ============================================================================

pub fn save_ranked(ranked: &RankedSelection, path: impl AsRef<Path>) -> StorageResult<()> {
    let path = path.as_ref();
    if ranked.is_empty() {
        return Err(StorageError::Invalid(
            "Cannot save empty ranked selection".to_string(),
        ));
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new(RANK_INDEX_COLUMN, DataType::UInt64, false),
        Field::new(RANK_COLUMN, DataType::UInt64, false),
    ]));

    let indices: Vec<u64> = ranked.iter().map(|e| e.index as u64).collect();
    let ranks: Vec<u64> = ranked.iter().map(|e| e.rank as u64).collect();

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(UInt64Array::from(indices)),
            Arc::new(UInt64Array::from(ranks)),
        ],
    )
    .map_err(|e| StorageError::Arrow(e.to_string()))?;

    write_batch(path, schema, &batch)
}

pub fn load_ranked(path: impl AsRef<Path>) -> StorageResult<RankedSelection> {
    let (_, reader) = open_reader(path.as_ref())?;

    let mut entries = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| StorageError::Parquet(e.to_string()))?;

        let index_col = u64_column(&batch, RANK_INDEX_COLUMN)?;
        let rank_col = u64_column(&batch, RANK_COLUMN)?;

        entries.extend(
            index_col
                .values()
                .iter()
                .zip(rank_col.values().iter())
                .map(|(&index, &rank)| RankedIndex {
                    index: index as usize,
                    rank: rank as usize,
                }),
        );
    }

    Ok(RankedSelection { entries })
}

// ============================================================================
// Tests
// ============================================================================
