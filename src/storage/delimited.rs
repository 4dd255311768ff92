//! Comma and tab separated text.
//!
//! Matrix files start with a header line of column labels (ignored on read,
//! `0..N` on write) followed by one line per row. Empty fields and `nan`,
//! `NaN` or `NA` read as the sentinel; the sentinel is written as `NaN`.

use rayon::prelude::*;
use std::fs;
use std::path::Path;

use downselect_core::{DissimilarityMatrix, RankedIndex, RankedSelection, SENTINEL, is_sentinel};

use crate::storage::parquet::{RANK_COLUMN, RANK_INDEX_COLUMN};
use crate::storage::{StorageError, StorageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

fn parse_field(raw: &str, line: usize, column: usize) -> StorageResult<f64> {
    let field = raw.trim().trim_matches('"');
    match field {
        "" | "nan" | "NaN" | "NAN" | "NA" => Ok(SENTINEL),
        _ => field.parse::<f64>().map_err(|e| {
            StorageError::Parse(format!(
                "line {}, column {}: '{}' ({})",
                line, column, field, e
            ))
        }),
    }
}

fn format_value(value: f64) -> String {
    if is_sentinel(value) {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(1)
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty())
}

/// Parse a matrix from delimited text. Rows of unequal length are rejected.
pub fn parse_matrix(text: &str, delimiter: Delimiter) -> StorageResult<DissimilarityMatrix> {
    if text.lines().next().is_none() {
        return Err(StorageError::Invalid("empty file, header expected".to_string()));
    }

    let lines: Vec<(usize, &str)> = data_lines(text).collect();
    let rows = lines
        .par_iter()
        .map(|&(line_no, line)| {
            line.split(delimiter.as_char())
                .enumerate()
                .map(|(col, raw)| parse_field(raw, line_no, col))
                .collect::<StorageResult<Vec<f64>>>()
        })
        .collect::<StorageResult<Vec<Vec<f64>>>>()?;

    DissimilarityMatrix::from_rows(rows).map_err(|e| StorageError::Invalid(e.to_string()))
}

pub fn render_matrix(matrix: &DissimilarityMatrix, delimiter: Delimiter) -> String {
    let sep = delimiter.as_char().to_string();
    let (rows, cols) = matrix.dim();

    let header = (0..cols).map(|j| j.to_string()).collect::<Vec<_>>().join(&sep);
    let body: Vec<String> = (0..rows)
        .into_par_iter()
        .map(|i| {
            matrix
                .row(i)
                .iter()
                .map(|v| format_value(*v))
                .collect::<Vec<_>>()
                .join(&sep)
        })
        .collect();

    let mut out = header;
    out.push('\n');
    for line in body {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn load_matrix(path: impl AsRef<Path>, delimiter: Delimiter) -> StorageResult<DissimilarityMatrix> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_matrix(&text, delimiter)
}

pub fn save_matrix(
    matrix: &DissimilarityMatrix,
    path: impl AsRef<Path>,
    delimiter: Delimiter,
) -> StorageResult<()> {
    fs::write(path.as_ref(), render_matrix(matrix, delimiter))?;
    Ok(())
}

pub fn render_ranked(ranked: &RankedSelection, delimiter: Delimiter) -> String {
    let sep = delimiter.as_char();
    let mut out = format!("{}{}{}\n", RANK_INDEX_COLUMN, sep, RANK_COLUMN);
    for entry in ranked.iter() {
        out.push_str(&format!("{}{}{}\n", entry.index, sep, entry.rank));
    }
    out
}

pub fn save_ranked(
    ranked: &RankedSelection,
    path: impl AsRef<Path>,
    delimiter: Delimiter,
) -> StorageResult<()> {
    fs::write(path.as_ref(), render_ranked(ranked, delimiter))?;
    Ok(())
}

pub fn load_ranked(path: impl AsRef<Path>, delimiter: Delimiter) -> StorageResult<RankedSelection> {
    let text = fs::read_to_string(path.as_ref())?;

    let mut entries = Vec::new();
    for (line_no, line) in data_lines(&text) {
        let fields: Vec<&str> = line.split(delimiter.as_char()).map(str::trim).collect();
        let [index, rank] = fields.as_slice() else {
            return Err(StorageError::Parse(format!(
                "line {}: expected 2 fields, found {}",
                line_no,
                fields.len()
            )));
        };
        let parse = |raw: &str| {
            raw.parse::<usize>()
                .map_err(|e| StorageError::Parse(format!("line {}: '{}' ({})", line_no, raw, e)))
        };
        entries.push(RankedIndex {
            index: parse(*index)?,
            rank: parse(*rank)?,
        });
    }

    Ok(RankedSelection { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentinel_spellings() {
        let text = "0,1,2\n,1.5,NA\n1.5,nan,2\nNaN,2,\n";
        let m = parse_matrix(text, Delimiter::Comma).unwrap();

        assert_eq!(m.dim(), (3, 3));
        assert!(m.get(0, 0).is_nan());
        assert!(m.get(0, 2).is_nan());
        assert!(m.get(1, 1).is_nan());
        assert!(m.get(2, 0).is_nan());
        assert_eq!(m.get(1, 2), 2.0);
    }

    #[test]
    fn test_tab_and_crlf() {
        let text = "a\tb\r\nNaN\t3\r\n3\tNaN\r\n";
        let m = parse_matrix(text, Delimiter::Tab).unwrap();
        assert_eq!(m.get(0, 1), 3.0);
        assert_eq!(m.get(1, 0), 3.0);
    }

    #[test]
    fn test_bad_field_reports_location() {
        let err = parse_matrix("0,1\nNaN,abc\n", Delimiter::Comma).unwrap_err();
        match err {
            StorageError::Parse(msg) => assert!(msg.contains("line 2, column 1"), "{}", msg),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = parse_matrix("0,1\nNaN,1\n1\n", Delimiter::Comma).unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
    }

    #[test]
    fn test_render_writes_header_and_nan() {
        let m = DissimilarityMatrix::from_rows(vec![vec![SENTINEL, 0.5], vec![0.5, SENTINEL]])
            .unwrap();
        assert_eq!(render_matrix(&m, Delimiter::Comma), "0,1\nNaN,0.5\n0.5,NaN\n");
    }

    #[test]
    fn test_render_ranked_header() {
        let ranked = RankedSelection {
            entries: vec![
                RankedIndex { index: 0, rank: 1 },
                RankedIndex { index: 4, rank: 2 },
            ],
        };
        assert_eq!(
            render_ranked(&ranked, Delimiter::Comma),
            "matrix index,n Dissimilar\n0,1\n4,2\n"
        );
        assert_eq!(
            render_ranked(&ranked, Delimiter::Tab),
            "matrix index\tn Dissimilar\n0\t1\n4\t2\n"
        );
    }
}
