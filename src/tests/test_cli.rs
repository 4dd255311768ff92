use clap::Parser;
use serial_test::serial;
use tempfile::TempDir;

use crate::cli::{Args, MakeDatasetArgs, make_dataset, run};
use crate::error::DownSelectError;
use crate::storage::{self, StorageError, parquet};
use crate::tests::init;

#[test]
fn args_defaults() {
    let args = Args::try_parse_from(["downselect", "-m", "rmsd.csv"]).unwrap();

    assert_eq!(args.matrix.to_str(), Some("rmsd.csv"));
    assert_eq!(args.n, 3);
    assert!(!args.bench);
    assert_eq!(args.output_dir.to_str(), Some("SDS"));
}

#[test]
fn args_long_flags() {
    let args = Args::try_parse_from([
        "downselect",
        "--mtrx",
        "m.tsv",
        "--ndis",
        "10",
        "--bench",
        "--output-dir",
        "out",
    ])
    .unwrap();

    assert_eq!(args.n, 10);
    assert!(args.bench);
    assert_eq!(args.output_dir.to_str(), Some("out"));
}

#[test]
fn args_require_matrix() {
    assert!(Args::try_parse_from(["downselect", "-n", "4"]).is_err());
}

#[test]
#[serial]
fn end_to_end_with_benchmark() {
    init();

    let dir = TempDir::new().unwrap();
    let matrix_path = dir.path().join("toy.csv");
    let out = dir.path().join("SDS");

    make_dataset(&MakeDatasetArgs {
        size: 30,
        seed: 5,
        out: matrix_path.clone(),
        sparse: false,
    })
    .unwrap();

    let outcome = run(&Args {
        matrix: matrix_path,
        n: 8,
        bench: true,
        output_dir: out.clone(),
    })
    .unwrap();

    assert_eq!(outcome.ranked.len(), 8);
    assert_eq!(outcome.result_path, out.join("SDS_N30_8_dissimilar.csv"));
    assert_eq!(
        storage::load_ranked(&outcome.result_path).unwrap(),
        outcome.ranked
    );

    let report_path = outcome.report_path.unwrap();
    assert_eq!(report_path, out.join("SDS-N30-n8.txt"));
    let report = std::fs::read_to_string(report_path).unwrap();
    assert_eq!(report.lines().count(), 2);
}

#[test]
#[serial]
fn end_to_end_without_benchmark() {
    init();

    let dir = TempDir::new().unwrap();
    let matrix_path = dir.path().join("toy.parquet");

    make_dataset(&MakeDatasetArgs {
        size: 12,
        seed: 1,
        out: matrix_path.clone(),
        sparse: true,
    })
    .unwrap();
    assert_eq!(
        parquet::detect_layout(&matrix_path).unwrap(),
        parquet::ParquetLayout::Sparse
    );

    let outcome = run(&Args {
        matrix: matrix_path,
        n: 50,
        bench: false,
        output_dir: dir.path().join("out"),
    })
    .unwrap();

    // Request clamped to the 12 items
    assert_eq!(outcome.ranked.len(), 12);
    assert!(outcome.report_path.is_none());
    assert!(
        outcome
            .result_path
            .ends_with("SDS_N12_12_dissimilar.csv")
    );
}

#[test]
fn unsupported_matrix_format() {
    let dir = TempDir::new().unwrap();
    let err = run(&Args {
        matrix: dir.path().join("matrix.pkl"),
        n: 3,
        bench: false,
        output_dir: dir.path().join("out"),
    })
    .unwrap_err();

    assert!(matches!(
        err,
        DownSelectError::Storage(StorageError::UnsupportedFormat(_))
    ));
}

#[test]
fn make_dataset_args_parse() {
    let args =
        MakeDatasetArgs::try_parse_from(["make-dataset", "--size", "50", "--out", "d/m.json"])
            .unwrap();
    assert_eq!(args.size, 50);
    assert_eq!(args.seed, 42);
    assert!(!args.sparse);
}
