//! Command-line front ends for the `downselect` and `make-dataset` binaries.

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use downselect_core::{DEFAULT_N, RankedSelection};

use crate::builder::{DEFAULT_OUTPUT_DIR, DownSelectBuilder};
use crate::dataset::make_toy_dataset;
use crate::error::DownSelectResult;
use crate::storage::{self, MatrixFormat, parquet};

/// Select the n most dissimilar items of a pairwise dissimilarity matrix.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "downselect", version, about)]
pub struct Args {
    /// Matrix file (.csv, .tsv, .parquet or .json)
    #[arg(short('m'), long("mtrx"))]
    pub matrix: PathBuf,

    /// Number of dissimilar items to select
    #[arg(short('n'), long("ndis"), default_value_t = DEFAULT_N)]
    pub n: usize,

    /// Write the total-dissimilarity report
    #[arg(short('b'), long("bench"), default_value_t = false)]
    pub bench: bool,

    /// Directory for the ranked result and the report
    #[arg(short('o'), long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

/// What a `downselect` run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub ranked: RankedSelection,
    pub result_path: PathBuf,
    pub report_path: Option<PathBuf>,
}

pub fn run(args: &Args) -> DownSelectResult<RunOutcome> {
    let start = Instant::now();

    let matrix = storage::load_matrix(&args.matrix)?;
    let mut selector = DownSelectBuilder::new()
        .with_n(args.n)
        .with_benchmark(args.bench)
        .with_output_dir(&args.output_dir)
        .build(matrix);

    let ranked = selector.run()?;
    let result_path = selector.save(&args.output_dir)?;

    let elapsed = start.elapsed();
    info!("Elapsed time: {:.6} minutes", elapsed.as_secs_f64() / 60.0);

    let report_path = match selector.report() {
        Some(report) => Some(
            report
                .clone()
                .with_elapsed(elapsed)
                .write_report(&args.output_dir)?,
        ),
        None => None,
    };

    Ok(RunOutcome {
        ranked,
        result_path,
        report_path,
    })
}

/// Write a seeded toy dissimilarity matrix.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "make-dataset", version, about)]
pub struct MakeDatasetArgs {
    /// Number of items N
    #[arg(short('s'), long, default_value_t = 100)]
    pub size: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output file, format picked from the extension
    #[arg(short('o'), long)]
    pub out: PathBuf,

    /// Store COO triplets instead of dense columns (Parquet only)
    #[arg(long, default_value_t = false)]
    pub sparse: bool,
}

pub fn make_dataset(args: &MakeDatasetArgs) -> DownSelectResult<PathBuf> {
    let matrix = make_toy_dataset(args.size, args.seed);

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match (MatrixFormat::from_path(&args.out)?, args.sparse) {
        (MatrixFormat::Parquet, true) => parquet::save_sparse_matrix(&matrix, &args.out)?,
        (_, true) => {
            log::warn!("--sparse only applies to .parquet output, writing dense");
            storage::save_matrix(&matrix, &args.out)?
        }
        (_, false) => storage::save_matrix(&matrix, &args.out)?,
    }

    info!(
        "  ✓ Wrote {} x {} toy matrix (seed {}) to {}",
        args.size,
        args.size,
        args.seed,
        args.out.display()
    );
    Ok(args.out.clone())
}
