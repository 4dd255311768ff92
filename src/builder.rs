//! DownSelector builder and typed configuration export.
//!
//! The builder collects the knobs of a selection run (set size, benchmark
//! reporting, output directory) and hands back a [`DownSelector`] that owns
//! the matrix. `builder_config_typed` exports the same knobs as a
//! `ConfigValue` map so state snapshots keep type information.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use downselect_core::{DEFAULT_N, DissimilarityMatrix, MIN_SET_SIZE};

use crate::core::DownSelector;

/// Directory results and reports are written to unless told otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "SDS";

#[derive(Debug, Clone, PartialEq)]
pub struct DownSelectBuilder {
    /// Requested set size, clamped at preflight
    pub(crate) n: usize,
    /// Sum the selected submatrix after the search
    pub(crate) benchmark: bool,
    pub(crate) output_dir: PathBuf,
}

impl Default for DownSelectBuilder {
    fn default() -> Self {
        debug!("Creating DownSelectBuilder with default parameters");
        Self {
            n: DEFAULT_N,
            benchmark: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl DownSelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of maximally dissimilar items to select.
    pub fn with_n(mut self, n: usize) -> Self {
        info!("Setting requested set size: n = {}", n);
        if n < MIN_SET_SIZE {
            warn!(
                "n = {} is below the minimum of {}; the selection will fail at preflight",
                n, MIN_SET_SIZE
            );
        }
        self.n = n;
        self
    }

    pub fn with_benchmark(mut self, benchmark: bool) -> Self {
        info!("Setting benchmark: {}", benchmark);
        self.benchmark = benchmark;
        self
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        info!("Setting output directory: {}", dir.display());
        self.output_dir = dir;
        self
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn benchmark(&self) -> bool {
        self.benchmark
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Hand the matrix to a new selector carrying this configuration.
    pub fn build(self, matrix: DissimilarityMatrix) -> DownSelector {
        let (rows, cols) = matrix.dim();
        info!(
            "Building DownSelector over a {} x {} matrix (n = {}, benchmark = {})",
            rows, cols, self.n, self.benchmark
        );
        DownSelector::from_builder(self, matrix)
    }

    /// Rebuild from an exported configuration; missing keys keep defaults.
    pub fn from_config(config: &HashMap<String, ConfigValue>) -> Self {
        let mut builder = Self::default();
        if let Some(n) = config.get("n").and_then(ConfigValue::as_usize) {
            builder.n = n;
        }
        if let Some(b) = config.get("benchmark").and_then(ConfigValue::as_bool) {
            builder.benchmark = b;
        }
        if let Some(dir) = config.get("output_dir").and_then(ConfigValue::as_str) {
            builder.output_dir = PathBuf::from(dir);
        }
        builder
    }

    pub fn builder_config_typed(&self) -> HashMap<String, ConfigValue> {
        let mut config = HashMap::new();

        config.insert("n".to_string(), ConfigValue::Usize(self.n));
        config.insert("benchmark".to_string(), ConfigValue::Bool(self.benchmark));
        config.insert(
            "output_dir".to_string(),
            ConfigValue::String(self.output_dir.display().to_string()),
        );

        config
    }
}

/// Configuration value that can hold different types while preserving type information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigValue {
    Bool(bool),
    Usize(usize),
    String(String),
    OptionUsize(Option<usize>),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ConfigValue::Usize(v) => Some(*v),
            ConfigValue::OptionUsize(v) => *v,
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{}", v),
            ConfigValue::Usize(v) => write!(f, "{}", v),
            ConfigValue::String(v) => write!(f, "{}", v),
            ConfigValue::OptionUsize(opt) => match opt {
                Some(v) => write!(f, "{}", v),
                None => write!(f, "None"),
            },
        }
    }
}

impl fmt::Display for DownSelectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DownSelectBuilder {{ n: {}, benchmark: {}, output_dir: {} }}",
            self.n,
            self.benchmark,
            self.output_dir.display()
        )
    }
}
