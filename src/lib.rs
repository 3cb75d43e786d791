//! # polivec
//!
//! Political vector projection: project the word vectors of U.S. senators onto a
//! `conservative - liberal` axis and validate the scalar components against
//! DW-NOMINATE.
//!
//! ## Overview
//!
//! Word vectors trained by word2vec or fastText place antonyms on opposite sides
//! of a semantic direction. Taking `conservative - liberal` as that direction,
//! the scalar projection of a senator's vector onto it is a one-dimensional
//! ideology score that can be compared against roll-call based measures.
//!
//! Core capabilities:
//!
//! - **Vecfile**: `.vec` parsing with header/content shape validation
//! - **Reference**: DW-NOMINATE member CSV loading with missing-score tagging
//! - **Projection**: unit axes from anchor pairs, batched scalar projection
//! - **Stats**: Pearson r and Spearman rho
//! - **Cohort**: per-session evaluation (positional or dictionary join)
//! - **Aggregate**: multi-session runs with robust averaging
//! - **Plot**: sink trait for external scatter-plot renderers
//! - **Queries**: projection of arbitrary entities (policies, talking points)
//! - **Pipeline**: TOML-configured end-to-end runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use polivec::prelude::*;
//!
//! let evaluator = AxisFileEvaluator::new(
//!     PathTemplate::new("./queried_vectors/nyt_97-114/S{}.vec"),
//!     PathTemplate::new("./dw-nominate/S{}_members.csv"),
//!     AxisProjector::cpu(),
//! );
//!
//! let report = Aggregator::new(&evaluator).aggregate(97..115);
//! println!("{}", report);
//! ```
//!
//! ## Feature Flags
//!
//! - `metal`: Apple Metal GPU acceleration
//! - `cuda`: NVIDIA CUDA GPU acceleration

pub mod primitives;
pub mod vecfile;
pub mod reference;
pub mod projection;
pub mod stats;
pub mod cohort;
pub mod aggregate;
pub mod queries;
pub mod plot;
pub mod config;
pub mod pipeline;

use std::path::PathBuf;

// Re-export candle types for convenience
pub use candle_core::{Device, Tensor};

/// Error types for projection pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PolivecError {
    #[error("Parse error in {}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Degenerate axis: '{positive}' and '{negative}' have identical vectors")]
    DegenerateAxis { positive: String, negative: String },

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Axis word '{0}' not found in vector dictionary")]
    MissingAnchor(String),

    #[error("S{cohort}: {vectors} vectors cannot be aligned with {references} reference records")]
    JoinLengthMismatch {
        cohort: u32,
        vectors: usize,
        references: usize,
    },

    #[error("S{cohort}: correlation undefined over {samples} paired samples")]
    UndefinedCorrelation { cohort: u32, samples: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Tensor operation failed: {0}")]
    Tensor(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),
}

impl PolivecError {
    /// Build a parse error for a file location
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Attach the file being read to an IO error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PolivecError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Device, Tensor};
    pub use crate::{PolivecError, Result};

    // Primitives
    pub use crate::primitives::{best_device, cpu_device, gpu_disabled};

    // Vector files
    pub use crate::vecfile::{
        read_as_mapping, read_plain, read_with_axes,
        AxisAnchors, AxisVectorFile, EmbeddingMatrix, ShapeReport, VectorDictionary, VectorFile,
    };

    // Reference scores
    pub use crate::reference::{load as load_reference, normalize_name, ReferenceScores};

    // Projection
    pub use crate::projection::{AxisProjector, Projection, UnitAxis};

    // Statistics
    pub use crate::stats::{pearson, spearman, Correlation};

    // Cohorts
    pub use crate::cohort::{
        AxisFileEvaluator, CohortEvaluator, CohortId, CohortPoint, CohortResult,
        DictionaryEvaluator,
    };

    // Aggregation
    pub use crate::aggregate::{AggregateReport, Aggregator, CohortOutcome, CohortRun};

    // Queries, plotting, configuration
    pub use crate::queries::{project_queries, read_queries};
    pub use crate::plot::{LogSink, PlotSink, ScatterPlot};
    pub use crate::config::{AxisWords, PathTemplate, PipelineConfig};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let device = cpu_device();
        assert!(matches!(device, Device::Cpu));
    }

    #[test]
    fn test_parse_error_display() {
        let err = PolivecError::parse("corpus_S97.vec", 12, "non-numeric component 'abc'");
        let msg = err.to_string();
        assert!(msg.contains("corpus_S97.vec:12"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_read_error_names_file() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let msg = PolivecError::read("dw-nominate/S97_members.csv", source).to_string();
        assert!(msg.contains("dw-nominate/S97_members.csv"));
        assert!(msg.contains("gone"));
    }
}
