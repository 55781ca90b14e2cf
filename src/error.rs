//! Error types for corral.

use std::fmt;

/// Errors that can occur during clustering operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Invalid parameter value.
    InvalidParameter(String),
    /// Dimension mismatch between input samples and centers.
    DimensionMismatch { input_dim: usize, center_dim: usize },
    /// Resume-mode fit called without previously supplied centers.
    MissingCenters,
    /// Predict called before any fit or `set_centers`.
    NoCenters,
    /// Zero-norm vector encountered during normalization.
    DegenerateVector { index: usize },
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterError::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            ClusterError::DimensionMismatch {
                input_dim,
                center_dim,
            } => write!(
                f,
                "Dimension mismatch: input has {input_dim} dimensions, centers have {center_dim}",
            ),
            ClusterError::MissingCenters => write!(
                f,
                "No centers supplied: call set_centers before fit_with_centers"
            ),
            ClusterError::NoCenters => write!(
                f,
                "No centers available: fit or set_centers must be called first"
            ),
            ClusterError::DegenerateVector { index } => write!(
                f,
                "Degenerate vector at row {index}: zero norm cannot be normalized"
            ),
        }
    }
}

impl std::error::Error for ClusterError {}

pub type Result<T> = std::result::Result<T, ClusterError>;
