use std::path::PathBuf;

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Errors produced by the matrix library, the network and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum NnError {
    /// Two operands of a matrix operation have incompatible shapes.
    #[error("dimension mismatch in {operation}: {}x{} vs {}x{}", left.0, left.1, right.0, right.1)]
    DimensionMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("index ({row}, {col}) is out of bounds for a {rows}x{cols} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("label {label} is outside the output range [0, {outputs})")]
    LabelOutOfRange { label: usize, outputs: usize },

    /// A dataset or parameter file is missing or malformed.
    #[error("I/O error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// The network was used out of order or has an unusable structure.
    #[error("invalid architecture: {0}")]
    Architecture(String),
}

impl NnError {
    pub(crate) fn mismatch(
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        NnError::DimensionMismatch {
            operation,
            left,
            right,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        NnError::Io {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
