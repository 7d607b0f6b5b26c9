use thiserror::Error;

/// Top-level error type for the path graph kernel.
#[derive(Debug, Error)]
pub enum PathgraphError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to the input geometry itself.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("non-finite coordinate ({x}, {y}) in input path")]
    NonFinite { x: f64, y: f64 },
}

/// Failures of the sweep-line normalization.
///
/// These abort the one operation that hit them; sibling operations are
/// unaffected.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("sweep event queue exhausted its capacity of {capacity} events")]
    CapacityExhausted { capacity: usize },

    #[error("sweep did not reach a stable arrangement after {passes} passes")]
    Unstable { passes: usize },

    #[error("operation cancelled")]
    Cancelled,
}

/// Errors related to kernel operations and their parameters.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("graph builder is {found}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0} not found in graph")]
    EntityNotFound(&'static str),

    #[error("unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`PathgraphError`].
pub type Result<T> = std::result::Result<T, PathgraphError>;
