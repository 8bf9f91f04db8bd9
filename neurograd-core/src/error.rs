use thiserror::Error;

/// Custom error type for the neurograd engine and the modules built on it.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum NeurogradError {
    #[error("Dimension mismatch: expected {expected}, got {actual} during operation {operation}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Invalid exponent in {operation}: only constant real exponents are supported")]
    InvalidExponent { operation: String },

    #[error("Values from different graphs cannot be combined in {operation}")]
    GraphMismatch { operation: String },

    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
