use thiserror::Error;

/// Errors returned by faceid operations.
#[derive(Debug, Error)]
pub enum FaceIdError {
    /// Malformed or wrong-length descriptor, or an invalid identifier.
    /// Always raised before anything is written.
    #[error("validation: {0}")]
    Validation(String),

    /// The referenced person does not exist.
    #[error("person not found: {0}")]
    NotFound(String),

    /// A stored descriptor's length differs from the probe's. Signals a
    /// deployment configuration problem (mixed descriptor lengths), not a
    /// "no match" outcome.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The persistence collaborator failed. Propagated unchanged; the core
    /// performs no retries.
    #[error("store error: {0}")]
    Store(String),
}
