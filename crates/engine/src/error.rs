use beca_core::error::DomainError;

/// Error type for engine operations.
///
/// Wraps [`DomainError`] for rule violations and adds the storage error
/// path. Domain failures are deterministic given the same inputs and
/// state: the operation was rejected before mutation and the store is
/// unchanged.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-rule violation from `beca-core`.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for engine operation return values.
pub type EngineResult<T> = Result<T, EngineError>;
