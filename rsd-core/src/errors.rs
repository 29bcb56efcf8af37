use thiserror::Error;

/// Error type for invalid operations on a model instance.
///
/// Every variant indicates a caller or model-definition error rather than a
/// transient condition; the core never retries or silently recovers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RsdError {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("unresolved dependency cycle: {}", .0.join(" -> "))]
    UnresolvedCycle(Vec<String>),
    #[error("invalid initial condition '{0}', expected 'original', 'current' or an explicit (time, state) pair")]
    InvalidInitialCondition(String),
    #[error("incomplete state, missing stocks: {}", .0.join(", "))]
    IncompleteState(Vec<String>),
    #[error("invalid override: {0}")]
    InvalidOverride(String),
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid return timestamps: {0}")]
    InvalidTimestamps(String),
}

/// Convenience type for `Result<T, RsdError>`.
pub type RsdResult<T> = Result<T, RsdError>;
