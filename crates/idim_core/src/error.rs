use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdimError>;

/// Errors produced by the estimation pipeline. Parameter and shape errors
/// are fatal; numeric degeneracy (tiny negative eigenvalues) is clamped and
/// logged instead of surfacing here.
#[derive(Debug, Error)]
pub enum IdimError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}

impl IdimError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        IdimError::InvalidParameter(message.into())
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        IdimError::ShapeMismatch(message.into())
    }
}
