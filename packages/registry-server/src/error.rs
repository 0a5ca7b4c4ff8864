//! Error taxonomy shared by the keeper, pagination engine and query service.

use provider_registry_core::{Owner, ValidationError};

/// Stable, caller-distinguishable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Cancelled,
    DeadlineExceeded,
    /// Rejected before execution because the server is at capacity.
    Unavailable,
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }
}

/// Errors returned by registry reads and writes.
///
/// Validation failures are raised before any store access. Storage failures
/// are carried verbatim in [`RegistryError::Internal`]; nothing here retries.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("provider not found: {owner}")]
    NotFound { owner: String },
    #[error("provider already exists: {owner}")]
    AlreadyExists { owner: Owner },
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl RegistryError {
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::DeadlineExceeded => ErrorCode::DeadlineExceeded,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<ValidationError> for RegistryError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
