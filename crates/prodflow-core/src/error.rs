use thiserror::Error;

use crate::store::StoreError;

/// Stable machine-readable error classification exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    InvalidState,
    Forbidden,
    AlreadyProcessed,
    InvalidInput,
    IncompletePrerequisite,
    Internal,
}

impl ErrorCode {
    /// Wire-stable code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidState => "INVALID_STATE",
            Self::Forbidden => "FORBIDDEN",
            Self::AlreadyProcessed => "ALREADY_PROCESSED",
            Self::InvalidInput => "INVALID_INPUT",
            Self::IncompletePrerequisite => "INCOMPLETE_PREREQUISITE",
            Self::Internal => "INTERNAL",
        }
    }
}

/// Domain error returned by the engines.
///
/// Every validation failure is detected before any write begins; once a
/// write is underway the only remaining failure mode is `Store`, which
/// rolls back in full at the store layer.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("already processed: {0}")]
    AlreadyProcessed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("incomplete prerequisite: {0}")]
    IncompletePrerequisite(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::Forbidden(_) => ErrorCode::Forbidden,
            Self::AlreadyProcessed(_) => ErrorCode::AlreadyProcessed,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::IncompletePrerequisite(_) => ErrorCode::IncompletePrerequisite,
            Self::Store(_) => ErrorCode::Internal,
        }
    }
}
