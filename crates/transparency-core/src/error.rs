//! Error taxonomy shared by the engine, the stores and the service facade.
//!
//! Callers branch on the variant rather than on message text: validation and
//! not-found errors are the caller's to fix, internal errors are not.

use std::fmt;

use thiserror::Error;

/// The kind of entity a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Member,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Member => write!(f, "member"),
        }
    }
}

/// Errors raised by the transparency core and its stores.
#[derive(Debug, Error)]
pub enum TransparencyError {
    /// Malformed or out-of-range input (bad score, empty field, unknown role).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A project or member id did not resolve.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: u64 },

    /// Store unavailable or a broken invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TransparencyError {
    pub fn validation(message: impl Into<String>) -> Self {
        TransparencyError::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TransparencyError::Internal(message.into())
    }

    pub fn project_not_found(id: impl Into<u64>) -> Self {
        TransparencyError::NotFound {
            kind: EntityKind::Project,
            id: id.into(),
        }
    }

    pub fn member_not_found(id: impl Into<u64>) -> Self {
        TransparencyError::NotFound {
            kind: EntityKind::Member,
            id: id.into(),
        }
    }

    /// Returns `true` if the caller can recover by correcting its input.
    ///
    /// None of the variants are retried automatically.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TransparencyError::Validation(_) | TransparencyError::NotFound { .. }
        )
    }

    /// HTTP-style status for transports that wrap the core.
    pub fn status_code(&self) -> u16 {
        match self {
            TransparencyError::Validation(_) => 422,
            TransparencyError::NotFound { .. } => 404,
            TransparencyError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransparencyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_entity() {
        let err = TransparencyError::member_not_found(7u64);
        assert_eq!(err.to_string(), "member not found: 7");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn classification() {
        assert!(TransparencyError::validation("bad").is_client_error());
        assert!(TransparencyError::project_not_found(1u64).is_client_error());
        assert!(!TransparencyError::internal("disk gone").is_client_error());
        assert_eq!(TransparencyError::internal("x").status_code(), 500);
    }
}
