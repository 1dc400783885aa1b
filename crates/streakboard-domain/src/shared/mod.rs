use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::freeze::FreezePrecondition;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(UserId);
define_id!(BatchId);
define_id!(StreakTierId);
define_id!(ActivityId);
define_id!(FreezeId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    NotFound = 2001,

    // Business Logic (3xxx)
    PreconditionFailed = 3001,
    AlreadyInState = 3002,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    InvalidState = 4003,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,

    // Validation (6xxx)
    ValidationError = 6001,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::NotFound | ErrorCode::ValidationError => ErrorSeverity::Info,

            ErrorCode::PreconditionFailed | ErrorCode::AlreadyInState => ErrorSeverity::Warning,

            ErrorCode::RepositoryError
            | ErrorCode::InvalidState
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::InfrastructureError | ErrorCode::RepositoryError
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(FreezePrecondition),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Already in state: {0}")]
    AlreadyInState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::NotFound(_) => ErrorCode::NotFound,
            DomainError::PreconditionFailed(_) => ErrorCode::PreconditionFailed,
            DomainError::InvalidState(_) => ErrorCode::InvalidState,
            DomainError::AlreadyInState(_) => ErrorCode::AlreadyInState,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
        }
    }

    /// Get error message
    pub fn message(&self) -> String {
        match self {
            DomainError::PreconditionFailed(precondition) => precondition.to_string(),
            DomainError::NotFound(msg)
            | DomainError::InvalidState(msg)
            | DomainError::AlreadyInState(msg)
            | DomainError::Validation(msg)
            | DomainError::Repository(msg)
            | DomainError::Infrastructure(msg) => msg.clone(),
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(DomainError::NotFound("u1".into()).code().code(), 2001);
        assert_eq!(
            DomainError::AlreadyInState("frozen".into()).code().code(),
            3002
        );
        assert_eq!(DomainError::InvalidState("zero".into()).code().code(), 4003);
    }

    #[test]
    fn test_precondition_message_names_the_rule() {
        let err = DomainError::PreconditionFailed(FreezePrecondition::InsufficientStreak {
            required: 7,
            actual: 3,
        });

        assert!(err.message().contains("7"));
        assert!(err.message().contains("3"));
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert!(err.format_with_code().starts_with("[3001]"));
    }

    #[test]
    fn test_ids_round_trip_through_strings() {
        let id = UserId::from_string("student-42");
        assert_eq!(id.as_str(), "student-42");
        assert_eq!(id.to_string(), "student-42");
        assert_ne!(UserId::new(), UserId::new());
    }
}
