use serde::{Deserialize, Serialize};
use streakboard_domain::freeze::FreezePrecondition;
use streakboard_domain::shared::{DomainError, ErrorCode, ErrorSeverity};

/// Structured error returned to callers of the engine
///
/// Carries:
/// - Error code for programmatic handling
/// - Human-readable message
/// - Severity level
/// - Recoverability flag for retry logic
/// - The violated freeze rule, when there is one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandError {
    /// Numeric error code (2xxx-6xxx range)
    pub code: u16,

    /// Human-readable error message
    pub message: String,

    /// Error severity level
    pub severity: ErrorSeverity,

    /// Whether the operation can be retried
    pub recoverable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precondition: Option<FreezePrecondition>,
}

impl CommandError {
    /// Create an error from an error code and message
    pub fn from_code(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: error_code.code(),
            message: message.into(),
            severity: error_code.severity(),
            recoverable: error_code.is_recoverable(),
            precondition: None,
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::InfrastructureError, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::ValidationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::NotFound, message)
    }
}

impl From<DomainError> for CommandError {
    fn from(err: DomainError) -> Self {
        let precondition = match &err {
            DomainError::PreconditionFailed(rule) => Some(rule.clone()),
            _ => None,
        };
        Self {
            code: err.code().code(),
            message: err.message(),
            severity: err.severity(),
            recoverable: err.is_recoverable(),
            precondition,
        }
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        Self::infrastructure(err.to_string())
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_from_domain_error() {
        let domain_err = DomainError::NotFound("Streak record for user u1".to_string());
        let cmd_err: CommandError = domain_err.into();

        assert_eq!(cmd_err.code, 2001);
        assert_eq!(cmd_err.message, "Streak record for user u1");
        assert_eq!(cmd_err.severity, ErrorSeverity::Info);
        assert!(!cmd_err.recoverable);
        assert!(cmd_err.precondition.is_none());
    }

    #[test]
    fn test_precondition_is_carried() {
        let domain_err = DomainError::PreconditionFailed(FreezePrecondition::InsufficientStreak {
            required: 7,
            actual: 3,
        });
        let cmd_err: CommandError = domain_err.into();

        assert_eq!(cmd_err.code, 3001);
        assert_eq!(cmd_err.severity, ErrorSeverity::Warning);
        assert_eq!(
            cmd_err.precondition,
            Some(FreezePrecondition::InsufficientStreak {
                required: 7,
                actual: 3
            })
        );

        let json = serde_json::to_value(&cmd_err).unwrap();
        assert_eq!(json["precondition"]["rule"], "insufficient_streak");
    }

    #[test]
    fn test_display_includes_code() {
        let cmd_err = CommandError::validation("limit must be positive");
        assert_eq!(cmd_err.to_string(), "[6001] limit must be positive");
    }
}
