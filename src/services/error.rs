use thiserror::Error;

use crate::database::DatabaseError;

/// Errors surfaced by the service layer. `Validation` and `NotFound` carry
/// messages that are safe to return to callers verbatim.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(DatabaseError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(message) => ServiceError::NotFound(message),
            DatabaseError::Invalid(message) => ServiceError::Validation(message),
            other => ServiceError::Storage(other),
        }
    }
}

/// Rejects a value that is empty once surrounding whitespace is removed.
pub(crate) fn require_non_blank(value: &str, message: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_rule_violations_keep_their_meaning() {
        let err: ServiceError = DatabaseError::not_found("folder not found").into();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "folder not found"));

        let err: ServiceError = DatabaseError::invalid("would create a cycle").into();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "would create a cycle"));

        let err: ServiceError = DatabaseError::InvalidDatabaseUrl.into();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(require_non_blank("  \t", "empty").is_err());
        assert!(require_non_blank(" x ", "empty").is_ok());
    }
}
