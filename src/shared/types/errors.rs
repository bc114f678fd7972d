use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A multi-record unit of work could not be completed and the
    /// store may need reconciliation.
    #[error("Fatal: {0}")]
    Fatal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, value: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            field: "id",
            value: value.to_string(),
        }
    }

    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Database(_))
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Database(e) => DomainError::Database(e.to_string()),
            other => DomainError::Fatal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DomainError::not_found("Booking", "abc");
        assert_eq!(err.to_string(), "Not found: Booking with id=abc");
    }

    #[test]
    fn test_only_database_errors_are_transient() {
        assert!(DomainError::Database("locked".into()).is_transient());
        assert!(!DomainError::Conflict("taken".into()).is_transient());
        assert!(!DomainError::Fatal("half written".into()).is_transient());
    }

    #[test]
    fn test_infra_error_conversion() {
        let db: DomainError = InfraError::Database(sea_orm::DbErr::Custom("gone".into())).into();
        assert!(matches!(db, DomainError::Database(_)));

        let crypto: DomainError = InfraError::Crypto("bad hash".into()).into();
        assert!(matches!(crypto, DomainError::Fatal(_)));
    }
}
