//! Service error types
//!
//! [`ServiceError`] is what callers of [`CrudService`](super::CrudService) see.
//! Query construction failures become `BadRequest`; repository failures are
//! mapped by kind, and internal details are replaced with a generic message.
//!
//! # Example
//!
//! ```rust
//! use crud_scaffold::service::{ServiceError, ServiceErrorKind, ServiceOperation};
//!
//! let error = ServiceError::not_found(ServiceOperation::Save, "User", 7);
//! assert_eq!(error.kind, ServiceErrorKind::NotFound);
//! assert_eq!(error.kind.error_code(), "NOT_FOUND");
//! ```

use std::fmt;

use crate::events::EventError;
use crate::query::QueryError;
use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

/// Service call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceOperation {
    /// Loading one entity
    Get,
    /// Loading a page of entities
    GetPage,
    /// Creating or updating an entity
    Save,
    /// Removing an entity
    Delete,
}

impl fmt::Display for ServiceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::GetPage => write!(f, "get_page"),
            Self::Save => write!(f, "save"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of service error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceErrorKind {
    /// Entity was not found
    NotFound,
    /// Input entity is not acceptable
    ValidationFailed,
    /// Malformed filter, unknown field, or unsupported operator
    BadRequest,
    /// Write conflicts with stored state
    Conflict,
    /// Unexpected failure
    InternalError,
    /// Backing store is temporarily unreachable
    ServiceUnavailable,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

impl ServiceErrorKind {
    /// Machine-readable code, e.g. `BAD_REQUEST`
    #[must_use]
    pub fn error_code(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Structured service error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// The operation being performed when the error occurred
    pub operation: ServiceOperation,
    /// The category of error
    pub kind: ServiceErrorKind,
    /// Message safe to show to the caller
    pub message: String,
    /// Entity type name
    pub entity_type: Option<String>,
    /// Entity id, rendered as text
    pub entity_id: Option<String>,
}

impl ServiceError {
    pub fn new(
        operation: ServiceOperation,
        kind: ServiceErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    pub fn not_found(operation: ServiceOperation, entity_type: &str, entity_id: i64) -> Self {
        Self::new(operation, ServiceErrorKind::NotFound, "Entity not found")
            .with_entity(entity_type, entity_id.to_string())
    }

    pub fn validation_failed(operation: ServiceOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ServiceErrorKind::ValidationFailed, message)
    }

    pub fn bad_request(operation: ServiceOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ServiceErrorKind::BadRequest, message)
    }

    pub fn internal(operation: ServiceOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ServiceErrorKind::InternalError, message)
    }

    /// Attach entity context
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Attach the entity type only
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Replace the failing operation
    #[must_use]
    pub fn with_operation(mut self, operation: ServiceOperation) -> Self {
        self.operation = operation;
        self
    }

    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, ServiceErrorKind::ServiceUnavailable)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Service {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        match (&self.entity_type, &self.entity_id) {
            (Some(entity_type), Some(entity_id)) => write!(f, " [{}: {}]", entity_type, entity_id),
            (Some(entity_type), None) => write!(f, " [{}]", entity_type),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for ServiceError {}

fn service_operation(op: RepositoryOperation) -> ServiceOperation {
    match op {
        RepositoryOperation::FindById => ServiceOperation::Get,
        RepositoryOperation::FindBySpec | RepositoryOperation::Count => ServiceOperation::GetPage,
        RepositoryOperation::Create | RepositoryOperation::Update => ServiceOperation::Save,
        RepositoryOperation::Delete => ServiceOperation::Delete,
    }
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        Self::bad_request(ServiceOperation::GetPage, err.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        let kind = match err.kind {
            RepositoryErrorKind::NotFound => ServiceErrorKind::NotFound,
            RepositoryErrorKind::AlreadyExists | RepositoryErrorKind::ConstraintViolation => {
                ServiceErrorKind::Conflict
            }
            RepositoryErrorKind::ValidationFailed => ServiceErrorKind::ValidationFailed,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout => {
                ServiceErrorKind::ServiceUnavailable
            }
            RepositoryErrorKind::DatabaseError | RepositoryErrorKind::Other => {
                ServiceErrorKind::InternalError
            }
        };

        let message = match kind {
            ServiceErrorKind::ServiceUnavailable => "Service temporarily unavailable".to_string(),
            ServiceErrorKind::InternalError => "An internal error occurred".to_string(),
            _ => err.message,
        };

        Self {
            operation: service_operation(err.operation),
            kind,
            message,
            entity_type: err.entity_type,
            entity_id: err.entity_id,
        }
    }
}

impl From<EventError> for ServiceError {
    fn from(err: EventError) -> Self {
        Self::internal(ServiceOperation::Save, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldKind;
    use crate::query::Op;

    #[test]
    fn test_display() {
        let error = ServiceError::not_found(ServiceOperation::Get, "Person", 3);
        assert_eq!(
            error.to_string(),
            "Service not_found error during get: Entity not found [Person: 3]"
        );

        let error = ServiceError::bad_request(ServiceOperation::GetPage, "bad")
            .with_entity_type("Person");
        assert_eq!(
            error.to_string(),
            "Service bad_request error during get_page: bad [Person]"
        );
    }

    #[test]
    fn test_error_code() {
        assert_eq!(ServiceErrorKind::BadRequest.error_code(), "BAD_REQUEST");
        assert_eq!(
            ServiceErrorKind::ServiceUnavailable.error_code(),
            "SERVICE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_from_query_error_is_bad_request() {
        let err: ServiceError = QueryError::UnsupportedOperatorForType {
            field: "active".to_string(),
            op: Op::Contains,
            kind: FieldKind::Boolean,
        }
        .into();
        assert_eq!(err.kind, ServiceErrorKind::BadRequest);
        assert_eq!(err.operation, ServiceOperation::GetPage);
        assert!(err.message.contains("CONTAINS"));
    }

    #[test]
    fn test_from_repository_error_maps_kind_and_operation() {
        let cases = [
            (RepositoryErrorKind::NotFound, ServiceErrorKind::NotFound),
            (RepositoryErrorKind::AlreadyExists, ServiceErrorKind::Conflict),
            (RepositoryErrorKind::ConstraintViolation, ServiceErrorKind::Conflict),
            (RepositoryErrorKind::ValidationFailed, ServiceErrorKind::ValidationFailed),
            (RepositoryErrorKind::ConnectionFailed, ServiceErrorKind::ServiceUnavailable),
            (RepositoryErrorKind::Timeout, ServiceErrorKind::ServiceUnavailable),
            (RepositoryErrorKind::DatabaseError, ServiceErrorKind::InternalError),
            (RepositoryErrorKind::Other, ServiceErrorKind::InternalError),
        ];
        for (repo_kind, expected) in cases {
            let err: ServiceError =
                RepositoryError::new(RepositoryOperation::Update, repo_kind, "detail").into();
            assert_eq!(err.kind, expected, "{repo_kind}");
            assert_eq!(err.operation, ServiceOperation::Save);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: ServiceError = RepositoryError::database_error(
            RepositoryOperation::FindBySpec,
            "syntax error near SELECT",
        )
        .into();
        assert_eq!(err.message, "An internal error occurred");
        assert_eq!(err.operation, ServiceOperation::GetPage);

        let err: ServiceError =
            RepositoryError::not_found(RepositoryOperation::Delete, "Person", 4).into();
        assert_eq!(err.message, "Entity not found");
        assert_eq!(err.entity_id.as_deref(), Some("4"));
    }

    #[test]
    fn test_from_event_error() {
        let err: ServiceError = EventError::Unavailable("bus down".to_string()).into();
        assert_eq!(err.kind, ServiceErrorKind::InternalError);
        assert!(err.message.contains("bus down"));
    }

    #[test]
    fn test_is_retriable() {
        assert!(ServiceError::new(
            ServiceOperation::Get,
            ServiceErrorKind::ServiceUnavailable,
            "down"
        )
        .is_retriable());
        assert!(!ServiceError::internal(ServiceOperation::Get, "x").is_retriable());
    }
}
