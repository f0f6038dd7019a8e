//! Crate-level error type for configuration and setup

use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring the scaffolding (config loading, tracing setup)
///
/// Query, repository, and service failures have their own structured types:
/// [`QueryError`](crate::query::QueryError),
/// [`RepositoryError`](crate::repository::RepositoryError) and
/// [`ServiceError`](crate::service::ServiceError).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figment_error_is_boxed() {
        let err: Error = figment::Error::from("missing field `name`".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_internal_display() {
        let err = Error::Internal("Invalid config path".to_string());
        assert_eq!(err.to_string(), "Internal error: Invalid config path");
    }
}
