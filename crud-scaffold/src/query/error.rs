//! Errors raised while building queries

use thiserror::Error;

use super::filter::Op;
use crate::entity::FieldKind;

/// Construction-time failure of a filter, predicate, or sort selector
///
/// These are returned to the immediate caller and never converted into an
/// always-true predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A filter token does not split into exactly a field name and a value
    #[error("Invalid filter format: {token:?} must be <field>_<value>")]
    InvalidFilterFormat {
        /// The offending comma-separated token
        token: String,
    },

    /// The named field is not registered on the entity type
    #[error("Unknown field {field:?} on {entity}")]
    UnknownField {
        /// Entity type name
        entity: &'static str,
        /// Requested field name
        field: String,
    },

    /// The operator cannot be applied to a field of this kind
    #[error("Operator {op} is not supported for {kind} field {field:?}")]
    UnsupportedOperatorForType {
        /// Resolved field name
        field: String,
        /// Requested operator
        op: Op,
        /// Declared field kind
        kind: FieldKind,
    },

    /// The literal cannot be coerced to the field's kind
    #[error("Value {value:?} is not a valid {kind} for field {field:?}")]
    InvalidLiteral {
        /// Resolved field name
        field: String,
        /// Declared field kind
        kind: FieldKind,
        /// Raw literal from the filter
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = QueryError::InvalidFilterFormat {
            token: "onlyonepart".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid filter format: \"onlyonepart\" must be <field>_<value>"
        );

        let err = QueryError::UnknownField {
            entity: "User",
            field: "Unknown".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown field \"Unknown\" on User");

        let err = QueryError::UnsupportedOperatorForType {
            field: "active".to_string(),
            op: Op::Contains,
            kind: FieldKind::Boolean,
        };
        assert_eq!(
            err.to_string(),
            "Operator CONTAINS is not supported for boolean field \"active\""
        );
    }
}
