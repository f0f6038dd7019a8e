//! Filter string parsing
//!
//! A filter string is a comma-separated list of `<field>_<value>` tokens. The
//! comparison operator is not part of the syntax: the caller supplies one and
//! it applies to every clause.
//!
//! # Example
//!
//! ```rust
//! use crud_scaffold::query::{parse_filter, FilterClause, Op};
//!
//! let clauses = parse_filter("age_30,name_Bob", Op::Contains).unwrap();
//! assert_eq!(
//!     clauses,
//!     vec![
//!         FilterClause::new("age", Op::Contains, "30"),
//!         FilterClause::new("name", Op::Contains, "Bob"),
//!     ]
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::QueryError;

/// Separator between clauses in a filter string
pub const CLAUSE_SEPARATOR: char = ',';

/// Separator between field name and value inside a clause
pub const FILTER_DELIMITER: char = '_';

/// Comparison operator of a filter clause
///
/// # Example
///
/// ```rust
/// use crud_scaffold::query::Op;
///
/// assert_eq!(format!("{}", Op::GreaterThanOrEqual), ">=");
/// assert!(Op::StartsWith.is_text_match());
/// assert!(Op::LessThan.is_ordering());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Equal to (=)
    Equals,
    /// Not equal to (!=)
    NotEquals,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
    /// Substring match
    Contains,
    /// Prefix match
    StartsWith,
    /// Suffix match
    EndsWith,
}

impl Op {
    /// Every operator, in declaration order
    pub const ALL: [Op; 9] = [
        Op::Equals,
        Op::NotEquals,
        Op::GreaterThan,
        Op::GreaterThanOrEqual,
        Op::LessThan,
        Op::LessThanOrEqual,
        Op::Contains,
        Op::StartsWith,
        Op::EndsWith,
    ];

    /// `>`, `>=`, `<`, `<=`
    #[must_use]
    pub const fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterThanOrEqual | Self::LessThan | Self::LessThanOrEqual
        )
    }

    /// Contains, StartsWith, EndsWith
    #[must_use]
    pub const fn is_text_match(&self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals => write!(f, "="),
            Self::NotEquals => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::Contains => write!(f, "CONTAINS"),
            Self::StartsWith => write!(f, "STARTS WITH"),
            Self::EndsWith => write!(f, "ENDS WITH"),
        }
    }
}

/// One `field op value` comparison parsed from a filter string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    /// Field name as written by the caller
    pub field_name: String,
    /// Comparison operator
    pub operator: Op,
    /// Raw literal
    pub value: String,
}

impl FilterClause {
    /// Create a clause
    pub fn new(field_name: impl Into<String>, operator: Op, value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Parse a filter string into clauses that all use `operation`
///
/// Empty or whitespace-only input yields no clauses. Every token must contain
/// exactly one [`FILTER_DELIMITER`] with a non-empty field name before it;
/// anything else fails with [`QueryError::InvalidFilterFormat`]. Tokens are
/// not trimmed.
pub fn parse_filter(raw: &str, operation: Op) -> Result<Vec<FilterClause>, QueryError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split(CLAUSE_SEPARATOR)
        .map(|token| parse_clause(token, operation))
        .collect()
}

fn parse_clause(token: &str, operation: Op) -> Result<FilterClause, QueryError> {
    let mut parts = token.split(FILTER_DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(value), None) if !field.is_empty() => {
            Ok(FilterClause::new(field, operation, value))
        }
        _ => Err(QueryError::InvalidFilterFormat {
            token: token.to_string(),
        }),
    }
}
