//! Predicate trees built from filter clauses
//!
//! A [`Predicate`] is a small AST of comparisons joined by AND. Field names
//! are resolved against the entity's [`EntitySchema`](crate::entity::EntitySchema)
//! and literals are coerced to the field's kind when the tree is built, so
//! evaluation never fails.
//!
//! Coercion rules:
//!
//! | kind     | `=` / `!=`            | `<` `<=` `>` `>=` | contains / starts / ends |
//! |----------|-----------------------|-------------------|--------------------------|
//! | text     | string                | lexicographic     | substring                |
//! | integer  | parsed `i64`          | numeric           | decimal string form      |
//! | float    | parsed `f64`          | numeric           | decimal string form      |
//! | boolean  | `true` / `false`      | unsupported       | unsupported              |
//! | datetime | RFC 3339              | chronological     | unsupported              |
//!
//! A null field value only satisfies `!=`.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

use super::error::QueryError;
use super::filter::{FilterClause, Op};
use crate::entity::{Entity, FieldDef, FieldKind, FieldValue};

/// A single `field op literal` test
pub struct Comparison<T> {
    field: FieldDef<T>,
    op: Op,
    literal: FieldValue,
}

impl<T> Comparison<T> {
    /// The resolved field
    #[must_use]
    pub const fn field(&self) -> &FieldDef<T> {
        &self.field
    }

    /// Registered name of the resolved field
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        self.field.name()
    }

    /// Operator
    #[must_use]
    pub const fn op(&self) -> Op {
        self.op
    }

    /// Coerced literal
    #[must_use]
    pub const fn literal(&self) -> &FieldValue {
        &self.literal
    }

    /// Evaluate against one entity
    pub fn matches(&self, entity: &T) -> bool {
        let value = self.field.get(entity);
        if value.is_null() {
            return self.op == Op::NotEquals;
        }

        match self.op {
            Op::Contains | Op::StartsWith | Op::EndsWith => {
                let (Some(haystack), FieldValue::Text(needle)) = (value.to_text(), &self.literal)
                else {
                    return false;
                };
                match self.op {
                    Op::Contains => haystack.contains(needle.as_str()),
                    Op::StartsWith => haystack.starts_with(needle.as_str()),
                    _ => haystack.ends_with(needle.as_str()),
                }
            }
            Op::Equals => value.compare(&self.literal) == Some(Ordering::Equal),
            Op::NotEquals => value.compare(&self.literal) != Some(Ordering::Equal),
            Op::GreaterThan => value.compare(&self.literal) == Some(Ordering::Greater),
            Op::GreaterThanOrEqual => matches!(
                value.compare(&self.literal),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Op::LessThan => value.compare(&self.literal) == Some(Ordering::Less),
            Op::LessThanOrEqual => matches!(
                value.compare(&self.literal),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

impl<T> Clone for Comparison<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            op: self.op,
            literal: self.literal.clone(),
        }
    }
}

impl<T> PartialEq for Comparison<T> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.op == other.op && self.literal == other.literal
    }
}

impl<T> fmt::Debug for Comparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparison")
            .field("field", &self.field.name())
            .field("op", &self.op)
            .field("literal", &self.literal)
            .finish()
    }
}

impl<T> fmt::Display for Comparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field.name(), self.op, self.literal)
    }
}

/// Boolean test over an entity: comparisons joined by AND
pub enum Predicate<T> {
    /// Leaf comparison
    Comparison(Comparison<T>),
    /// Both sides must hold
    And(Box<Predicate<T>>, Box<Predicate<T>>),
}

impl<T: Entity> Predicate<T> {
    /// Build a single comparison node
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let adults = Predicate::<User>::comparison("age", Op::GreaterThanOrEqual, "18")?;
    /// ```
    pub fn comparison(field_name: &str, op: Op, value: &str) -> Result<Self, QueryError> {
        let schema = T::schema();
        let field = schema
            .resolve(field_name)
            .ok_or_else(|| QueryError::UnknownField {
                entity: schema.name(),
                field: field_name.to_string(),
            })?;
        let literal = coerce_literal(field, op, value)?;

        Ok(Self::Comparison(Comparison {
            field: *field,
            op,
            literal,
        }))
    }
}

impl<T> Predicate<T> {
    /// Conjunction of `self` and `other`
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Evaluate against one entity
    pub fn matches(&self, entity: &T) -> bool {
        match self {
            Self::Comparison(c) => c.matches(entity),
            Self::And(left, right) => left.matches(entity) && right.matches(entity),
        }
    }

    /// Leaf comparisons in left-to-right order
    ///
    /// Stores that translate predicates into their own query language can
    /// treat the result as a flat conjunction.
    #[must_use]
    pub fn comparisons(&self) -> Vec<&Comparison<T>> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison<T>>) {
        match self {
            Self::Comparison(c) => out.push(c),
            Self::And(left, right) => {
                left.collect_comparisons(out);
                right.collect_comparisons(out);
            }
        }
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Comparison(c) => Self::Comparison(c.clone()),
            Self::And(left, right) => Self::And(left.clone(), right.clone()),
        }
    }
}

impl<T> PartialEq for Predicate<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Comparison(a), Self::Comparison(b)) => a == b,
            (Self::And(al, ar), Self::And(bl, br)) => al == bl && ar == br,
            _ => false,
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison(c) => fmt::Debug::fmt(c, f),
            Self::And(left, right) => f.debug_tuple("And").field(left).field(right).finish(),
        }
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison(c) => write!(f, "{}", c),
            Self::And(left, right) => write!(f, "{} AND {}", left, right),
        }
    }
}

/// Fold clauses into one conjunction, left to right
///
/// Returns `Ok(None)` for an empty list, meaning "match everything".
///
/// # Example
///
/// ```rust,ignore
/// let clauses = parse_filter("age_30,name_Bob", Op::Contains)?;
/// let predicate = build_predicate::<User>(&clauses)?.expect("two clauses");
/// assert_eq!(predicate.to_string(), r#"age CONTAINS "30" AND name CONTAINS "Bob""#);
/// ```
pub fn build_predicate<T: Entity>(
    clauses: &[FilterClause],
) -> Result<Option<Predicate<T>>, QueryError> {
    clauses.iter().try_fold(None, |acc: Option<Predicate<T>>, clause| {
        let node = Predicate::comparison(&clause.field_name, clause.operator, &clause.value)?;
        Ok(Some(match acc {
            Some(predicate) => predicate.and(node),
            None => node,
        }))
    })
}

fn coerce_literal<T>(field: &FieldDef<T>, op: Op, raw: &str) -> Result<FieldValue, QueryError> {
    let kind = field.kind();
    let unsupported = || QueryError::UnsupportedOperatorForType {
        field: field.name().to_string(),
        op,
        kind,
    };
    let invalid = || QueryError::InvalidLiteral {
        field: field.name().to_string(),
        kind,
        value: raw.to_string(),
    };

    if op.is_text_match() {
        return match kind {
            FieldKind::Text | FieldKind::Integer | FieldKind::Float => {
                Ok(FieldValue::Text(raw.to_string()))
            }
            FieldKind::Boolean | FieldKind::DateTime => Err(unsupported()),
        };
    }

    match kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| invalid()),
        FieldKind::Float => raw
            .trim()
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|_| invalid()),
        FieldKind::Boolean if op.is_ordering() => Err(unsupported()),
        FieldKind::Boolean => match raw.trim() {
            s if s.eq_ignore_ascii_case("true") => Ok(FieldValue::Boolean(true)),
            s if s.eq_ignore_ascii_case("false") => Ok(FieldValue::Boolean(false)),
            _ => Err(invalid()),
        },
        FieldKind::DateTime => DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc)))
            .map_err(|_| invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::Person;
    use crate::query::filter::parse_filter;
    use chrono::TimeZone;

    fn build(raw: &str, op: Op) -> Result<Option<Predicate<Person>>, QueryError> {
        build_predicate::<Person>(&parse_filter(raw, op)?)
    }

    fn people() -> Vec<Person> {
        vec![
            Person::new("Bob", 30).with_id(1),
            Person::new("Bobby", 130).with_id(2),
            Person::new("Alice", 30).with_id(3),
            Person::new("Bob", 45).with_id(4),
        ]
    }

    fn matching_ids(predicate: &Predicate<Person>) -> Vec<i64> {
        people()
            .iter()
            .filter(|p| predicate.matches(p))
            .map(|p| p.id)
            .collect()
    }

    #[test]
    fn test_empty_clauses_yield_none() {
        assert!(build_predicate::<Person>(&[]).unwrap().is_none());
        assert!(build("", Op::Contains).unwrap().is_none());
    }

    #[test]
    fn test_single_clause_is_comparison_node() {
        let predicate = build("name_Bob", Op::Equals).unwrap().unwrap();
        assert!(matches!(predicate, Predicate::Comparison(_)));
        assert_eq!(matching_ids(&predicate), vec![1, 4]);
    }

    #[test]
    fn test_contains_scenario_on_numeric_and_text() {
        let predicate = build("age_30,name_Bob", Op::Contains).unwrap().unwrap();
        // Bobby's age 130 contains "30" in its string form
        assert_eq!(matching_ids(&predicate), vec![1, 2]);
        assert_eq!(
            predicate.to_string(),
            "age CONTAINS \"30\" AND name CONTAINS \"Bob\""
        );
    }

    #[test]
    fn test_conjunction_is_left_fold_in_source_order() {
        let predicate = build("name_B,age_3,id_1", Op::Contains).unwrap().unwrap();
        let names: Vec<_> = predicate.comparisons().iter().map(|c| c.field_name()).collect();
        assert_eq!(names, ["name", "age", "id"]);
        match &predicate {
            Predicate::And(left, right) => {
                assert!(matches!(**left, Predicate::And(_, _)));
                assert!(matches!(**right, Predicate::Comparison(_)));
            }
            Predicate::Comparison(_) => panic!("expected a conjunction"),
        }
    }

    #[test]
    fn test_conjunction_order_does_not_change_matches() {
        let forward = build("name_Bob,age_30,id_1", Op::Contains).unwrap().unwrap();
        let reverse = build("id_1,age_30,name_Bob", Op::Contains).unwrap().unwrap();
        assert_eq!(matching_ids(&forward), matching_ids(&reverse));
        assert_eq!(matching_ids(&forward), vec![1]);
    }

    #[test]
    fn test_conjunction_equals_independent_comparisons() {
        for raw in ["name_o", "name_o,age_3", "name_o,age_3,id_2", "name_o,age_3,id_2,name_b"] {
            let clauses = parse_filter(raw, Op::Contains).unwrap();
            let combined = build_predicate::<Person>(&clauses).unwrap().unwrap();
            let singles: Vec<Predicate<Person>> = clauses
                .iter()
                .map(|c| Predicate::comparison(&c.field_name, c.operator, &c.value).unwrap())
                .collect();
            for person in people() {
                let expected = singles.iter().all(|p| p.matches(&person));
                assert_eq!(combined.matches(&person), expected, "{raw} on {}", person.name);
            }
        }
    }

    #[test]
    fn test_field_names_resolve_case_insensitively() {
        let predicate = build("NAME_Alice", Op::Equals).unwrap().unwrap();
        assert_eq!(predicate.comparisons()[0].field_name(), "name");
        assert_eq!(matching_ids(&predicate), vec![3]);
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            build("nickname_Bo", Op::Contains),
            Err(QueryError::UnknownField {
                entity: "Person",
                field: "nickname".to_string(),
            })
        );
    }

    #[test]
    fn test_numeric_ordering() {
        let older = build("age_40", Op::GreaterThan).unwrap().unwrap();
        assert_eq!(matching_ids(&older), vec![2, 4]);

        let at_most = build("age_30", Op::LessThanOrEqual).unwrap().unwrap();
        assert_eq!(matching_ids(&at_most), vec![1, 3]);

        let at_least = build("age_45", Op::GreaterThanOrEqual).unwrap().unwrap();
        assert_eq!(matching_ids(&at_least), vec![2, 4]);
    }

    #[test]
    fn test_numeric_equality_is_not_substring() {
        let predicate = build("age_30", Op::Equals).unwrap().unwrap();
        assert_eq!(matching_ids(&predicate), vec![1, 3]);
        let predicate = build("age_30", Op::NotEquals).unwrap().unwrap();
        assert_eq!(matching_ids(&predicate), vec![2, 4]);
    }

    #[test]
    fn test_text_ordering_is_lexicographic() {
        let predicate = build("name_Bob", Op::LessThan).unwrap().unwrap();
        assert_eq!(matching_ids(&predicate), vec![3]);
    }

    #[test]
    fn test_starts_and_ends_with() {
        let starts = build("name_Bo", Op::StartsWith).unwrap().unwrap();
        assert_eq!(matching_ids(&starts), vec![1, 2, 4]);
        let ends = build("name_by", Op::EndsWith).unwrap().unwrap();
        assert_eq!(matching_ids(&ends), vec![2]);
    }

    #[test]
    fn test_text_match_is_case_sensitive() {
        let predicate = build("name_bob", Op::Contains).unwrap().unwrap();
        assert!(matching_ids(&predicate).is_empty());
    }

    #[test]
    fn test_invalid_integer_literal() {
        assert_eq!(
            build("age_thirty", Op::GreaterThan),
            Err(QueryError::InvalidLiteral {
                field: "age".to_string(),
                kind: FieldKind::Integer,
                value: "thirty".to_string(),
            })
        );
    }

    #[test]
    fn test_float_literal() {
        let people = [
            Person::new("A", 1).with_score(2.5),
            Person::new("B", 1).with_score(7.0),
        ];
        let predicate = build("score_3", Op::GreaterThan).unwrap().unwrap();
        assert!(!predicate.matches(&people[0]));
        assert!(predicate.matches(&people[1]));
        assert!(matches!(
            build("score_high", Op::Equals),
            Err(QueryError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_boolean_rules() {
        let active = Person::new("A", 1);
        let inactive = Person::new("B", 1).inactive();

        let predicate = build("active_FALSE", Op::Equals).unwrap().unwrap();
        assert!(!predicate.matches(&active));
        assert!(predicate.matches(&inactive));

        assert!(matches!(
            build("active_yes", Op::Equals),
            Err(QueryError::InvalidLiteral { .. })
        ));
        assert_eq!(
            build("active_true", Op::Contains),
            Err(QueryError::UnsupportedOperatorForType {
                field: "active".to_string(),
                op: Op::Contains,
                kind: FieldKind::Boolean,
            })
        );
        assert!(matches!(
            build("active_true", Op::GreaterThan),
            Err(QueryError::UnsupportedOperatorForType { .. })
        ));
    }

    #[test]
    fn test_datetime_rules() {
        let early = Person::new("A", 1).joined(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap());
        let late = Person::new("B", 1).joined(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

        // RFC 3339 contains no '_' so it fits the filter syntax
        let predicate = build("joined_2024-01-01T00:00:00Z", Op::GreaterThan).unwrap().unwrap();
        assert!(!predicate.matches(&early));
        assert!(predicate.matches(&late));

        assert!(matches!(
            build("joined_yesterday", Op::LessThan),
            Err(QueryError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            build("joined_2024", Op::StartsWith),
            Err(QueryError::UnsupportedOperatorForType { .. })
        ));
    }

    #[test]
    fn test_null_field_only_matches_not_equals() {
        let without = Person::new("A", 1);
        let with = Person::new("B", 1).with_email("b@example.com");

        let contains = build("email_example", Op::Contains).unwrap().unwrap();
        assert!(!contains.matches(&without));
        assert!(contains.matches(&with));

        let not_equals = build("email_x@example.com", Op::NotEquals).unwrap().unwrap();
        assert!(not_equals.matches(&without));
        assert!(not_equals.matches(&with));
    }

    #[test]
    fn test_clone_and_equality() {
        let predicate = build("name_Bob,age_30", Op::Contains).unwrap().unwrap();
        let cloned = predicate.clone();
        assert_eq!(predicate, cloned);
        let other = build("name_Bob,age_31", Op::Contains).unwrap().unwrap();
        assert_ne!(predicate, other);
    }
}
