//! Sort key selectors

use std::cmp::Ordering;
use std::fmt;

use super::error::QueryError;
use crate::entity::{Entity, FieldDef, FieldKind, FieldValue};

/// Projection from an entity to the value it is ordered by
pub struct SortSelector<T> {
    field: FieldDef<T>,
}

impl<T: Entity> SortSelector<T> {
    /// Resolve a field by name, case-insensitively
    pub fn for_field(field_name: &str) -> Result<Self, QueryError> {
        let schema = T::schema();
        schema
            .resolve(field_name)
            .map(|field| Self { field: *field })
            .ok_or_else(|| QueryError::UnknownField {
                entity: schema.name(),
                field: field_name.to_string(),
            })
    }
}

impl<T> SortSelector<T> {
    /// Registered name of the sort field
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        self.field.name()
    }

    /// Declared kind of the sort field
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.field.kind()
    }

    /// Sort key of one entity
    pub fn key(&self, entity: &T) -> FieldValue {
        self.field.get(entity)
    }

    /// Ascending comparison of two entities by this key (nulls first)
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.key(a).sort_cmp(&self.key(b))
    }
}

impl<T> Clone for SortSelector<T> {
    fn clone(&self) -> Self {
        Self { field: self.field }
    }
}

impl<T> PartialEq for SortSelector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
    }
}

impl<T> fmt::Debug for SortSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SortSelector").field(&self.field.name()).finish()
    }
}

/// Build a sort selector from an optional field name
///
/// `None` or an empty name means no explicit ordering; the store picks its
/// default (typically the primary key).
///
/// # Example
///
/// ```rust,ignore
/// assert!(build_sort_selector::<User>(None)?.is_none());
/// let by_name = build_sort_selector::<User>(Some("Name"))?.unwrap();
/// assert_eq!(by_name.field_name(), "name");
/// ```
pub fn build_sort_selector<T: Entity>(
    field_name: Option<&str>,
) -> Result<Option<SortSelector<T>>, QueryError> {
    match field_name {
        None | Some("") => Ok(None),
        Some(name) => SortSelector::for_field(name).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::Person;

    #[test]
    fn test_none_and_empty_yield_none() {
        assert!(build_sort_selector::<Person>(None).unwrap().is_none());
        assert!(build_sort_selector::<Person>(Some("")).unwrap().is_none());
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            build_sort_selector::<Person>(Some("Unknown")),
            Err(QueryError::UnknownField {
                entity: "Person",
                field: "Unknown".to_string(),
            })
        );
    }

    #[test]
    fn test_case_insensitive_resolution() {
        let selector = build_sort_selector::<Person>(Some("AGE")).unwrap().unwrap();
        assert_eq!(selector.field_name(), "age");
        assert_eq!(selector.kind(), FieldKind::Integer);
    }

    #[test]
    fn test_key_and_compare() {
        let selector = SortSelector::<Person>::for_field("name").unwrap();
        let alice = Person::new("Alice", 40);
        let bob = Person::new("Bob", 20);
        assert_eq!(selector.key(&alice), FieldValue::from("Alice"));
        assert_eq!(selector.compare(&alice, &bob), Ordering::Less);
        assert_eq!(selector.compare(&bob, &alice), Ordering::Greater);
    }

    #[test]
    fn test_null_keys_sort_first() {
        let selector = SortSelector::<Person>::for_field("email").unwrap();
        let without = Person::new("A", 1);
        let with = Person::new("B", 1).with_email("a@example.com");
        assert_eq!(selector.compare(&without, &with), Ordering::Less);
    }
}
