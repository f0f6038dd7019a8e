//! Per-entity field registry
//!
//! Each entity type registers its filterable and sortable fields once, as a
//! name, a [`FieldKind`] and a plain function reading the value. Query
//! building resolves field names against this registry instead of
//! inspecting types at runtime.

use std::fmt;
use std::marker::PhantomData;

use super::value::{FieldKind, FieldValue};

/// Getter reading one field from an entity
pub type FieldGetter<T> = fn(&T) -> FieldValue;

/// A registered field: name, kind, and getter
pub struct FieldDef<T> {
    name: &'static str,
    kind: FieldKind,
    getter: FieldGetter<T>,
}

impl<T> FieldDef<T> {
    /// Create a field definition
    pub const fn new(name: &'static str, kind: FieldKind, getter: FieldGetter<T>) -> Self {
        Self { name, kind, getter }
    }

    /// Registered field name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared kind
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Read the field from an entity
    pub fn get(&self, entity: &T) -> FieldValue {
        (self.getter)(entity)
    }
}

impl<T> Clone for FieldDef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldDef<T> {}

impl<T> PartialEq for FieldDef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl<T> fmt::Debug for FieldDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A navigation relation that a store may eagerly load
///
/// Declared as constants next to the entity so includes are checked by the
/// compiler rather than spelled as strings.
///
/// # Example
///
/// ```rust
/// use crud_scaffold::entity::Relation;
///
/// struct User;
///
/// impl User {
///     pub const ROLES: Relation<User> = Relation::new("roles");
/// }
///
/// assert_eq!(User::ROLES.name(), "roles");
/// ```
pub struct Relation<T> {
    name: &'static str,
    _entity: PhantomData<fn(&T)>,
}

impl<T> Relation<T> {
    /// Declare a relation by its navigation name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }

    /// Navigation name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Relation<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Relation<T> {}

impl<T> PartialEq for Relation<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Relation<T> {}

impl<T> fmt::Debug for Relation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Relation").field(&self.name).finish()
    }
}

/// Field registry for one entity type
///
/// # Example
///
/// ```rust
/// use crud_scaffold::entity::{EntitySchema, FieldKind, FieldValue};
///
/// struct Book {
///     title: String,
///     pages: i64,
/// }
///
/// let schema = EntitySchema::<Book>::new("Book")
///     .field("title", FieldKind::Text, |b| FieldValue::from(&b.title))
///     .field("pages", FieldKind::Integer, |b| b.pages.into());
///
/// assert_eq!(schema.resolve("TITLE").map(|f| f.name()), Some("title"));
/// assert!(schema.resolve("isbn").is_none());
/// ```
pub struct EntitySchema<T> {
    name: &'static str,
    fields: Vec<FieldDef<T>>,
}

impl<T> EntitySchema<T> {
    /// Start an empty registry for the named entity type
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Register a field
    ///
    /// When two names collide case-insensitively, exact-case lookups still
    /// find each one; case-insensitive lookups find the first registered.
    #[must_use]
    pub fn field(mut self, name: &'static str, kind: FieldKind, getter: FieldGetter<T>) -> Self {
        self.fields.push(FieldDef::new(name, kind, getter));
        self
    }

    /// Entity type name used in errors and logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// All registered fields in registration order
    #[must_use]
    pub fn fields(&self) -> &[FieldDef<T>] {
        &self.fields
    }

    /// Find a field by name: exact match first, then case-insensitive
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&FieldDef<T>> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
    }
}

impl<T> fmt::Debug for EntitySchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}
