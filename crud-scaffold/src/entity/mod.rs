//! Entity abstraction shared by the query builder, repositories, and services
//!
//! An entity is any `Clone` type with an integer id and a registered
//! [`EntitySchema`]. The schema is what makes string filters and sort keys
//! resolvable without runtime reflection.
//!
//! # Example
//!
//! ```rust
//! use crud_scaffold::entity::{Entity, EntitySchema, FieldKind, FieldValue, Relation};
//! use once_cell::sync::Lazy;
//!
//! #[derive(Debug, Clone)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     age: i64,
//! }
//!
//! impl User {
//!     const ROLES: Relation<User> = Relation::new("roles");
//! }
//!
//! static USER_SCHEMA: Lazy<EntitySchema<User>> = Lazy::new(|| {
//!     EntitySchema::<User>::new("User")
//!         .field("id", FieldKind::Integer, |u| u.id.into())
//!         .field("name", FieldKind::Text, |u| FieldValue::from(&u.name))
//!         .field("age", FieldKind::Integer, |u| u.age.into())
//! });
//!
//! impl Entity for User {
//!     fn schema() -> &'static EntitySchema<Self> {
//!         &USER_SCHEMA
//!     }
//!
//!     fn id(&self) -> i64 {
//!         self.id
//!     }
//!
//!     fn set_id(&mut self, id: i64) {
//!         self.id = id;
//!     }
//! }
//!
//! assert_eq!(User::entity_name(), "User");
//! ```

mod schema;
mod value;

pub use schema::{EntitySchema, FieldDef, FieldGetter, Relation};
pub use value::{FieldKind, FieldValue};

use serde::{Deserialize, Serialize};

/// An entity managed by the CRUD scaffolding
///
/// Ids below 1 mean "not yet persisted".
pub trait Entity: Clone + Send + Sync + 'static {
    /// Field registry for this type
    fn schema() -> &'static EntitySchema<Self>;

    /// Entity id
    fn id(&self) -> i64;

    /// Overwrite the entity id (used by stores on create)
    fn set_id(&mut self, id: i64);

    /// Entity type name used in errors and logs
    fn entity_name() -> &'static str {
        Self::schema().name()
    }

    /// Copy updatable values from `other` into `self`, keeping `self`'s id
    ///
    /// Override to protect store-managed columns (timestamps, concurrency
    /// stamps) from being overwritten by client data.
    fn update_value_from(&mut self, other: &Self) {
        let id = self.id();
        *self = other.clone();
        self.set_id(id);
    }
}

/// Identity of the user performing a write, recorded by stores that track authorship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    /// Email of the acting user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Display name of the acting user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_display_name: Option<String>,
}

impl AuditInfo {
    /// Audit info for a named user
    pub fn new(user_email: impl Into<String>, user_display_name: impl Into<String>) -> Self {
        Self {
            user_email: Some(user_email.into()),
            user_display_name: Some(user_display_name.into()),
        }
    }

    /// Audit info with no acting user (system writes)
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Sample entity shared by unit tests across the crate

    use chrono::{DateTime, Utc};
    use once_cell::sync::Lazy;
    use serde::{Deserialize, Serialize};

    use super::{Entity, EntitySchema, FieldKind, FieldValue, Relation};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Person {
        pub id: i64,
        pub name: String,
        pub email: Option<String>,
        pub age: i64,
        pub score: f64,
        pub active: bool,
        pub joined: DateTime<Utc>,
    }

    impl Person {
        pub const ROLES: Relation<Person> = Relation::new("roles");
        pub const ADDRESSES: Relation<Person> = Relation::new("addresses");

        pub fn new(name: &str, age: i64) -> Self {
            Self {
                id: 0,
                name: name.to_string(),
                email: None,
                age,
                score: 0.0,
                active: true,
                joined: DateTime::<Utc>::UNIX_EPOCH,
            }
        }

        pub fn with_id(mut self, id: i64) -> Self {
            self.id = id;
            self
        }

        pub fn with_email(mut self, email: &str) -> Self {
            self.email = Some(email.to_string());
            self
        }

        pub fn with_score(mut self, score: f64) -> Self {
            self.score = score;
            self
        }

        pub fn inactive(mut self) -> Self {
            self.active = false;
            self
        }

        pub fn joined(mut self, joined: DateTime<Utc>) -> Self {
            self.joined = joined;
            self
        }
    }

    static PERSON_SCHEMA: Lazy<EntitySchema<Person>> = Lazy::new(|| {
        EntitySchema::<Person>::new("Person")
            .field("id", FieldKind::Integer, |p| p.id.into())
            .field("name", FieldKind::Text, |p| FieldValue::from(&p.name))
            .field("email", FieldKind::Text, |p| p.email.clone().into())
            .field("age", FieldKind::Integer, |p| p.age.into())
            .field("score", FieldKind::Float, |p| p.score.into())
            .field("active", FieldKind::Boolean, |p| p.active.into())
            .field("joined", FieldKind::DateTime, |p| p.joined.into())
    });

    impl Entity for Person {
        fn schema() -> &'static EntitySchema<Self> {
            &PERSON_SCHEMA
        }

        fn id(&self) -> i64 {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = id;
        }
    }
}
