//! CRUD service facade
//!
//! [`CrudService`] turns a [`PageQuery`] (page, size, sort field, filter
//! string) into a [`Specification`](crate::query::Specification), runs it
//! against a repository and returns a [`Page`]. Saves and deletes go through
//! the same service and emit entity events.

mod crud;
mod error;
mod page;

pub use crud::CrudService;
pub use error::{ServiceError, ServiceErrorKind, ServiceOperation};
pub use page::{Page, PageQuery};
