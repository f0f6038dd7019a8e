//! Data stores that execute query specifications
//!
//! - [`Repository`]: async CRUD trait keyed by `i64` ids, reading through a
//!   [`Specification`](crate::query::Specification)
//! - [`MemoryRepository`]: concurrent in-process implementation
//! - [`RepositoryError`]: structured failure with operation and entity context
//!
//! # Example
//!
//! ```rust,ignore
//! use crud_scaffold::query::{build_sort_selector, Specification};
//! use crud_scaffold::repository::{MemoryRepository, Repository};
//!
//! let repo = MemoryRepository::<User>::new();
//! let by_name = build_sort_selector(Some("name"))?;
//! let spec = Specification::paged(None, by_name, false, Some(0), Some(20), None);
//!
//! let users = repo.find_by_spec(&spec).await?;
//! let total = repo.count_by_spec(&spec).await?;
//! ```

mod error;
mod memory;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::MemoryRepository;
pub use traits::{Repository, RepositoryResult};
