//! Query building: filter strings, predicates, sort keys, specifications
//!
//! The pipeline runs synchronously and without I/O:
//!
//! 1. [`parse_filter`] splits `"age_30,name_Bob"` into [`FilterClause`]s that
//!    share one caller-supplied [`Op`].
//! 2. [`build_predicate`] resolves each clause against the entity schema,
//!    coerces its literal, and folds the results into one conjunction.
//! 3. [`build_sort_selector`] resolves an optional sort field.
//! 4. [`Specification`] bundles predicate, ordering, paging and includes for a
//!    repository.
//!
//! Every failure is a [`QueryError`] returned to the caller.

mod error;
mod filter;
mod predicate;
mod sort;
mod specification;

pub use error::QueryError;
pub use filter::{parse_filter, FilterClause, Op, CLAUSE_SEPARATOR, FILTER_DELIMITER};
pub use predicate::{build_predicate, Comparison, Predicate};
pub use sort::{build_sort_selector, SortSelector};
pub use specification::{Projection, Specification};
