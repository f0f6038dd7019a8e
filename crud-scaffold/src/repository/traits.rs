//! Repository trait definitions
//!
//! Async methods use RPITIT (return position `impl Trait` in traits), so
//! implementors can write plain `async fn` without `async_trait`.

use std::future::Future;

use super::error::RepositoryError;
use crate::entity::{AuditInfo, Entity};
use crate::query::Specification;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Data store for one entity type
///
/// The store is the only component that executes a [`Specification`]: it
/// filters with the predicate, orders by the requested keys, applies the
/// `skip`/`take` window, loads requested includes it knows about and applies
/// the projection.
///
/// # Example
///
/// ```rust,ignore
/// use crud_scaffold::repository::{Repository, RepositoryResult};
///
/// impl Repository<User> for UserRepository {
///     async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
///         sqlx::query_as!(User, "SELECT * FROM users WHERE id = $1", id)
///             .fetch_optional(&self.pool)
///             .await
///             .map_err(into_repository_error)
///     }
///
///     // ... other methods
/// }
/// ```
pub trait Repository<T: Entity>: Send + Sync {
    /// Load one entity; `Ok(None)` when absent
    fn find_by_id(&self, id: i64) -> impl Future<Output = RepositoryResult<Option<T>>> + Send;

    /// Load the entities selected by `spec`, ordered and windowed
    fn find_by_spec(
        &self,
        spec: &Specification<T>,
    ) -> impl Future<Output = RepositoryResult<Vec<T>>> + Send;

    /// Count the entities matching `spec`'s predicate
    ///
    /// Ordering, `skip` and `take` are ignored so the result is the total
    /// behind a page.
    fn count_by_spec(
        &self,
        spec: &Specification<T>,
    ) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Insert a new entity and return it with its assigned id
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the entity carries an id that is already stored.
    fn create(
        &self,
        entity: T,
        audit: &AuditInfo,
    ) -> impl Future<Output = RepositoryResult<T>> + Send;

    /// Overwrite a stored entity
    ///
    /// # Errors
    ///
    /// `NotFound` when no entity with this id is stored.
    fn update(
        &self,
        entity: T,
        audit: &AuditInfo,
    ) -> impl Future<Output = RepositoryResult<T>> + Send;

    /// Remove an entity; `false` when it did not exist
    fn delete(&self, id: i64) -> impl Future<Output = RepositoryResult<bool>> + Send;
}
