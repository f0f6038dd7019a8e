//! In-process repository backed by a concurrent map

use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{Repository, RepositoryResult};
use crate::entity::{AuditInfo, Entity};
use crate::query::Specification;

/// Thread-safe in-memory store
///
/// Ids are handed out from an atomic counter starting at 1. Entities created
/// with an explicit id keep it and push the counter past it. Includes are
/// ignored since there is nothing to load eagerly.
///
/// # Example
///
/// ```rust,ignore
/// let repo = Arc::new(MemoryRepository::<User>::new());
/// let alice = repo.create(User::new("Alice"), &AuditInfo::anonymous()).await?;
/// assert_eq!(alice.id, 1);
/// ```
#[derive(Debug)]
pub struct MemoryRepository<T> {
    entities: DashMap<i64, T>,
    next_id: AtomicI64,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Matching entities sorted by the requested keys, ties in id order
    fn select(&self, spec: &Specification<T>) -> Vec<T> {
        let mut selected: Vec<T> = self
            .entities
            .iter()
            .filter(|entry| spec.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        selected.sort_by_key(|entity| entity.id());
        if spec.is_ordered() {
            selected.sort_by(|a, b| spec.compare(a, b));
        }
        selected
    }
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn window(value: Option<u64>) -> Option<usize> {
    value.map(|v| usize::try_from(v).unwrap_or(usize::MAX))
}

impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<T>> {
        Ok(self.entities.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_spec(&self, spec: &Specification<T>) -> RepositoryResult<Vec<T>> {
        let skip = window(spec.skip()).unwrap_or(0);
        let take = window(spec.take()).unwrap_or(usize::MAX);

        let page: Vec<T> = self
            .select(spec)
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|entity| spec.project(entity))
            .collect();

        tracing::debug!(
            entity = T::entity_name(),
            skip,
            returned = page.len(),
            "Selected entities by specification"
        );
        Ok(page)
    }

    async fn count_by_spec(&self, spec: &Specification<T>) -> RepositoryResult<u64> {
        let count = self
            .entities
            .iter()
            .filter(|entry| spec.matches(entry.value()))
            .count();
        Ok(count as u64)
    }

    async fn create(&self, mut entity: T, audit: &AuditInfo) -> RepositoryResult<T> {
        let requested = entity.id();
        let slot = if requested >= 1 {
            self.next_id
                .fetch_max(requested.saturating_add(1), AtomicOrdering::SeqCst);
            match self.entities.entry(requested) {
                Entry::Occupied(_) => {
                    return Err(RepositoryError::already_exists(T::entity_name(), requested))
                }
                Entry::Vacant(slot) => slot,
            }
        } else {
            // Skip ids claimed by explicit-id creates.
            loop {
                let id = self
                    .next_id
                    .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |next| {
                        next.checked_add(1)
                    })
                    .map_err(|_| {
                        RepositoryError::constraint_violation(
                            RepositoryOperation::Create,
                            format!("No {} ids left to assign", T::entity_name()),
                        )
                    })?;
                if let Entry::Vacant(slot) = self.entities.entry(id) {
                    break slot;
                }
            }
        };

        let id = *slot.key();
        entity.set_id(id);
        slot.insert(entity.clone());
        tracing::debug!(
            entity = T::entity_name(),
            id,
            user = audit.user_email.as_deref().unwrap_or("anonymous"),
            "Created entity"
        );
        Ok(entity)
    }

    async fn update(&self, entity: T, audit: &AuditInfo) -> RepositoryResult<T> {
        let id = entity.id();
        match self.entities.get_mut(&id) {
            Some(mut stored) => {
                *stored = entity.clone();
                tracing::debug!(
                    entity = T::entity_name(),
                    id,
                    user = audit.user_email.as_deref().unwrap_or("anonymous"),
                    "Updated entity"
                );
                Ok(entity)
            }
            None => Err(RepositoryError::not_found(
                RepositoryOperation::Update,
                T::entity_name(),
                id,
            )),
        }
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let removed = self.entities.remove(&id).is_some();
        tracing::debug!(entity = T::entity_name(), id, removed, "Deleted entity");
        Ok(removed)
    }
}
