//! Generic CRUD service over a repository

use std::sync::Arc;

use super::error::{ServiceError, ServiceOperation};
use super::page::{Page, PageQuery};
use crate::config::QueryConfig;
use crate::entity::{AuditInfo, Entity};
use crate::events::{EntityEvent, EventStorage};
use crate::query::{build_predicate, build_sort_selector, parse_filter, QueryError, Specification};
use crate::repository::Repository;

/// Paged reads, upserts and deletes for one entity type
///
/// Wraps a [`Repository`] and, optionally, an [`EventStorage`] that receives
/// an event after every successful save or delete.
///
/// # Example
///
/// ```rust,ignore
/// let service = CrudService::new(Arc::new(MemoryRepository::<User>::new()), config.query.clone())
///     .with_event_storage(Arc::new(LoggingEventStorage));
///
/// let page = service
///     .get_page(PageQuery::new().with_order_by("name").with_filter("name_bo"))
///     .await?;
/// ```
pub struct CrudService<T: Entity, R: Repository<T>> {
    repository: Arc<R>,
    config: QueryConfig,
    event_storage: Option<Arc<dyn EventStorage<T>>>,
}

impl<T: Entity, R: Repository<T>> CrudService<T, R> {
    pub fn new(repository: Arc<R>, config: QueryConfig) -> Self {
        Self {
            repository,
            config,
            event_storage: None,
        }
    }

    /// Emit an event to `storage` after every successful write
    #[must_use]
    pub fn with_event_storage(mut self, storage: Arc<dyn EventStorage<T>>) -> Self {
        self.event_storage = Some(storage);
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Load one entity; `Ok(None)` when it does not exist
    pub async fn get(&self, id: i64) -> Result<Option<T>, ServiceError> {
        let entity = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| self.failure(ServiceOperation::Get, e))?;

        tracing::debug!(entity = T::entity_name(), id, found = entity.is_some(), "Loaded entity");
        Ok(entity)
    }

    /// Load one page of entities plus the total matching the filter
    ///
    /// Page numbers below 1 select the first page. The page size falls back
    /// to the configured default and is clamped to the configured maximum.
    /// The filter is parsed with the configured operator.
    pub async fn get_page(&self, query: PageQuery) -> Result<Page<T>, ServiceError> {
        let page = query.page_number();
        let page_size = query.page_size(&self.config);

        let spec = self
            .page_specification(&query)
            .map_err(|e| self.failure(ServiceOperation::GetPage, e))?;

        let items = self
            .repository
            .find_by_spec(&spec)
            .await
            .map_err(|e| self.failure(ServiceOperation::GetPage, e))?;
        let total = self
            .repository
            .count_by_spec(&spec)
            .await
            .map_err(|e| self.failure(ServiceOperation::GetPage, e))?;

        tracing::info!(
            entity = T::entity_name(),
            page,
            page_size,
            returned = items.len(),
            total,
            "Loaded page"
        );
        Ok(Page::new(items, total, page, page_size))
    }

    /// Build the specification `get_page` runs
    pub fn page_specification(&self, query: &PageQuery) -> Result<Specification<T>, QueryError> {
        let order_by = build_sort_selector::<T>(query.order_by.as_deref())?;
        let criteria = match query.filter() {
            Some(raw) => build_predicate::<T>(&parse_filter(raw, self.config.filter_operator)?)?,
            None => None,
        };

        Ok(Specification::paged(
            criteria,
            order_by,
            query.descending,
            Some(query.offset(&self.config)),
            Some(u64::from(query.page_size(&self.config))),
            None,
        ))
    }

    /// Create or update an entity and return the stored state
    ///
    /// An entity with an id below 1 is created only when `create_if_not_exist`
    /// is set. An entity with an id that is not stored is created under that
    /// id only when `create_if_not_exist` is set; otherwise the call fails
    /// with `NotFound`. A stored entity is updated through
    /// [`Entity::update_value_from`].
    pub async fn save(
        &self,
        entity: T,
        create_if_not_exist: bool,
        audit: &AuditInfo,
    ) -> Result<T, ServiceError> {
        let op = ServiceOperation::Save;

        let existing = if entity.id() < 1 {
            if !create_if_not_exist {
                return Err(self.failure(
                    op,
                    ServiceError::validation_failed(
                        op,
                        format!(
                            "{} was not created because create_if_not_exist is false",
                            T::entity_name()
                        ),
                    ),
                ));
            }
            None
        } else {
            let found = self
                .repository
                .find_by_id(entity.id())
                .await
                .map_err(|e| self.failure(op, e))?;
            if found.is_none() && !create_if_not_exist {
                return Err(self.failure(
                    op,
                    ServiceError::not_found(op, T::entity_name(), entity.id()),
                ));
            }
            found
        };

        let id = match existing {
            None => {
                let created = self
                    .repository
                    .create(entity, audit)
                    .await
                    .map_err(|e| self.failure(op, e))?;
                tracing::info!(entity = T::entity_name(), id = created.id(), "Created entity");
                created.id()
            }
            Some(mut stored) => {
                stored.update_value_from(&entity);
                let updated = self
                    .repository
                    .update(stored, audit)
                    .await
                    .map_err(|e| self.failure(op, e))?;
                tracing::info!(entity = T::entity_name(), id = updated.id(), "Updated entity");
                updated.id()
            }
        };

        let saved = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| self.failure(op, e))?
            .ok_or_else(|| self.failure(op, ServiceError::not_found(op, T::entity_name(), id)))?;

        self.emit(op, EntityEvent::saved(saved.clone())).await?;
        Ok(saved)
    }

    /// Delete an entity
    ///
    /// Fails with `NotFound` when nothing was stored under `id`; no event is
    /// emitted in that case.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let op = ServiceOperation::Delete;

        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(|e| self.failure(op, e))?;
        if !removed {
            return Err(self.failure(op, ServiceError::not_found(op, T::entity_name(), id)));
        }

        self.emit(op, EntityEvent::deleted(id, None)).await?;
        tracing::info!(entity = T::entity_name(), id, "Deleted entity");
        Ok(())
    }

    async fn emit(&self, op: ServiceOperation, event: EntityEvent<T>) -> Result<(), ServiceError> {
        match &self.event_storage {
            Some(storage) => storage
                .emit(event)
                .await
                .map_err(|e| self.failure(op, e)),
            None => Ok(()),
        }
    }

    /// Convert, tag and log a failure
    fn failure(&self, operation: ServiceOperation, err: impl Into<ServiceError>) -> ServiceError {
        let mut err = err.into().with_operation(operation);
        if err.entity_type.is_none() {
            err.entity_type = Some(T::entity_name().to_string());
        }

        tracing::error!(
            entity = T::entity_name(),
            operation = %err.operation,
            kind = %err.kind,
            entity_id = err.entity_id.as_deref().unwrap_or(""),
            retriable = err.is_retriable(),
            "Service error: {}",
            err.message
        );
        err
    }
}

impl<T: Entity, R: Repository<T>> Clone for CrudService<T, R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config.clone(),
            event_storage: self.event_storage.clone(),
        }
    }
}
