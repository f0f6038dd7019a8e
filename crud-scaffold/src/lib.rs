//! # crud-scaffold
//!
//! Generic CRUD scaffolding: turn untyped filter and sort strings into typed
//! query specifications and serve paged results from any repository.
//!
//! ## Features
//!
//! - **Filter parsing**: `"age_30,name_Bob"` becomes a list of clauses sharing one operator
//! - **Typed predicates**: clauses resolve against a per-entity field registry, with
//!   explicit literal coercion and a tagged `And`/`Comparison` tree
//! - **Query specifications**: predicate, single or multi-key ordering, skip/take,
//!   includes and projection in one immutable value
//! - **Repositories**: RPITIT async trait plus a concurrent in-memory store
//! - **Service facade**: page normalisation, upserts, deletes and entity events
//! - **Ambient stack**: figment configuration, JSON `tracing` output
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crud_scaffold::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let repository = Arc::new(MemoryRepository::<User>::new());
//!     let service = CrudService::new(repository, config.query.clone())
//!         .with_event_storage(Arc::new(LoggingEventStorage));
//!
//!     service.save(User::new("Bob", 30), true, &AuditInfo::anonymous()).await?;
//!
//!     let page = service
//!         .get_page(PageQuery::new().with_filter("name_Bo").with_order_by("age"))
//!         .await?;
//!     println!("{} of {}", page.items.len(), page.total);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod observability;
pub mod query;
pub mod repository;
pub mod service;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, QueryConfig, ServiceConfig};
    pub use crate::entity::{AuditInfo, Entity, EntitySchema, FieldKind, FieldValue, Relation};
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        EntityEvent, EntityEventKind, EventError, EventProcessor, EventStorage,
        InProcessEventStorage, LoggingEventStorage,
    };
    pub use crate::observability::init_tracing;
    pub use crate::query::{
        build_predicate, build_sort_selector, parse_filter, FilterClause, Op, Predicate,
        Projection, QueryError, SortSelector, Specification,
    };
    pub use crate::repository::{
        MemoryRepository, Repository, RepositoryError, RepositoryErrorKind, RepositoryResult,
    };
    pub use crate::service::{CrudService, Page, PageQuery, ServiceError, ServiceErrorKind};
}
