//! Entity change events
//!
//! The service emits an [`EntityEvent`] after every successful save or delete
//! through an [`EventStorage`]. Storages decide what happens next: log it,
//! forward it to a bus as JSON, or hand it to in-process [`EventProcessor`]s.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::entity::Entity;

/// Failure while emitting or processing an event
#[derive(Debug, Error)]
pub enum EventError {
    /// The sink could not accept the event
    #[error("Event storage unavailable: {0}")]
    Unavailable(String),

    /// A processor rejected the event
    #[error("Event processor {processor} failed: {message}")]
    Processor {
        /// Processor name
        processor: String,
        /// Failure description
        message: String,
    },

    /// The event payload could not be serialized
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What happened to the entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityEventKind<T> {
    /// The entity was created or updated; carries the stored state
    Saved {
        /// Entity as reloaded after the write
        entity: T,
    },
    /// The entity was removed
    Deleted {
        /// Id of the removed entity
        entity_id: i64,
        /// Secondary key for stores that need one to locate related data
        #[serde(skip_serializing_if = "Option::is_none")]
        additional_key: Option<String>,
    },
}

/// Event envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityEvent<T> {
    /// Time-ordered event id
    pub event_id: Uuid,
    /// When the change was committed
    pub occurred_at: DateTime<Utc>,
    /// Entity type name
    pub entity_type: &'static str,
    /// Change payload
    #[serde(flatten)]
    pub kind: EntityEventKind<T>,
}

impl<T: Entity> EntityEvent<T> {
    fn with_kind(kind: EntityEventKind<T>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            entity_type: T::entity_name(),
            kind,
        }
    }

    /// An entity was created or updated
    pub fn saved(entity: T) -> Self {
        Self::with_kind(EntityEventKind::Saved { entity })
    }

    /// An entity was deleted
    pub fn deleted(entity_id: i64, additional_key: Option<String>) -> Self {
        Self::with_kind(EntityEventKind::Deleted {
            entity_id,
            additional_key,
        })
    }

    /// Id of the affected entity
    pub fn entity_id(&self) -> i64 {
        match &self.kind {
            EntityEventKind::Saved { entity } => entity.id(),
            EntityEventKind::Deleted { entity_id, .. } => *entity_id,
        }
    }

    /// Hand the event to each processor in order
    ///
    /// Stops at the first failing processor; later ones are not called.
    pub async fn dispatch(
        &self,
        processors: &[Arc<dyn EventProcessor<T>>],
    ) -> Result<(), EventError> {
        for processor in processors {
            let result = match &self.kind {
                EntityEventKind::Saved { .. } => processor.process_save(self).await,
                EntityEventKind::Deleted { .. } => processor.process_delete(self).await,
            };
            if let Err(e) = result {
                tracing::warn!(
                    processor = processor.name(),
                    event_id = %self.event_id,
                    error = %e,
                    "Event processor failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

impl<T> EntityEvent<T> {
    /// `"saved"` or `"deleted"`
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            EntityEventKind::Saved { .. } => "saved",
            EntityEventKind::Deleted { .. } => "deleted",
        }
    }
}

impl<T: Serialize> EntityEvent<T> {
    /// JSON payload for external buses
    pub fn to_json(&self) -> Result<Vec<u8>, EventError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Sink the service writes events to
#[async_trait]
pub trait EventStorage<T: Entity>: Send + Sync {
    /// Accept one event
    async fn emit(&self, event: EntityEvent<T>) -> Result<(), EventError>;
}

/// Consumer of entity events
#[async_trait]
pub trait EventProcessor<T: Entity>: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    async fn process_save(&self, event: &EntityEvent<T>) -> Result<(), EventError>;

    async fn process_delete(&self, event: &EntityEvent<T>) -> Result<(), EventError>;
}

/// Storage that writes every event to the log as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventStorage;

#[async_trait]
impl<T: Entity + Serialize> EventStorage<T> for LoggingEventStorage {
    async fn emit(&self, event: EntityEvent<T>) -> Result<(), EventError> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(
            event_id = %event.event_id,
            entity = event.entity_type,
            kind = event.kind_name(),
            payload = %payload,
            "Entity event"
        );
        Ok(())
    }
}

/// Storage that dispatches events to processors in the same process
pub struct InProcessEventStorage<T: Entity> {
    processors: Vec<Arc<dyn EventProcessor<T>>>,
}

impl<T: Entity> InProcessEventStorage<T> {
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Register a processor; processors run in registration order
    #[must_use]
    pub fn with_processor(mut self, processor: Arc<dyn EventProcessor<T>>) -> Self {
        self.processors.push(processor);
        self
    }
}

impl<T: Entity> Default for InProcessEventStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EventStorage<T> for InProcessEventStorage<T> {
    async fn emit(&self, event: EntityEvent<T>) -> Result<(), EventError> {
        tracing::debug!(
            event_id = %event.event_id,
            entity = event.entity_type,
            kind = event.kind_name(),
            processors = self.processors.len(),
            "Dispatching entity event"
        );
        event.dispatch(&self.processors).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::entity::test_support::Person;

    struct Recorder {
        name: &'static str,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn new(name: &'static str, fail: bool, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                log: Arc::clone(log),
            })
        }

        fn record(&self, what: &str) -> Result<(), EventError> {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, what));
            if self.fail {
                return Err(EventError::Processor {
                    processor: self.name.to_string(),
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EventProcessor<Person> for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn process_save(&self, event: &EntityEvent<Person>) -> Result<(), EventError> {
            self.record(&format!("save {}", event.entity_id()))
        }

        async fn process_delete(&self, event: &EntityEvent<Person>) -> Result<(), EventError> {
            self.record(&format!("delete {}", event.entity_id()))
        }
    }

    #[test]
    fn test_saved_event_envelope() {
        let event = EntityEvent::saved(Person::new("Ann", 30).with_id(4));
        assert_eq!(event.entity_type, "Person");
        assert_eq!(event.entity_id(), 4);
        assert_eq!(event.kind_name(), "saved");
        assert_eq!(event.event_id.get_version_num(), 7);
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = EntityEvent::<Person>::deleted(1, None);
        let b = EntityEvent::<Person>::deleted(1, None);
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn test_deleted_event_json() {
        let event = EntityEvent::<Person>::deleted(9, Some("tenant-1".to_string()));
        let json: serde_json::Value = serde_json::from_slice(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "deleted");
        assert_eq!(json["entity_type"], "Person");
        assert_eq!(json["entity_id"], 9);
        assert_eq!(json["additional_key"], "tenant-1");

        let event = EntityEvent::<Person>::deleted(9, None);
        let json: serde_json::Value = serde_json::from_slice(&event.to_json().unwrap()).unwrap();
        assert!(json.get("additional_key").is_none());
    }

    #[test]
    fn test_saved_event_json_embeds_entity() {
        let event = EntityEvent::saved(Person::new("Ann", 30).with_id(4));
        let json: serde_json::Value = serde_json::from_slice(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "saved");
        assert_eq!(json["entity"]["name"], "Ann");
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_kind_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let processors: Vec<Arc<dyn EventProcessor<Person>>> =
            vec![Recorder::new("a", false, &log), Recorder::new("b", false, &log)];

        EntityEvent::saved(Person::new("Ann", 1).with_id(2))
            .dispatch(&processors)
            .await
            .unwrap();
        EntityEvent::<Person>::deleted(3, None)
            .dispatch(&processors)
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["a:save 2", "b:save 2", "a:delete 3", "b:delete 3"]
        );
    }

    #[tokio::test]
    async fn test_dispatch_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let storage = InProcessEventStorage::<Person>::new()
            .with_processor(Recorder::new("first", true, &log))
            .with_processor(Recorder::new("second", false, &log));

        let err = storage.emit(EntityEvent::<Person>::deleted(5, None)).await.unwrap_err();
        assert!(matches!(err, EventError::Processor { ref processor, .. } if processor == "first"));
        assert_eq!(*log.lock().unwrap(), ["first:delete 5"]);
    }

    #[tokio::test]
    async fn test_logging_storage_accepts_events() {
        let storage = LoggingEventStorage;
        let event = EntityEvent::saved(Person::new("Ann", 1));
        let result = EventStorage::<Person>::emit(&storage, event).await;
        assert!(result.is_ok());
    }
}
