//! Lifecycle event registry
//!
//! Callbacks are registered per entity type and event at bootstrap, then the
//! registry is frozen behind the [`Database`](crate::database::Database)
//! handle. Firing is synchronous and stops at the first failing callback.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backends::Record;
use crate::event_error::EventError;

/// Events fired around the mutating operations of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelEvent {
    Creating,
    Created,
    Updating,
    Updated,
    Deleting,
    Deleted,
    Restoring,
    Restored,
}

impl ModelEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ModelEvent::Creating => "creating",
            ModelEvent::Created => "created",
            ModelEvent::Updating => "updating",
            ModelEvent::Updated => "updated",
            ModelEvent::Deleting => "deleting",
            ModelEvent::Deleted => "deleted",
            ModelEvent::Restoring => "restoring",
            ModelEvent::Restored => "restored",
        }
    }

    /// Whether the event fires before the write reaches the database
    pub fn is_before(&self) -> bool {
        matches!(
            self,
            ModelEvent::Creating
                | ModelEvent::Updating
                | ModelEvent::Deleting
                | ModelEvent::Restoring
        )
    }
}

impl fmt::Display for ModelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lifecycle callback. It may rewrite the payload of a `*ing` event.
pub type EventCallback = Arc<dyn Fn(&mut Record) -> Result<(), EventError> + Send + Sync>;

/// Per-model map from event to its ordered callbacks
#[derive(Default, Clone)]
pub struct EventRegistry {
    listeners: HashMap<(TypeId, ModelEvent), Vec<EventCallback>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback for `event` on model `M`
    pub fn on<M, F>(&mut self, event: ModelEvent, callback: F) -> &mut Self
    where
        M: 'static,
        F: Fn(&mut Record) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.listeners
            .entry((TypeId::of::<M>(), event))
            .or_default()
            .push(Arc::new(callback));
        self
    }

    /// Run every callback for `event` on model `M` in registration order
    pub fn fire<M: 'static>(&self, event: ModelEvent, payload: &mut Record) -> Result<(), EventError> {
        let Some(callbacks) = self.listeners.get(&(TypeId::of::<M>(), event)) else {
            return Ok(());
        };

        debug!(event = event.name(), callbacks = callbacks.len(), "firing model event");
        for callback in callbacks {
            if let Err(err) = callback(payload) {
                warn!(event = event.name(), error = %err, "model event callback failed");
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn listener_count<M: 'static>(&self, event: ModelEvent) -> usize {
        self.listeners
            .get(&(TypeId::of::<M>(), event))
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("registrations", &self.listeners.len())
            .finish()
    }
}
