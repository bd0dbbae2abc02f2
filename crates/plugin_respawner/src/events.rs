//! # Event Bus
//!
//! A small typed event bus through which the host delivers core events
//! (player logins) to plugins.
//!
//! Events are plain `serde` types. They cross the bus as JSON so handlers
//! registered by different plugins never share memory with the emitter; each
//! handler deserializes its own copy. A handler whose type does not match the
//! payload is skipped with a warning instead of failing the emit.
//!
//! Handlers for one key run sequentially in ascending [`EventPriority`]
//! order, registration order breaking ties. A plugin that registers at
//! `Highest` therefore sees the event after every `Normal` handler has run,
//! and its effects are not overridden by them.

use crate::error::EventError;
use crate::types::PlayerId;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Core event emitted when a player has finished logging in.
pub const PLAYER_LOGIN: &str = "player_login";

/// Trait implemented by every event carried on the bus.
pub trait Event: Serialize + DeserializeOwned + Send + Sync + Debug + 'static {
    /// Stable, unique name of the event type.
    fn type_name() -> &'static str
    where
        Self: Sized;
}

/// A player logged in and was placed in `world`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLoginEvent {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Name of the world the player is in at login
    pub world: String,
    pub timestamp: u64,
}

impl PlayerLoginEvent {
    pub fn new(player_id: PlayerId, player_name: impl Into<String>, world: impl Into<String>) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            world: world.into(),
            timestamp: current_timestamp(),
        }
    }
}

impl Event for PlayerLoginEvent {
    fn type_name() -> &'static str {
        "PlayerLoginEvent"
    }
}

/// Order in which handlers for the same event run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EventPriority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
    /// Observe only; runs last
    Monitor,
}

/// Counters describing bus activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventBusStats {
    pub total_handlers: usize,
    pub events_emitted: u64,
    pub handler_failures: u64,
}

type BoxedHandler = Arc<dyn Fn(Arc<[u8]>) -> BoxFuture<'static, Result<(), EventError>> + Send + Sync>;

struct RegisteredHandler {
    name: String,
    priority: EventPriority,
    handler: BoxedHandler,
}

/// Routes core events to registered handlers.
#[derive(Default)]
pub struct EventBus {
    handlers: DashMap<String, Vec<RegisteredHandler>>,
    total_handlers: AtomicUsize,
    events_emitted: AtomicU64,
    handler_failures: AtomicU64,
}

impl Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("keys", &self.handlers.len())
            .field("stats", &self.stats())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an async handler for a core server event.
    pub fn on_core<T, F, Fut>(
        &self,
        event_name: &str,
        priority: EventPriority,
        handler: F,
    ) -> Result<(), EventError>
    where
        T: Event,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EventError>> + Send + 'static,
    {
        let event_key = format!("core:{event_name}");
        let name = format!("{event_key}::{}", T::type_name());
        let handler = Arc::new(handler);

        let handler_name = name.clone();
        let boxed: BoxedHandler = Arc::new(move |data: Arc<[u8]>| {
            let handler = Arc::clone(&handler);
            let handler_name = handler_name.clone();
            async move {
                match serde_json::from_slice::<T>(&data) {
                    Ok(event) => handler(event).await,
                    Err(e) => {
                        let e = EventError::Deserialization(e);
                        warn!("🟡 Handler '{}' skipped: {}", handler_name, e);
                        Ok(())
                    }
                }
            }
            .boxed()
        });

        let mut entry = self.handlers.entry(event_key).or_default();
        entry.push(RegisteredHandler {
            name: name.clone(),
            priority,
            handler: boxed,
        });
        // Stable sort keeps registration order within a priority.
        entry.sort_by_key(|h| h.priority);
        drop(entry);

        self.total_handlers.fetch_add(1, Ordering::Relaxed);
        debug!("📝 Registered handler {} at {:?} priority", name, priority);
        Ok(())
    }

    /// Emits a core event to every handler registered for it.
    ///
    /// Handler failures are logged and counted; they do not stop later
    /// handlers and are not returned to the emitter.
    pub async fn emit_core<T: Event>(&self, event_name: &str, event: &T) -> Result<(), EventError> {
        let event_key = format!("core:{event_name}");
        let data: Arc<[u8]> = serde_json::to_vec(event)?.into();
        self.events_emitted.fetch_add(1, Ordering::Relaxed);

        let handlers: Vec<(String, BoxedHandler)> = match self.handlers.get(&event_key) {
            Some(entry) => entry
                .iter()
                .map(|h| (h.name.clone(), Arc::clone(&h.handler)))
                .collect(),
            None => {
                debug!("No handlers registered for {}", event_key);
                return Ok(());
            }
        };

        for (name, handler) in handlers {
            if let Err(e) = handler(Arc::clone(&data)).await {
                self.handler_failures.fetch_add(1, Ordering::Relaxed);
                warn!("❌ Handler '{}' failed for {}: {}", name, event_key, e);
            }
        }

        Ok(())
    }

    /// Number of handlers registered for a core event.
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.handlers
            .get(&format!("core:{event_name}"))
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    pub fn stats(&self) -> EventBusStats {
        EventBusStats {
            total_handlers: self.total_handlers.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }
}

/// Current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
