//! # Server Context Interface
//!
//! The context is the bridge between plugin code and the host server. It
//! hands out the event bus and the world/player services a plugin may use,
//! and routes plugin log messages into the host's logging.

use crate::events::EventBus;
use crate::world::{PlayerMover, WorldResolver};
use std::fmt::Debug;
use std::sync::Arc;

/// Severity of a message logged through [`ServerContext::log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Services the host exposes to plugins.
pub trait ServerContext: Send + Sync + Debug {
    /// The event bus shared by the host and all plugins.
    fn events(&self) -> Arc<EventBus>;

    /// Lookup of loaded worlds.
    fn worlds(&self) -> Arc<dyn WorldResolver>;

    /// Teleportation of online players.
    fn players(&self) -> Arc<dyn PlayerMover>;

    /// Logs a message with the specified level.
    fn log(&self, level: LogLevel, message: &str);
}
