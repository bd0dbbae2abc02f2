//! Error types for the respawner plugin.
//!
//! Invariant rejections (adding a world twice, re-setting the same
//! destination, ...) are not errors: the policy store reports them as
//! `Ok(false)`. The types below cover faults that must reach the caller.

use thiserror::Error;

/// Errors raised by the respawn policy store and its persistence layer.
#[derive(Error, Debug)]
pub enum RespawnError {
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Event system error: {0}")]
    Event(#[from] EventError),
}

/// Errors that can occur while registering or dispatching events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Serialization failed when converting an event to bytes
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Deserialization failed when converting bytes back to an event
    #[error("Deserialization error: {0}")]
    Deserialization(serde_json::Error),
    /// A handler returned an error while processing the event
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
}

/// Errors that can occur during plugin lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Plugin initialization failed during startup
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),
    /// Error occurred during plugin execution
    #[error("Plugin execution error: {0}")]
    ExecutionError(String),
}

impl From<RespawnError> for PluginError {
    fn from(err: RespawnError) -> Self {
        PluginError::ExecutionError(err.to_string())
    }
}
