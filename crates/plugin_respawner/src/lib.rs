//! # Player Respawner Plugin
//!
//! Watches player logins and sends players who log into one of a set of
//! *checked* worlds to the spawn point of a single *destination* world.
//!
//! ## Components
//!
//! * [`RespawnPolicyStore`] - the checked worlds, the destination and the
//!   active flag, with their membership rules and persistence
//! * [`RespawnerPlugin`] - hooks the `player_login` core event at
//!   [`EventPriority::Highest`] and performs the teleport
//! * [`CommandRegistry`] - the `/player_respawn` admin command
//! * [`TomlPolicyStorage`] - the policy file (`active`, `worlds`, `destination`)
//!
//! ## Host Integration
//!
//! The host supplies a [`ServerContext`] exposing the [`EventBus`], a
//! [`WorldResolver`] and a [`PlayerMover`]:
//!
//! ```rust,no_run
//! use plugin_respawner::*;
//! use std::sync::Arc;
//!
//! async fn start(
//!     context: Arc<dyn ServerContext>,
//! ) -> Result<RespawnerPlugin, PluginError> {
//!     let storage = Arc::new(TomlPolicyStorage::new("respawn.toml"));
//!     let mut plugin = RespawnerPlugin::new(storage, context.worlds());
//!     plugin.register_handlers(context.events(), context.clone()).await?;
//!     plugin.on_init(context).await?;
//!     Ok(plugin)
//! }
//! ```

pub mod commands;
pub mod context;
pub mod error;
pub mod events;
pub mod plugin;
pub mod policy;
pub mod storage;
pub mod types;
pub mod world;

#[cfg(test)]
mod test_support;

pub use commands::{
    CommandOutcome, CommandRegistry, CommandSender, CommandSpec, Subcommand, ADMIN_PERMISSION,
    COMMANDS, ROOT_ALIASES, ROOT_COMMAND,
};
pub use context::{LogLevel, ServerContext};
pub use error::{EventError, PluginError, RespawnError};
pub use events::{
    current_timestamp, Event, EventBus, EventBusStats, EventPriority, PlayerLoginEvent,
    PLAYER_LOGIN,
};
pub use plugin::{handle_player_login, RespawnerPlugin, SimplePlugin};
pub use policy::RespawnPolicyStore;
pub use storage::{MemoryPolicyStorage, PolicySnapshot, PolicyStorage, TomlPolicyStorage};
pub use types::{
    world_names_match, Location, PlayerId, TeleportCause, Vec3, WorldHandle, WorldId,
};
pub use world::{PlayerMover, WorldResolver};
