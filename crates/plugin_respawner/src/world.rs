//! Host-facing interfaces for worlds and player movement.
//!
//! The plugin never touches the host's world or entity storage directly.
//! Everything it needs goes through these two traits, which the embedding
//! server implements.

use crate::types::{Location, PlayerId, TeleportCause, WorldHandle};
use async_trait::async_trait;
use std::fmt::Debug;

/// Looks up live worlds by name.
pub trait WorldResolver: Send + Sync + Debug {
    /// Resolves a world by name. Returns `None` if no such world is loaded.
    fn resolve(&self, name: &str) -> Option<WorldHandle>;

    /// Returns the spawn location of a world, or `None` if the handle is
    /// stale (the world was unloaded since it was resolved).
    fn spawn_location(&self, world: &WorldHandle) -> Option<Location>;

    /// Names of every loaded world, used for argument completion.
    fn world_names(&self) -> Vec<String>;
}

/// Moves players between locations.
#[async_trait]
pub trait PlayerMover: Send + Sync + Debug {
    /// Teleports a player, tagging the move with `cause`.
    async fn teleport(
        &self,
        player: PlayerId,
        location: Location,
        cause: TeleportCause,
    ) -> Result<(), String>;
}
