//! In-memory worlds and online players for the console host.
//!
//! [`WorldRegistry`] and [`PlayerRegistry`] stand in for a game server's
//! world and entity storage, and [`ConsoleContext`] hands them to plugins.

use async_trait::async_trait;
use dashmap::DashMap;
use plugin_respawner::{
    EventBus, LogLevel, Location, PlayerId, PlayerMover, ServerContext, TeleportCause, Vec3,
    WorldHandle, WorldResolver,
};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Loaded worlds, keyed by lowercased name.
#[derive(Debug, Default)]
pub struct WorldRegistry {
    worlds: DashMap<String, (WorldHandle, Vec3)>,
}

impl WorldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a new world. Fails if a world with the same name (ignoring
    /// case) is already loaded.
    pub fn create(&self, name: &str, spawn: Vec3) -> Result<WorldHandle, String> {
        let key = name.to_lowercase();
        if self.worlds.contains_key(&key) {
            return Err(format!("World '{name}' already exists"));
        }
        let handle = WorldHandle::new(name);
        self.worlds.insert(key, (handle.clone(), spawn));
        info!("🌍 Created world '{}' with spawn {}", name, spawn);
        Ok(handle)
    }

    /// Unloads a world, invalidating every handle to it.
    pub fn delete(&self, name: &str) -> Option<WorldHandle> {
        let (_, (handle, _)) = self.worlds.remove(&name.to_lowercase())?;
        info!("🗑️ Deleted world '{}'", handle);
        Some(handle)
    }

    /// Worlds with their spawn points, sorted by name.
    pub fn list(&self) -> Vec<(WorldHandle, Vec3)> {
        let mut worlds: Vec<_> = self.worlds.iter().map(|entry| entry.value().clone()).collect();
        worlds.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        worlds
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }
}

impl WorldResolver for WorldRegistry {
    fn resolve(&self, name: &str) -> Option<WorldHandle> {
        self.worlds
            .get(&name.to_lowercase())
            .map(|entry| entry.value().0.clone())
    }

    fn spawn_location(&self, world: &WorldHandle) -> Option<Location> {
        let entry = self.worlds.get(&world.name.to_lowercase())?;
        let (handle, spawn) = entry.value();
        // A handle from before a delete/re-create cycle is stale.
        (handle == world).then(|| Location::new(handle.clone(), *spawn))
    }

    fn world_names(&self) -> Vec<String> {
        self.list().into_iter().map(|(handle, _)| handle.name).collect()
    }
}

/// An online player as seen by the console host.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub name: String,
    /// World the player logged into
    pub login_world: String,
    /// Last teleport destination, if any
    pub location: Option<Location>,
}

/// Online players, keyed by id.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: DashMap<PlayerId, PlayerRecord>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a player logging into `world` and returns their id.
    pub fn join(&self, name: &str, world: &str) -> PlayerId {
        let id = PlayerId::new();
        self.players.insert(
            id,
            PlayerRecord {
                name: name.to_string(),
                login_world: world.to_string(),
                location: None,
            },
        );
        debug!("👤 {} ({}) joined in '{}'", name, id, world);
        id
    }

    pub fn get(&self, id: PlayerId) -> Option<PlayerRecord> {
        self.players.get(&id).map(|entry| entry.value().clone())
    }

    /// Online players sorted by name.
    pub fn list(&self) -> Vec<(PlayerId, PlayerRecord)> {
        let mut players: Vec<_> = self
            .players
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        players.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[async_trait]
impl PlayerMover for PlayerRegistry {
    async fn teleport(
        &self,
        player: PlayerId,
        location: Location,
        cause: TeleportCause,
    ) -> Result<(), String> {
        let mut record = self
            .players
            .get_mut(&player)
            .ok_or_else(|| format!("player {player} is not online"))?;
        debug!(
            "👤 Teleporting {} to {} (cause: {})",
            record.name,
            location,
            cause.as_str()
        );
        record.location = Some(location);
        Ok(())
    }
}

/// The [`ServerContext`] handed to plugins by the console host.
#[derive(Debug)]
pub struct ConsoleContext {
    events: Arc<EventBus>,
    worlds: Arc<WorldRegistry>,
    players: Arc<PlayerRegistry>,
}

impl ConsoleContext {
    pub fn new(events: Arc<EventBus>, worlds: Arc<WorldRegistry>, players: Arc<PlayerRegistry>) -> Self {
        Self {
            events,
            worlds,
            players,
        }
    }
}

impl ServerContext for ConsoleContext {
    fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    fn worlds(&self) -> Arc<dyn WorldResolver> {
        self.worlds.clone()
    }

    fn players(&self) -> Arc<dyn PlayerMover> {
        self.players.clone()
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => error!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Info => info!("{}", message),
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Trace => trace!("{}", message),
        }
    }
}
