//! Mock collaborators shared by the unit tests.

use crate::commands::CommandSender;
use crate::error::RespawnError;
use crate::storage::{PolicySnapshot, PolicyStorage};
use crate::types::{Location, PlayerId, TeleportCause, Vec3, WorldHandle};
use crate::world::{PlayerMover, WorldResolver};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct TestWorlds {
    worlds: Mutex<Vec<(WorldHandle, Vec3)>>,
}

impl TestWorlds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worlds(names: &[&str]) -> Self {
        let worlds = Self::new();
        for name in names {
            worlds.create_world(name);
        }
        worlds
    }

    pub fn create_world(&self, name: &str) -> WorldHandle {
        let handle = WorldHandle::new(name);
        let spawn = Vec3::new(0.5, 64.0, 0.5);
        self.worlds.lock().unwrap().push((handle.clone(), spawn));
        handle
    }
}

impl WorldResolver for TestWorlds {
    fn resolve(&self, name: &str) -> Option<WorldHandle> {
        self.worlds
            .lock()
            .unwrap()
            .iter()
            .find(|(handle, _)| handle.name.eq_ignore_ascii_case(name))
            .map(|(handle, _)| handle.clone())
    }

    fn spawn_location(&self, world: &WorldHandle) -> Option<Location> {
        self.worlds
            .lock()
            .unwrap()
            .iter()
            .find(|(handle, _)| handle == world)
            .map(|(handle, spawn)| Location::new(handle.clone(), *spawn))
    }

    fn world_names(&self) -> Vec<String> {
        self.worlds
            .lock()
            .unwrap()
            .iter()
            .map(|(handle, _)| handle.name.clone())
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct RecordingMover {
    pub teleports: Mutex<Vec<(PlayerId, Location, TeleportCause)>>,
    pub fail: bool,
}

impl RecordingMover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            teleports: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn recorded(&self) -> Vec<(PlayerId, Location, TeleportCause)> {
        self.teleports.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlayerMover for RecordingMover {
    async fn teleport(
        &self,
        player: PlayerId,
        location: Location,
        cause: TeleportCause,
    ) -> Result<(), String> {
        if self.fail {
            return Err("player is offline".to_string());
        }
        self.teleports.lock().unwrap().push((player, location, cause));
        Ok(())
    }
}

/// Loads a fixed snapshot and fails every save.
#[derive(Debug)]
pub struct FailingStorage {
    initial: PolicySnapshot,
}

impl FailingStorage {
    pub fn new(initial: PolicySnapshot) -> Self {
        Self { initial }
    }
}

#[async_trait]
impl PolicyStorage for FailingStorage {
    async fn load(&self) -> Result<PolicySnapshot, RespawnError> {
        Ok(self.initial.clone())
    }

    async fn save(&self, _snapshot: &PolicySnapshot) -> Result<(), RespawnError> {
        Err(RespawnError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        )))
    }
}

#[derive(Debug)]
pub struct TestSender {
    pub admin: bool,
    pub messages: Mutex<Vec<String>>,
}

impl TestSender {
    pub fn admin() -> Self {
        Self {
            admin: true,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn guest() -> Self {
        Self {
            admin: false,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl CommandSender for TestSender {
    fn name(&self) -> &str {
        if self.admin {
            "admin"
        } else {
            "guest"
        }
    }

    fn has_permission(&self, _node: &str) -> bool {
        self.admin
    }

    fn send_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
