//! # Respawn Policy Store
//!
//! Single source of truth for the redirect policy: the checked worlds, the
//! destination world and the active flag.
//!
//! ## Consistency
//!
//! Every operation takes the same async mutex, so the check / persist /
//! commit sequence of a mutation is atomic with respect to logins and other
//! commands. Mutations are persisted *before* they are committed to memory:
//! if the write fails the in-memory policy is left exactly as it was and the
//! error is returned to the caller.
//!
//! ## Name matching
//!
//! * Membership in the checked list (`is_checked_world`, duplicate detection
//!   on add, removal) is case-sensitive on the stored names.
//! * Comparisons against the destination and the login-time match are
//!   case-insensitive.

use crate::error::RespawnError;
use crate::storage::{PolicySnapshot, PolicyStorage};
use crate::types::{world_names_match, WorldHandle};
use crate::world::WorldResolver;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// In-memory policy plus the resolved destination handle.
#[derive(Debug, Clone, Default)]
struct PolicyState {
    snapshot: PolicySnapshot,
    destination_handle: Option<WorldHandle>,
    loaded: bool,
}

impl PolicyState {
    fn is_checked(&self, name: &str) -> bool {
        !self.snapshot.worlds.is_empty() && self.snapshot.worlds.iter().any(|w| w == name)
    }

    fn is_destination(&self, name: &str) -> bool {
        self.snapshot
            .destination
            .as_deref()
            .is_some_and(|dest| world_names_match(dest, name))
    }

    fn decide(&self, player_world: &str) -> Option<WorldHandle> {
        if !self.snapshot.active || self.snapshot.worlds.is_empty() {
            return None;
        }
        let destination = self.destination_handle.as_ref()?;

        self.snapshot
            .worlds
            .iter()
            .find(|checked| world_names_match(checked, player_world))
            .map(|_| destination.clone())
    }
}

/// Holds the redirect policy and enforces its membership rules.
#[derive(Debug)]
pub struct RespawnPolicyStore {
    state: Mutex<PolicyState>,
    storage: Arc<dyn PolicyStorage>,
    worlds: Arc<dyn WorldResolver>,
}

impl RespawnPolicyStore {
    /// Creates a store with the default policy. Call [`load`](Self::load)
    /// to read the persisted values.
    pub fn new(storage: Arc<dyn PolicyStorage>, worlds: Arc<dyn WorldResolver>) -> Self {
        Self {
            state: Mutex::new(PolicyState::default()),
            storage,
            worlds,
        }
    }

    /// Reads the policy into memory and re-resolves the destination world.
    ///
    /// Storage is read when `force_reload` is set or on the first call;
    /// otherwise the in-memory values are kept and only the destination
    /// handle is refreshed.
    pub async fn load(&self, force_reload: bool) -> Result<(), RespawnError> {
        let mut state = self.state.lock().await;

        if force_reload || !state.loaded {
            state.snapshot = self.storage.load().await?;
            state.loaded = true;
        }

        if state.snapshot.worlds.is_empty() {
            info!("🔍 Could not find the list of worlds to check!");
        } else {
            info!("🔍 Worlds to Check");
            info!("----------------");
            for world in &state.snapshot.worlds {
                info!("{world}");
            }
        }

        state.destination_handle = match state.snapshot.destination.as_deref() {
            Some(name) => {
                info!("🎯 Destination World ({name})");
                let handle = self.worlds.resolve(name);
                if handle.is_some() {
                    info!("✅ Destination World Found!");
                } else {
                    warn!("⚠️ Could not find Destination World '{name}'!");
                }
                handle
            }
            None => None,
        };

        if !state.snapshot.active {
            info!("⏸️ Respawner is currently deactivated");
        }

        Ok(())
    }

    /// Adds a world to the checked list.
    ///
    /// Returns `Ok(false)` without changing anything if the world is the
    /// destination or is already checked.
    pub async fn add_checked_world(&self, name: &str) -> Result<bool, RespawnError> {
        let mut state = self.state.lock().await;

        if state.is_destination(name) || state.is_checked(name) {
            debug!("Rejected adding '{name}' to checked worlds");
            return Ok(false);
        }

        let mut next = state.snapshot.clone();
        next.worlds.push(name.to_string());
        self.commit(&mut state, next).await?;

        info!("➕ Added '{name}' to checked worlds");
        Ok(true)
    }

    /// Removes a world from the checked list.
    ///
    /// Returns `Ok(false)` if the world is not checked.
    pub async fn remove_checked_world(&self, name: &str) -> Result<bool, RespawnError> {
        let mut state = self.state.lock().await;

        let Some(index) = state.snapshot.worlds.iter().position(|w| w == name) else {
            debug!("Rejected removing unchecked world '{name}'");
            return Ok(false);
        };

        let mut next = state.snapshot.clone();
        next.worlds.remove(index);
        self.commit(&mut state, next).await?;

        info!("➖ Removed '{name}' from checked worlds");
        Ok(true)
    }

    /// Sets the destination world.
    ///
    /// Returns `Ok(false)` if `name` already is the destination (ignoring
    /// case). A world that was checked is evicted from the checked list in
    /// the same write, so a world is never both checked and the destination.
    /// The destination is stored even when it does not currently resolve;
    /// redirects stay disabled until it does.
    pub async fn set_destination(&self, name: &str) -> Result<bool, RespawnError> {
        let mut state = self.state.lock().await;

        if state.is_destination(name) {
            debug!("Rejected setting '{name}' as destination: already the destination");
            return Ok(false);
        }

        let mut next = state.snapshot.clone();
        next.destination = Some(name.to_string());
        let before = next.worlds.len();
        next.worlds.retain(|w| !world_names_match(w, name));
        let evicted = before - next.worlds.len();

        let handle = self.worlds.resolve(name);
        self.commit(&mut state, next).await?;
        state.destination_handle = handle;

        info!("🎯 Destination set to '{name}'");
        if evicted > 0 {
            info!("➖ Removed '{name}' from checked worlds now that it is the destination");
        }
        if state.destination_handle.is_none() {
            warn!("⚠️ Could not find Destination World '{name}'!");
        }
        Ok(true)
    }

    /// Flips the active flag and returns the new value.
    pub async fn toggle_active(&self) -> Result<bool, RespawnError> {
        let mut state = self.state.lock().await;

        let mut next = state.snapshot.clone();
        next.active = !next.active;
        let active = next.active;
        self.commit(&mut state, next).await?;

        info!(
            "🔁 Respawner is now {}",
            if active { "activated" } else { "deactivated" }
        );
        Ok(active)
    }

    /// Whether `name` is in the checked list (exact match).
    pub async fn is_checked_world(&self, name: &str) -> bool {
        self.state.lock().await.is_checked(name)
    }

    /// Whether `name` is the destination (ignoring case).
    pub async fn is_destination_world(&self, name: &str) -> bool {
        self.state.lock().await.is_destination(name)
    }

    /// Decides whether a player logging into `player_world` is redirected.
    ///
    /// Returns the destination handle iff the policy is active, the checked
    /// list is non-empty, the destination resolved, and `player_world`
    /// matches a checked world ignoring case.
    pub async fn decide_redirect(&self, player_world: &str) -> Option<WorldHandle> {
        self.state.lock().await.decide(player_world)
    }

    /// Copy of the current policy values.
    pub async fn snapshot(&self) -> PolicySnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// The resolved destination world, if any.
    pub async fn destination_handle(&self) -> Option<WorldHandle> {
        self.state.lock().await.destination_handle.clone()
    }

    async fn commit(&self, state: &mut PolicyState, next: PolicySnapshot) -> Result<(), RespawnError> {
        self.storage.save(&next).await?;
        state.snapshot = next;
        Ok(())
    }
}
