//! # Plugin Lifecycle
//!
//! [`SimplePlugin`] is the lifecycle every plugin implements, and
//! [`RespawnerPlugin`] is the respawner's implementation of it.
//!
//! 1. **Creation**: the host builds the plugin with its policy storage
//! 2. **Handler Registration**: `register_handlers()` hooks the login event
//! 3. **Initialization**: `on_init()` loads the persisted policy
//! 4. **Operation**: logins are checked, commands mutate the policy
//! 5. **Shutdown**: `on_shutdown()` reports the final state

use crate::commands::CommandRegistry;
use crate::context::{LogLevel, ServerContext};
use crate::error::{EventError, PluginError};
use crate::events::{EventBus, EventPriority, PlayerLoginEvent, PLAYER_LOGIN};
use crate::policy::RespawnPolicyStore;
use crate::storage::PolicyStorage;
use crate::types::TeleportCause;
use crate::world::{PlayerMover, WorldResolver};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Safe, high-level plugin interface.
#[async_trait]
pub trait SimplePlugin: Send + Sync + 'static {
    /// Unique, stable plugin name.
    fn name(&self) -> &str;

    /// Semantic version of the plugin.
    fn version(&self) -> &str;

    /// Registers event handlers. Called before `on_init()`.
    async fn register_handlers(
        &mut self,
        events: Arc<EventBus>,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError>;

    /// Initializes the plugin with server context.
    async fn on_init(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(())
    }

    /// Shuts the plugin down. Errors are logged but do not prevent unloading.
    async fn on_shutdown(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Teleports players logging into checked worlds to the destination spawn.
#[derive(Debug)]
pub struct RespawnerPlugin {
    name: String,
    store: Arc<RespawnPolicyStore>,
    commands: CommandRegistry,
    redirects: Arc<AtomicU64>,
}

impl RespawnerPlugin {
    pub fn new(storage: Arc<dyn PolicyStorage>, worlds: Arc<dyn WorldResolver>) -> Self {
        let store = Arc::new(RespawnPolicyStore::new(storage, Arc::clone(&worlds)));
        let commands = CommandRegistry::new(Arc::clone(&store), worlds);
        Self {
            name: "player_respawner".to_string(),
            store,
            commands,
            redirects: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> Arc<RespawnPolicyStore> {
        Arc::clone(&self.store)
    }

    /// The `/player_respawn` command bound to this plugin's policy.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Number of players redirected since the plugin was created.
    pub fn redirect_count(&self) -> u64 {
        self.redirects.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SimplePlugin for RespawnerPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn register_handlers(
        &mut self,
        events: Arc<EventBus>,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError> {
        info!("🌀 RespawnerPlugin: Registering event handlers...");

        let store = Arc::clone(&self.store);
        let worlds = context.worlds();
        let players = context.players();
        let redirects = Arc::clone(&self.redirects);

        events
            .on_core(PLAYER_LOGIN, EventPriority::Highest, move |event: PlayerLoginEvent| {
                let store = Arc::clone(&store);
                let worlds = Arc::clone(&worlds);
                let players = Arc::clone(&players);
                let redirects = Arc::clone(&redirects);
                async move {
                    if handle_player_login(event, &store, worlds.as_ref(), players.as_ref()).await? {
                        redirects.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(())
                }
            })
            .map_err(|e| PluginError::InitializationFailed(e.to_string()))?;

        info!("🌀 RespawnerPlugin: ✅ Login handler registered");
        Ok(())
    }

    async fn on_init(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        self.store
            .load(false)
            .await
            .map_err(|e| PluginError::InitializationFailed(e.to_string()))?;

        let snapshot = self.store.snapshot().await;
        context.log(
            LogLevel::Info,
            &format!(
                "🌀 RespawnerPlugin: Ready ({}, {} checked worlds)",
                if snapshot.active { "active" } else { "inactive" },
                snapshot.worlds.len()
            ),
        );
        Ok(())
    }

    async fn on_shutdown(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        context.log(
            LogLevel::Info,
            &format!(
                "🌀 RespawnerPlugin: Shutting down. Redirected {} players total!",
                self.redirect_count()
            ),
        );
        Ok(())
    }
}

/// Redirects the player in `event` if the policy says so.
///
/// Returns whether the player was teleported. A failed teleport is reported
/// as a handler error so the bus logs it; it never affects other handlers.
pub async fn handle_player_login(
    event: PlayerLoginEvent,
    store: &RespawnPolicyStore,
    worlds: &dyn WorldResolver,
    players: &dyn PlayerMover,
) -> Result<bool, EventError> {
    let Some(destination) = store.decide_redirect(&event.world).await else {
        debug!(
            "🌀 {} logged into '{}': no redirect",
            event.player_name, event.world
        );
        return Ok(false);
    };

    let Some(spawn) = worlds.spawn_location(&destination) else {
        return Err(EventError::HandlerExecution(format!(
            "destination world '{}' has no spawn location",
            destination
        )));
    };

    players
        .teleport(event.player_id, spawn.clone(), TeleportCause::Plugin)
        .await
        .map_err(|e| {
            EventError::HandlerExecution(format!(
                "could not teleport {} to {}: {}",
                event.player_name, destination, e
            ))
        })?;

    info!(
        "🌀 Sent {} from '{}' to the spawn of '{}' at {}",
        event.player_name, event.world, destination, spawn.position
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryPolicyStorage, PolicySnapshot};
    use crate::test_support::{RecordingMover, TestWorlds};
    use crate::types::PlayerId;

    #[derive(Debug)]
    struct TestContext {
        events: Arc<EventBus>,
        worlds: Arc<TestWorlds>,
        players: Arc<RecordingMover>,
    }

    impl ServerContext for TestContext {
        fn events(&self) -> Arc<EventBus> {
            self.events.clone()
        }

        fn worlds(&self) -> Arc<dyn WorldResolver> {
            self.worlds.clone()
        }

        fn players(&self) -> Arc<dyn PlayerMover> {
            self.players.clone()
        }

        fn log(&self, _level: LogLevel, _message: &str) {}
    }

    async fn running_plugin(
        initial: PolicySnapshot,
        world_names: &[&str],
        players: RecordingMover,
    ) -> (RespawnerPlugin, Arc<TestContext>) {
        let worlds = Arc::new(TestWorlds::with_worlds(world_names));
        let context = Arc::new(TestContext {
            events: Arc::new(EventBus::new()),
            worlds: worlds.clone(),
            players: Arc::new(players),
        });
        let storage = Arc::new(MemoryPolicyStorage::with_snapshot(initial));
        let mut plugin = RespawnerPlugin::new(storage, worlds);

        plugin
            .register_handlers(context.events(), context.clone())
            .await
            .unwrap();
        plugin.on_init(context.clone()).await.unwrap();
        (plugin, context)
    }

    fn policy(active: bool) -> PolicySnapshot {
        PolicySnapshot {
            active,
            worlds: vec!["limbo".to_string()],
            destination: Some("spawn".to_string()),
        }
    }

    #[tokio::test]
    async fn test_login_from_checked_world_teleports_to_spawn() {
        let (plugin, context) =
            running_plugin(policy(true), &["spawn", "limbo", "nether"], RecordingMover::new()).await;
        let steve = PlayerId::new();

        context
            .events
            .emit_core(PLAYER_LOGIN, &PlayerLoginEvent::new(steve, "Steve", "Limbo"))
            .await
            .unwrap();

        let teleports = context.players.recorded();
        assert_eq!(teleports.len(), 1);
        let (player, location, cause) = &teleports[0];
        assert_eq!(*player, steve);
        assert_eq!(location.world.name(), "spawn");
        assert_eq!(*cause, TeleportCause::Plugin);
        assert_eq!(plugin.redirect_count(), 1);
    }

    #[tokio::test]
    async fn test_login_from_other_world_is_ignored() {
        let (plugin, context) =
            running_plugin(policy(true), &["spawn", "limbo", "nether"], RecordingMover::new()).await;

        context
            .events
            .emit_core(PLAYER_LOGIN, &PlayerLoginEvent::new(PlayerId::new(), "Alex", "nether"))
            .await
            .unwrap();

        assert!(context.players.recorded().is_empty());
        assert_eq!(plugin.redirect_count(), 0);
    }

    #[tokio::test]
    async fn test_inactive_plugin_does_not_redirect() {
        let (_plugin, context) =
            running_plugin(policy(false), &["spawn", "limbo"], RecordingMover::new()).await;

        context
            .events
            .emit_core(PLAYER_LOGIN, &PlayerLoginEvent::new(PlayerId::new(), "Steve", "limbo"))
            .await
            .unwrap();

        assert!(context.players.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_failed_teleport_is_counted_by_bus() {
        let (plugin, context) =
            running_plugin(policy(true), &["spawn", "limbo"], RecordingMover::failing()).await;

        context
            .events
            .emit_core(PLAYER_LOGIN, &PlayerLoginEvent::new(PlayerId::new(), "Steve", "limbo"))
            .await
            .unwrap();

        assert_eq!(context.events.stats().handler_failures, 1);
        assert_eq!(plugin.redirect_count(), 0);
    }

    #[tokio::test]
    async fn test_handler_registered_at_highest_priority() {
        let (_plugin, context) = running_plugin(policy(true), &["spawn"], RecordingMover::new()).await;
        assert_eq!(context.events.handler_count(PLAYER_LOGIN), 1);
    }

    #[tokio::test]
    async fn test_commands_share_the_plugin_policy() {
        use crate::test_support::TestSender;

        let (plugin, _context) =
            running_plugin(PolicySnapshot::default(), &["spawn", "limbo"], RecordingMover::new()).await;
        let sender = TestSender::admin();

        plugin.commands().dispatch(&sender, &["add", "limbo"]).await.unwrap();
        plugin.commands().dispatch(&sender, &["dest", "spawn"]).await.unwrap();

        assert!(plugin.store().is_checked_world("limbo").await);
        assert!(plugin.store().decide_redirect("limbo").await.is_some());
    }

    #[test]
    fn test_plugin_metadata() {
        let plugin = RespawnerPlugin::new(
            Arc::new(MemoryPolicyStorage::new()),
            Arc::new(TestWorlds::new()),
        );
        assert_eq!(plugin.name(), "player_respawner");
        assert_eq!(plugin.version(), env!("CARGO_PKG_VERSION"));
    }
}
