//! Main application logic and lifecycle management.
//!
//! [`Application`] owns the host services and the respawner plugin, drives
//! the plugin lifecycle and runs the admin console until shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    console::{ConsoleInput, ConsoleSender, CONSOLE_HELP},
    logging::display_banner,
    signals::wait_for_shutdown_signal,
    world::{ConsoleContext, PlayerRegistry, WorldRegistry},
};
use plugin_respawner::{
    EventBus, PlayerLoginEvent, RespawnerPlugin, ServerContext, SimplePlugin, TomlPolicyStorage,
    Vec3, WorldResolver, PLAYER_LOGIN,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// The console host.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    events: Arc<EventBus>,
    worlds: Arc<WorldRegistry>,
    players: Arc<PlayerRegistry>,
    context: Arc<ConsoleContext>,
    plugin: RespawnerPlugin,
}

impl Application {
    /// Creates the host from command-line arguments.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Load the configured worlds and build the plugin
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(policy_file) = args.policy_file {
            config.plugin.policy_file = policy_file.to_string_lossy().to_string();
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        display_banner();

        let worlds = Arc::new(WorldRegistry::new());
        for world in &config.worlds {
            worlds.create(&world.name, Vec3::from(world.spawn))?;
        }

        let events = Arc::new(EventBus::new());
        let players = Arc::new(PlayerRegistry::new());
        let context = Arc::new(ConsoleContext::new(
            Arc::clone(&events),
            Arc::clone(&worlds),
            Arc::clone(&players),
        ));

        let storage = Arc::new(TomlPolicyStorage::new(config.policy_path()));
        let plugin = RespawnerPlugin::new(storage, worlds.clone());

        Ok(Self {
            config,
            events,
            worlds,
            players,
            context,
            plugin,
        })
    }

    /// Runs the console until `quit`, end of input or a termination signal.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting respawner console host");
        self.log_configuration_summary();
        self.start().await?;

        info!("✅ Console ready. Type `help` for commands.");
        info!("🛑 Press Ctrl+C to shut down");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let shutdown = wait_for_shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        let input = match ConsoleInput::parse(&line) {
                            Ok(input) => input,
                            Err(usage) => {
                                println!("{usage}");
                                continue;
                            }
                        };
                        if !self.execute(input).await {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("📭 Console input closed");
                        break;
                    }
                    Err(e) => {
                        error!("❌ Failed to read console input: {}", e);
                        break;
                    }
                },
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("❌ Signal handler failed: {}", e);
                    }
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Registers the plugin's handlers and initializes it.
    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let context: Arc<dyn ServerContext> = self.context.clone();
        info!("🔌 Loading plugin {} v{}", self.plugin.name(), self.plugin.version());
        self.plugin
            .register_handlers(Arc::clone(&self.events), Arc::clone(&context))
            .await?;
        self.plugin.on_init(context).await?;

        let stats = self.events.stats();
        info!("📊 Initial Event System State:");
        info!("  - Handlers registered: {}", stats.total_handlers);
        Ok(())
    }

    /// Shuts the plugin down and reports final statistics.
    pub async fn shutdown(&mut self) {
        info!("🔌 Shutting down plugins...");
        let context: Arc<dyn ServerContext> = self.context.clone();
        if let Err(e) = self.plugin.on_shutdown(context).await {
            error!("❌ Plugin shutdown failed: {}", e);
        }

        let stats = self.events.stats();
        info!("📊 Final Statistics:");
        info!("  - Total events processed: {}", stats.events_emitted);
        info!("  - Handler failures: {}", stats.handler_failures);
        info!("✅ Respawner shutdown complete");
    }

    /// Executes one console command. Returns `false` when the host should stop.
    pub async fn execute(&mut self, input: ConsoleInput) -> bool {
        match input {
            ConsoleInput::Empty => {}
            ConsoleInput::Respawn(args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                if let Err(e) = self.plugin.commands().dispatch(&ConsoleSender, &args).await {
                    error!("❌ Respawner command failed: {}", e);
                    println!("Command failed: {e}");
                }
            }
            ConsoleInput::Worlds => {
                for (world, spawn) in self.worlds.list() {
                    println!("{} (spawn {})", world, spawn);
                }
            }
            ConsoleInput::CreateWorld { name, spawn } => {
                let spawn = spawn.unwrap_or_else(|| Vec3::new(0.5, 64.0, 0.5));
                match self.worlds.create(&name, spawn) {
                    Ok(world) => println!("Created world '{world}'."),
                    Err(e) => println!("{e}"),
                }
            }
            ConsoleInput::DeleteWorld(name) => match self.worlds.delete(&name) {
                Some(world) => println!("Deleted world '{world}'."),
                None => println!("Invalid World!"),
            },
            ConsoleInput::Login { player, world } => self.login(&player, &world).await,
            ConsoleInput::Players => {
                for (id, record) in self.players.list() {
                    match &record.location {
                        Some(location) => println!("{} ({}) at {}", record.name, id, location),
                        None => println!("{} ({}) in {}", record.name, id, record.login_world),
                    }
                }
            }
            ConsoleInput::Stats => {
                let stats = self.events.stats();
                println!(
                    "events emitted: {} | handlers: {} | handler failures: {} | redirects: {} | worlds: {} | players: {}",
                    stats.events_emitted,
                    stats.total_handlers,
                    stats.handler_failures,
                    self.plugin.redirect_count(),
                    self.worlds.len(),
                    self.players.len()
                );
            }
            ConsoleInput::Help => {
                for line in CONSOLE_HELP {
                    println!("{line}");
                }
            }
            ConsoleInput::Quit => return false,
        }
        true
    }

    async fn login(&self, player: &str, world: &str) {
        let Some(handle) = self.worlds.resolve(world) else {
            println!("Invalid World!");
            return;
        };

        let id = self.players.join(player, handle.name());
        let event = PlayerLoginEvent::new(id, player, handle.name());
        if let Err(e) = self.events.emit_core(PLAYER_LOGIN, &event).await {
            warn!("⚠️ Failed to emit login for {}: {}", player, e);
            return;
        }

        match self.players.get(id).and_then(|record| record.location) {
            Some(location) => println!("{player} logged in and was sent to {location}."),
            None => println!("{player} logged in to '{handle}'."),
        }
    }

    /// Path of the respawn policy file in use.
    pub fn policy_path(&self) -> PathBuf {
        self.config.policy_path()
    }

    pub fn plugin(&self) -> &RespawnerPlugin {
        &self.plugin
    }

    pub fn players(&self) -> Arc<PlayerRegistry> {
        Arc::clone(&self.players)
    }

    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  📄 Policy file: {}", self.config.plugin.policy_file);
        info!("  🌍 Worlds: {}", self.worlds.world_names().join(", "));
        info!("  🔧 Log level: {}", self.config.logging.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn application(dir: &TempDir) -> Application {
        let args = CliArgs {
            config_path: dir.path().join("respawner.toml"),
            policy_file: Some(dir.path().join("respawn.toml")),
            log_level: None,
            json_logs: false,
        };
        let mut app = Application::new(args).await.unwrap();
        app.start().await.unwrap();
        app
    }

    async fn run_line(app: &mut Application, line: &str) -> bool {
        app.execute(ConsoleInput::parse(line).unwrap()).await
    }

    #[tokio::test]
    async fn test_new_creates_config_and_worlds() {
        let dir = TempDir::new().unwrap();
        let app = application(&dir).await;

        assert!(dir.path().join("respawner.toml").exists());
        assert!(dir.path().join("respawn.toml").exists());
        assert_eq!(app.policy_path(), dir.path().join("respawn.toml"));
        assert_eq!(app.worlds.world_names(), ["world", "world_nether", "world_the_end"]);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        let args = CliArgs {
            config_path: dir.path().join("respawner.toml"),
            policy_file: None,
            log_level: Some("loud".to_string()),
            json_logs: false,
        };

        assert!(Application::new(args).await.is_err());
    }

    #[tokio::test]
    async fn test_console_session_redirects_login() {
        let dir = TempDir::new().unwrap();
        let mut app = application(&dir).await;

        assert!(run_line(&mut app, "world create limbo").await);
        run_line(&mut app, "player_respawn add limbo").await;
        run_line(&mut app, "p_resp dest world").await;
        run_line(&mut app, "login Steve limbo").await;
        run_line(&mut app, "login Alex world_nether").await;

        let players = app.players().list();
        let steve = players.iter().find(|(_, p)| p.name == "Steve").unwrap();
        let alex = players.iter().find(|(_, p)| p.name == "Alex").unwrap();
        assert_eq!(steve.1.location.as_ref().unwrap().world.name(), "world");
        assert!(alex.1.location.is_none());
        assert_eq!(app.plugin().redirect_count(), 1);
    }

    #[tokio::test]
    async fn test_login_into_unknown_world_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = application(&dir).await;

        run_line(&mut app, "login Steve atlantis").await;

        assert!(app.players().is_empty());
        assert_eq!(app.events.stats().events_emitted, 0);
    }

    #[tokio::test]
    async fn test_deleted_destination_fails_redirects() {
        let dir = TempDir::new().unwrap();
        let mut app = application(&dir).await;

        run_line(&mut app, "player_respawn add world_nether").await;
        run_line(&mut app, "player_respawn dest world_the_end").await;
        run_line(&mut app, "world delete world_the_end").await;
        run_line(&mut app, "login Steve world_nether").await;

        assert_eq!(app.plugin().redirect_count(), 0);
        assert_eq!(app.events.stats().handler_failures, 1);
        let players = app.players().list();
        assert!(players[0].1.location.is_none());
    }

    #[tokio::test]
    async fn test_policy_written_by_commands() {
        let dir = TempDir::new().unwrap();
        let mut app = application(&dir).await;

        run_line(&mut app, "player_respawn add world_nether").await;
        run_line(&mut app, "player_respawn dest world").await;
        run_line(&mut app, "player_respawn toggle").await;

        let written = tokio::fs::read_to_string(dir.path().join("respawn.toml"))
            .await
            .unwrap();
        assert!(written.contains("active = false"));
        assert!(written.contains("world_nether"));
        assert!(written.contains("destination = \"world\""));
    }

    #[tokio::test]
    async fn test_quit_stops_console() {
        let dir = TempDir::new().unwrap();
        let mut app = application(&dir).await;

        assert!(run_line(&mut app, "stats").await);
        assert!(!run_line(&mut app, "quit").await);
        app.shutdown().await;
    }
}
