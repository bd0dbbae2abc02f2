//! # Administrative Commands
//!
//! The `/player_respawn` command (alias `/p_resp`) and its subcommands. The
//! command table is static; dispatch looks a subcommand up by name or alias
//! and delegates to the [`RespawnPolicyStore`].
//!
//! World arguments are checked against the host's [`WorldResolver`] before
//! the store is touched, and are replaced by the world's canonical name, so
//! the store only ever sees names of worlds that existed at the time.

use crate::error::RespawnError;
use crate::policy::RespawnPolicyStore;
use crate::world::WorldResolver;
use std::sync::Arc;
use tracing::debug;

/// Primary name of the root command.
pub const ROOT_COMMAND: &str = "player_respawn";

/// Every label the root command answers to.
pub const ROOT_ALIASES: &[&str] = &[ROOT_COMMAND, "p_resp"];

/// Permission node required for every subcommand.
pub const ADMIN_PERMISSION: &str = "respawn.admin";

/// Whoever issued a command: a player or the console.
pub trait CommandSender: Send + Sync {
    fn name(&self) -> &str;
    fn has_permission(&self, node: &str) -> bool;
    fn send_message(&self, message: &str);
}

/// The subcommands of `/player_respawn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    List,
    Show,
    Reload,
    Toggle,
    Add,
    Remove,
    Destination,
    Help,
}

/// Static description of one subcommand.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub command: Subcommand,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Argument syntax; subcommands with a syntax take a world name
    pub syntax: Option<&'static str>,
    pub description: &'static str,
}

impl CommandSpec {
    fn matches(&self, label: &str) -> bool {
        self.name.eq_ignore_ascii_case(label)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(label))
    }

    pub fn takes_world(&self) -> bool {
        self.syntax.is_some()
    }

    pub fn usage(&self) -> String {
        match self.syntax {
            Some(syntax) => format!("/{ROOT_COMMAND} {} {syntax}", self.name),
            None => format!("/{ROOT_COMMAND} {}", self.name),
        }
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: Subcommand::List,
        name: "list",
        aliases: &["ls"],
        syntax: None,
        description: "List the worlds that will be checked when players log in.",
    },
    CommandSpec {
        command: Subcommand::Show,
        name: "show",
        aliases: &[],
        syntax: None,
        description: "Show the destination world.",
    },
    CommandSpec {
        command: Subcommand::Reload,
        name: "reload",
        aliases: &[],
        syntax: None,
        description: "Reload the plugin's configuration.",
    },
    CommandSpec {
        command: Subcommand::Toggle,
        name: "toggle",
        aliases: &[],
        syntax: None,
        description: "Toggles whether the plugin is active or inactive.",
    },
    CommandSpec {
        command: Subcommand::Add,
        name: "add",
        aliases: &[],
        syntax: Some("<world_to_add>"),
        description: "Add the specified world to the list of checked worlds.",
    },
    CommandSpec {
        command: Subcommand::Remove,
        name: "remove",
        aliases: &[],
        syntax: Some("<world_to_remove>"),
        description: "Remove the specified world from the list of checked worlds.",
    },
    CommandSpec {
        command: Subcommand::Destination,
        name: "dest",
        aliases: &["destination"],
        syntax: Some("<destination_world>"),
        description: "Set the destination world, where players will be sent.",
    },
    CommandSpec {
        command: Subcommand::Help,
        name: "help",
        aliases: &["?"],
        syntax: None,
        description: "Show command usage.",
    },
];

/// How a dispatched command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command ran
    Handled,
    /// The arguments or the policy rejected the request
    Rejected,
    /// The sender lacks the admin permission
    Denied,
    /// No such subcommand
    Unknown,
}

/// Dispatches `/player_respawn` subcommands to the policy store.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    store: Arc<RespawnPolicyStore>,
    worlds: Arc<dyn WorldResolver>,
}

impl CommandRegistry {
    pub fn new(store: Arc<RespawnPolicyStore>, worlds: Arc<dyn WorldResolver>) -> Self {
        Self { store, worlds }
    }

    /// Whether `label` names the root command.
    pub fn is_root(label: &str) -> bool {
        ROOT_ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(label))
    }

    /// Finds a subcommand by name or alias, ignoring case.
    pub fn lookup(label: &str) -> Option<&'static CommandSpec> {
        COMMANDS.iter().find(|spec| spec.matches(label))
    }

    /// One usage line per subcommand.
    pub fn help_lines() -> Vec<String> {
        COMMANDS
            .iter()
            .map(|spec| format!("{} - {}", spec.usage(), spec.description))
            .collect()
    }

    /// Runs the subcommand in `args` (the tokens after the root label).
    ///
    /// User-facing results are sent to `sender`; only persistence failures
    /// are returned as errors.
    pub async fn dispatch(
        &self,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<CommandOutcome, RespawnError> {
        if !sender.has_permission(ADMIN_PERMISSION) {
            debug!("{} lacks {} for /{}", sender.name(), ADMIN_PERMISSION, ROOT_COMMAND);
            sender.send_message("You do not have permission to use this command.");
            return Ok(CommandOutcome::Denied);
        }

        let Some(label) = args.first() else {
            self.show_help(sender);
            return Ok(CommandOutcome::Handled);
        };

        let Some(spec) = Self::lookup(label) else {
            sender.send_message(&format!("Unknown subcommand '{label}'."));
            self.show_help(sender);
            return Ok(CommandOutcome::Unknown);
        };

        debug!("{} ran /{} {}", sender.name(), ROOT_COMMAND, args.join(" "));

        match spec.command {
            Subcommand::List => {
                let snapshot = self.store.snapshot().await;
                let mut listing = String::from("Checked Worlds\n--------------\n");
                for name in &snapshot.worlds {
                    listing.push_str(name);
                    listing.push('\n');
                }
                sender.send_message(&listing);
            }
            Subcommand::Show => {
                let snapshot = self.store.snapshot().await;
                sender.send_message(&format!(
                    "Destination: {}",
                    snapshot.destination.as_deref().unwrap_or("none")
                ));
            }
            Subcommand::Reload => {
                sender.send_message("Reloading config...");
                self.store.load(true).await?;
                sender.send_message("Config reloaded.");
            }
            Subcommand::Toggle => {
                let active = self.store.toggle_active().await?;
                sender.send_message(&format!(
                    "Plugin is now {}!",
                    if active { "activated" } else { "deactivated" }
                ));
            }
            Subcommand::Add => {
                let Some(world) = self.world_argument(sender, spec, args) else {
                    return Ok(CommandOutcome::Rejected);
                };
                let accepted = self.store.add_checked_world(&world).await?;
                return Ok(report(
                    sender,
                    accepted,
                    &format!("Added '{world}' to the checked worlds."),
                    "Error, could not add that world to the list!",
                ));
            }
            Subcommand::Remove => {
                let Some(world) = self.world_argument(sender, spec, args) else {
                    return Ok(CommandOutcome::Rejected);
                };
                let accepted = self.store.remove_checked_world(&world).await?;
                return Ok(report(
                    sender,
                    accepted,
                    &format!("Removed '{world}' from the checked worlds."),
                    "Error, could not remove that world from the list!",
                ));
            }
            Subcommand::Destination => {
                let Some(world) = self.world_argument(sender, spec, args) else {
                    return Ok(CommandOutcome::Rejected);
                };
                let accepted = self.store.set_destination(&world).await?;
                return Ok(report(
                    sender,
                    accepted,
                    &format!("Destination set to '{world}'."),
                    "Error, unable to set that world as the destination!",
                ));
            }
            Subcommand::Help => self.show_help(sender),
        }

        Ok(CommandOutcome::Handled)
    }

    /// Resolves the world argument of `spec` to its canonical name, telling
    /// the sender why when it cannot.
    fn world_argument(
        &self,
        sender: &dyn CommandSender,
        spec: &CommandSpec,
        args: &[&str],
    ) -> Option<String> {
        let Some(argument) = args.get(1) else {
            sender.send_message(&format!("Usage: {}", spec.usage()));
            return None;
        };
        match self.worlds.resolve(argument) {
            Some(world) => Some(world.name),
            None => {
                sender.send_message("Invalid World!");
                None
            }
        }
    }

    /// Completion candidates for the last token of `args`.
    pub fn complete(&self, args: &[&str]) -> Vec<String> {
        match args {
            [] => COMMANDS.iter().map(|spec| spec.name.to_string()).collect(),
            [prefix] => COMMANDS
                .iter()
                .filter(|spec| starts_with_ignore_case(spec.name, prefix))
                .map(|spec| spec.name.to_string())
                .collect(),
            [label, prefix] => match Self::lookup(label) {
                Some(spec) if spec.takes_world() => {
                    let mut names: Vec<String> = self
                        .worlds
                        .world_names()
                        .into_iter()
                        .filter(|name| starts_with_ignore_case(name, prefix))
                        .collect();
                    names.sort();
                    names
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn show_help(&self, sender: &dyn CommandSender) {
        for line in Self::help_lines() {
            sender.send_message(&line);
        }
    }
}

fn report(
    sender: &dyn CommandSender,
    accepted: bool,
    success: &str,
    failure: &str,
) -> CommandOutcome {
    if accepted {
        sender.send_message(success);
        CommandOutcome::Handled
    } else {
        sender.send_message(failure);
        CommandOutcome::Rejected
    }
}

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate.to_lowercase().starts_with(&prefix.to_lowercase())
}
