//! Admin console: line parsing and the console command sender.

use plugin_respawner::{CommandRegistry, CommandSender, Vec3};

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    /// Blank line
    Empty,
    /// Plugin command: the tokens after the root alias
    Respawn(Vec<String>),
    /// `worlds`
    Worlds,
    /// `world create <name> [x y z]`
    CreateWorld { name: String, spawn: Option<Vec3> },
    /// `world delete <name>`
    DeleteWorld(String),
    /// `login <player_name> <world>`
    Login { player: String, world: String },
    /// `players`
    Players,
    /// `stats`
    Stats,
    /// `help`
    Help,
    /// `quit` or `exit`
    Quit,
}

impl ConsoleInput {
    /// Parses a console line. Errors carry a usage hint for the operator.
    pub fn parse(line: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = tokens.split_first() else {
            return Ok(Self::Empty);
        };
        let head = head.strip_prefix('/').unwrap_or(head);

        if CommandRegistry::is_root(head) {
            return Ok(Self::Respawn(rest.iter().map(|s| s.to_string()).collect()));
        }

        match (head.to_ascii_lowercase().as_str(), rest) {
            ("worlds", []) => Ok(Self::Worlds),
            ("world", ["create", name]) => Ok(Self::CreateWorld {
                name: name.to_string(),
                spawn: None,
            }),
            ("world", ["create", name, x, y, z]) => Ok(Self::CreateWorld {
                name: name.to_string(),
                spawn: Some(parse_position(x, y, z)?),
            }),
            ("world", ["delete", name]) => Ok(Self::DeleteWorld(name.to_string())),
            ("world", _) => Err("Usage: world create <name> [x y z] | world delete <name>".to_string()),
            ("login", [player, world]) => Ok(Self::Login {
                player: player.to_string(),
                world: world.to_string(),
            }),
            ("login", _) => Err("Usage: login <player_name> <world>".to_string()),
            ("players", []) => Ok(Self::Players),
            ("stats", []) => Ok(Self::Stats),
            ("help", []) => Ok(Self::Help),
            ("quit" | "exit", []) => Ok(Self::Quit),
            _ => Err(format!("Unknown console command '{head}'. Type `help` for a list.")),
        }
    }
}

fn parse_position(x: &str, y: &str, z: &str) -> Result<Vec3, String> {
    let coord = |raw: &str| {
        raw.parse::<f64>()
            .map_err(|_| format!("Invalid coordinate '{raw}'"))
    };
    Ok(Vec3::new(coord(x)?, coord(y)?, coord(z)?))
}

/// Console grammar, one line per form.
pub const CONSOLE_HELP: &[&str] = &[
    "player_respawn <subcommand> [world] - run a respawner command (alias: p_resp)",
    "worlds - list loaded worlds",
    "world create <name> [x y z] - load a world with an optional spawn point",
    "world delete <name> - unload a world",
    "login <player_name> <world> - simulate a player logging into a world",
    "players - list online players",
    "stats - show event bus statistics",
    "quit - shut down",
];

/// The operator at the terminal. Holds every permission.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSender;

impl CommandSender for ConsoleSender {
    fn name(&self) -> &str {
        "CONSOLE"
    }

    fn has_permission(&self, _node: &str) -> bool {
        true
    }

    fn send_message(&self, message: &str) {
        println!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_command_aliases() {
        assert_eq!(
            ConsoleInput::parse("player_respawn add limbo"),
            Ok(ConsoleInput::Respawn(vec!["add".to_string(), "limbo".to_string()]))
        );
        assert_eq!(
            ConsoleInput::parse("/p_resp list"),
            Ok(ConsoleInput::Respawn(vec!["list".to_string()]))
        );
        assert_eq!(
            ConsoleInput::parse("P_RESP"),
            Ok(ConsoleInput::Respawn(Vec::new()))
        );
    }

    #[test]
    fn test_world_commands() {
        assert_eq!(
            ConsoleInput::parse("world create lobby"),
            Ok(ConsoleInput::CreateWorld {
                name: "lobby".to_string(),
                spawn: None
            })
        );
        assert_eq!(
            ConsoleInput::parse("world create arena 10 64.5 -3"),
            Ok(ConsoleInput::CreateWorld {
                name: "arena".to_string(),
                spawn: Some(Vec3::new(10.0, 64.5, -3.0))
            })
        );
        assert_eq!(
            ConsoleInput::parse("world delete arena"),
            Ok(ConsoleInput::DeleteWorld("arena".to_string()))
        );
        assert!(ConsoleInput::parse("world create arena 1 2").is_err());
        assert!(ConsoleInput::parse("world create arena 1 two 3")
            .unwrap_err()
            .contains("Invalid coordinate 'two'"));
    }

    #[test]
    fn test_login_and_simple_commands() {
        assert_eq!(
            ConsoleInput::parse("  login Steve world_nether  "),
            Ok(ConsoleInput::Login {
                player: "Steve".to_string(),
                world: "world_nether".to_string()
            })
        );
        assert!(ConsoleInput::parse("login Steve").is_err());
        assert_eq!(ConsoleInput::parse(""), Ok(ConsoleInput::Empty));
        assert_eq!(ConsoleInput::parse("worlds"), Ok(ConsoleInput::Worlds));
        assert_eq!(ConsoleInput::parse("players"), Ok(ConsoleInput::Players));
        assert_eq!(ConsoleInput::parse("STATS"), Ok(ConsoleInput::Stats));
        assert_eq!(ConsoleInput::parse("exit"), Ok(ConsoleInput::Quit));
    }

    #[test]
    fn test_unknown_command() {
        let err = ConsoleInput::parse("teleport Steve").unwrap_err();
        assert!(err.contains("Unknown console command 'teleport'"));
    }

    #[test]
    fn test_console_has_every_permission() {
        assert!(ConsoleSender.has_permission("respawn.admin"));
        assert_eq!(ConsoleSender.name(), "CONSOLE");
    }
}
