//! Named editor commands
//!
//! Console-style entry points into the session: `editor_write <name>`,
//! `editor_read <name>`, `editor_build <name>`, `editor_add_quad [x y]`,
//! `editor_place <kind> [x y]` and `editor_help`. A command line is split on
//! whitespace; the first word picks the command.

use std::collections::BTreeMap;

use super::state::EditorSession;
use crate::math::Vec2;
use crate::storage::is_valid_level_name;
use crate::world::{EntityKind, LevelError};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("{command}: missing argument <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{command}: invalid argument '{value}'")]
    InvalidArgument { command: &'static str, value: String },
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Command handlers see the registry so `editor_help` can list it
type Handler = fn(&CommandRegistry, &mut EditorSession, &[&str]) -> Result<String, CommandError>;

/// A registered command
#[derive(Clone)]
pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    handler: Handler,
}

/// Registry of editor commands, ordered by name
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Command>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        let mut registry = Self {
            commands: BTreeMap::new(),
        };
        registry.register("editor_write", "editor_write <name>", "Save res/editor/<name>.editor", cmd_write);
        registry.register("editor_read", "editor_read <name>", "Load res/editor/<name>.editor", cmd_read);
        registry.register("editor_build", "editor_build <name>", "Bake res/level/<name>.level", cmd_build);
        registry.register("editor_add_quad", "editor_add_quad [x y]", "Add a 2x2 quad at x y or the cursor", cmd_add_quad);
        registry.register("editor_place", "editor_place <kind> [x y]", "Place an entity at x y or the cursor", cmd_place);
        registry.register("editor_new", "editor_new", "Start an empty level", cmd_new);
        registry.register("editor_help", "editor_help", "List editor commands", cmd_help);
        registry
    }
}

impl CommandRegistry {
    pub fn register(&mut self, name: &'static str, usage: &'static str, help: &'static str, handler: Handler) {
        self.commands.insert(
            name,
            Command {
                name,
                usage,
                help,
                handler,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Run a command line against `session`, returning its output
    pub fn execute(&self, session: &mut EditorSession, line: &str) -> Result<String, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(String::new());
        };
        let args: Vec<&str> = words.collect();
        let command = self
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        (command.handler)(self, session, &args)
    }

    pub fn help(&self) -> String {
        self.commands()
            .map(|c| format!("{:<28} {}", c.usage, c.help))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn level_name(command: &'static str, args: &[&str]) -> Result<String, CommandError> {
    let name = args.first().ok_or(CommandError::MissingArgument {
        command,
        argument: "name",
    })?;
    if !is_valid_level_name(name) {
        return Err(CommandError::InvalidArgument {
            command,
            value: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Optional `x y` pair; the snapped cursor when absent
fn position(command: &'static str, session: &EditorSession, args: &[&str]) -> Result<Vec2, CommandError> {
    let parse = |s: &str| {
        s.parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CommandError::InvalidArgument {
                command,
                value: s.to_string(),
            })
    };
    match args {
        [] => Ok(session.snapped_mouse),
        [x, y] => Ok(Vec2::new(parse(*x)?, parse(*y)?)),
        [_] => Err(CommandError::MissingArgument { command, argument: "y" }),
        [_, _, extra, ..] => Err(CommandError::InvalidArgument {
            command,
            value: extra.to_string(),
        }),
    }
}

fn cmd_write(_registry: &CommandRegistry, session: &mut EditorSession, args: &[&str]) -> Result<String, CommandError> {
    let name = level_name("editor_write", args)?;
    let written = session.write(&name)?;
    Ok(format!("Written {} bytes to '{}'.", written, session.resources.editor_path(&name).display()))
}

fn cmd_read(_registry: &CommandRegistry, session: &mut EditorSession, args: &[&str]) -> Result<String, CommandError> {
    let name = level_name("editor_read", args)?;
    session.read(&name)?;
    Ok(format!(
        "Loaded '{}': {} edges, {} entities.",
        name,
        session.level.edges.len(),
        session.level.entities.len()
    ))
}

fn cmd_build(_registry: &CommandRegistry, session: &mut EditorSession, args: &[&str]) -> Result<String, CommandError> {
    let name = level_name("editor_build", args)?;
    let written = session.build(&name)?;
    Ok(format!("Written {} bytes to '{}'.", written, session.resources.level_path(&name).display()))
}

fn cmd_add_quad(_registry: &CommandRegistry, session: &mut EditorSession, args: &[&str]) -> Result<String, CommandError> {
    let origin = position("editor_add_quad", session, args)?;
    let base = session.add_quad_at(origin);
    Ok(format!("Added quad at ({}, {}) as edges {}..{}.", origin.x, origin.y, base, base + 4))
}

fn cmd_place(_registry: &CommandRegistry, session: &mut EditorSession, args: &[&str]) -> Result<String, CommandError> {
    const COMMAND: &str = "editor_place";
    let label = args.first().ok_or(CommandError::MissingArgument {
        command: COMMAND,
        argument: "kind",
    })?;
    let kind = EntityKind::from_label(label).ok_or_else(|| CommandError::InvalidArgument {
        command: COMMAND,
        value: label.to_string(),
    })?;
    let center = position(COMMAND, session, &args[1..])?;
    match session.place_entity(kind, center) {
        Some(index) => Ok(format!("Placed {} as entity {}.", kind.label(), index)),
        None => Ok(format!(
            "Entity limit reached ({}).",
            session.level.entities.capacity()
        )),
    }
}

fn cmd_new(_registry: &CommandRegistry, session: &mut EditorSession, _args: &[&str]) -> Result<String, CommandError> {
    session.new_level();
    Ok("New level.".to_string())
}

fn cmd_help(registry: &CommandRegistry, _session: &mut EditorSession, _args: &[&str]) -> Result<String, CommandError> {
    Ok(registry.help())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorParams;
    use crate::storage::ResourceDir;
    use tempfile::TempDir;

    fn setup() -> (TempDir, EditorSession, CommandRegistry) {
        let dir = TempDir::new().unwrap();
        let session = EditorSession::new(EditorParams::default(), ResourceDir::with_base_dir(dir.path()));
        (dir, session, CommandRegistry::default())
    }

    #[test]
    fn test_write_read_build() {
        let (dir, mut session, registry) = setup();
        registry.execute(&mut session, "editor_add_quad 2 3").unwrap();
        assert_eq!(session.level.edges.get(0).unwrap().vertex, Vec2::new(1.0, 2.0));

        let out = registry.execute(&mut session, "editor_write test").unwrap();
        assert!(out.starts_with("Written "));
        assert!(dir.path().join("res/editor/test.editor").exists());

        registry.execute(&mut session, "editor_new").unwrap();
        assert!(session.level.edges.is_empty());
        registry.execute(&mut session, "editor_read test").unwrap();
        assert_eq!(session.level.edges.len(), 4);

        registry.execute(&mut session, "editor_build test").unwrap();
        assert!(dir.path().join("res/level/test.level").exists());
    }

    #[test]
    fn test_place() {
        let (_dir, mut session, registry) = setup();
        registry.execute(&mut session, "editor_place ray_emitter 1 -2").unwrap();
        let entity = session.level.entities.get(0).unwrap();
        assert_eq!(entity.kind, EntityKind::RayEmitter);
        assert_eq!(entity.bound_box.center, Vec2::new(1.0, -2.0));

        assert!(matches!(
            registry.execute(&mut session, "editor_place dragon"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            registry.execute(&mut session, "editor_place mirror 1"),
            Err(CommandError::MissingArgument { argument: "y", .. })
        ));
    }

    #[test]
    fn test_argument_errors() {
        let (_dir, mut session, registry) = setup();
        assert!(matches!(
            registry.execute(&mut session, "editor_write"),
            Err(CommandError::MissingArgument { argument: "name", .. })
        ));
        assert!(matches!(
            registry.execute(&mut session, "editor_write ../escape"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            registry.execute(&mut session, "editor_add_quad x 1"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            registry.execute(&mut session, "no_such_command"),
            Err(CommandError::UnknownCommand(_))
        ));
        assert_eq!(registry.execute(&mut session, "   ").unwrap(), "");
    }

    #[test]
    fn test_read_missing_file_is_level_error() {
        let (_dir, mut session, registry) = setup();
        let err = registry.execute(&mut session, "editor_read nothing").unwrap_err();
        assert!(matches!(err, CommandError::Level(LevelError::Io { .. })));
    }

    #[test]
    fn test_help_lists_commands() {
        let (_dir, mut session, registry) = setup();
        let help = registry.execute(&mut session, "editor_help").unwrap();
        for name in ["editor_write", "editor_read", "editor_build", "editor_add_quad", "editor_place", "editor_help"] {
            assert!(help.contains(name), "missing {}", name);
        }
    }
}
