//! The static level tree.
//!
//! Levels and commands are declared once at startup and never mutate. Each
//! level is a name table mapping tokens to either a sublevel (by arena index)
//! or a command descriptor. Usage strings are explicit fields on the command,
//! not derived from anything.

use crate::config::SkillLevel;

/// Argument-count contract, checked against the tokens after the command
/// token. `Free` commands parse their own arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Free,
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Free => true,
            Arity::Exact(want) => n == want,
            Arity::AtLeast(min) => n >= min,
            Arity::Range(min, max) => n >= min && n <= max,
        }
    }
}

/// What a command does when dispatched. The dispatcher owns the execution;
/// the tree only names the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    /// Object-definition commands; the raw slice is the object grammar.
    DefineObject,
    Show,
    Delete,
    Rename,
    Erase,
    Commit,
    Up,
    Quit,
    SetSkill,
    SetWait,
    SetOutput,
    ShowOptions,
}

#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub skill: SkillLevel,
    pub arity: Arity,
    /// Commands that start a cluster transition; the session may block on a
    /// settle wait after them.
    pub triggers_transition: bool,
    pub action: CommandAction,
}

/// A token either descends into a level or names a command.
#[derive(Debug, Clone, Copy)]
pub enum Entry {
    Level(usize),
    Command(Command),
}

#[derive(Debug)]
pub struct Level {
    pub name: &'static str,
    entries: Vec<(&'static str, Entry)>,
}

impl Level {
    fn new(name: &'static str) -> Self {
        Level {
            name,
            entries: Vec::new(),
        }
    }

    fn level(&mut self, token: &'static str, idx: usize) {
        self.entries.push((token, Entry::Level(idx)));
    }

    fn command(&mut self, cmd: Command) {
        self.entries.push((cmd.name, Entry::Command(cmd)));
    }

    fn alias(&mut self, token: &'static str, of: &'static str) {
        if let Some(entry) = self.lookup(of) {
            self.entries.push((token, entry));
        }
    }

    pub fn lookup(&self, token: &str) -> Option<Entry> {
        self.entries
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, entry)| *entry)
    }

    pub fn command_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

/// The whole tree as an arena of levels; index 0 is the root.
#[derive(Debug)]
pub struct LevelTree {
    levels: Vec<Level>,
}

pub const ROOT: usize = 0;

impl LevelTree {
    pub fn level(&self, idx: usize) -> &Level {
        &self.levels[idx]
    }
}

impl Default for LevelTree {
    fn default() -> Self {
        LevelTree::new()
    }
}

fn cmd(
    name: &'static str,
    usage: &'static str,
    skill: SkillLevel,
    arity: Arity,
    action: CommandAction,
) -> Command {
    Command {
        name,
        usage,
        skill,
        arity,
        triggers_transition: false,
        action,
    }
}

/// Commands available at every level.
fn add_common(level: &mut Level) {
    level.command(cmd(
        "up",
        "up",
        SkillLevel::Operator,
        Arity::Exact(0),
        CommandAction::Up,
    ));
    level.alias("end", "up");
    level.alias("cd", "up");
    level.command(cmd(
        "quit",
        "quit",
        SkillLevel::Operator,
        Arity::Exact(0),
        CommandAction::Quit,
    ));
    level.alias("exit", "quit");
    level.alias("bye", "quit");
}

impl LevelTree {
    pub fn new() -> Self {
        let mut root = Level::new("root");
        let mut configure = Level::new("configure");
        let mut options = Level::new("options");

        for name in [
            "primitive",
            "rsc_template",
            "group",
            "clone",
            "ms",
            "master",
            "colocation",
            "order",
            "location",
            "fencing_topology",
            "role",
            "acl_target",
            "alert",
        ] {
            configure.command(cmd(
                name,
                "<definition>",
                SkillLevel::Administrator,
                Arity::Free,
                CommandAction::DefineObject,
            ));
        }
        configure.command(cmd(
            "show",
            "show [<id> ...]",
            SkillLevel::Operator,
            Arity::Free,
            CommandAction::Show,
        ));
        configure.command(cmd(
            "delete",
            "delete <id> [<id> ...]",
            SkillLevel::Administrator,
            Arity::AtLeast(1),
            CommandAction::Delete,
        ));
        configure.command(cmd(
            "rename",
            "rename <old-id> <new-id>",
            SkillLevel::Administrator,
            Arity::Exact(2),
            CommandAction::Rename,
        ));
        configure.command(cmd(
            "erase",
            "erase",
            SkillLevel::Expert,
            Arity::Exact(0),
            CommandAction::Erase,
        ));
        configure.command(Command {
            name: "commit",
            usage: "commit",
            skill: SkillLevel::Administrator,
            arity: Arity::Exact(0),
            triggers_transition: true,
            action: CommandAction::Commit,
        });
        add_common(&mut configure);

        options.command(cmd(
            "skill-level",
            "skill-level operator|administrator|expert",
            SkillLevel::Operator,
            Arity::Exact(1),
            CommandAction::SetSkill,
        ));
        options.command(cmd(
            "wait",
            "wait yes|no",
            SkillLevel::Operator,
            Arity::Exact(1),
            CommandAction::SetWait,
        ));
        options.command(cmd(
            "output",
            "output plain|color|uppercase",
            SkillLevel::Operator,
            Arity::Exact(1),
            CommandAction::SetOutput,
        ));
        options.command(cmd(
            "show",
            "show",
            SkillLevel::Operator,
            Arity::Exact(0),
            CommandAction::ShowOptions,
        ));
        add_common(&mut options);

        root.level("configure", 1);
        root.level("options", 2);
        add_common(&mut root);

        LevelTree {
            levels: vec![root, configure, options],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_both_sublevels() {
        let tree = LevelTree::new();
        assert!(matches!(tree.level(ROOT).lookup("configure"), Some(Entry::Level(1))));
        assert!(matches!(tree.level(ROOT).lookup("options"), Some(Entry::Level(2))));
        assert!(tree.level(ROOT).lookup("frobnicate").is_none());
    }

    #[test]
    fn test_configure_command_gating_metadata() {
        let tree = LevelTree::new();
        let erase = match tree.level(1).lookup("erase") {
            Some(Entry::Command(c)) => c,
            _ => panic!("erase should be a command"),
        };
        assert_eq!(erase.skill, SkillLevel::Expert);
        assert!(!erase.triggers_transition);
        let commit = match tree.level(1).lookup("commit") {
            Some(Entry::Command(c)) => c,
            _ => panic!("commit should be a command"),
        };
        assert!(commit.triggers_transition);
    }

    #[test]
    fn test_aliases_resolve_to_the_same_action() {
        let tree = LevelTree::new();
        for token in ["quit", "exit", "bye"] {
            match tree.level(ROOT).lookup(token) {
                Some(Entry::Command(c)) => assert_eq!(c.action, CommandAction::Quit),
                _ => panic!("{} should be a command", token),
            }
        }
    }

    #[test]
    fn test_arity_contracts() {
        assert!(Arity::Free.accepts(0));
        assert!(Arity::Free.accepts(9));
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(Arity::AtLeast(1).accepts(5));
        assert!(!Arity::AtLeast(1).accepts(0));
        assert!(Arity::Range(1, 2).accepts(2));
        assert!(!Arity::Range(1, 2).accepts(3));
    }
}
