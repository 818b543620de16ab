//! Session configuration.
//!
//! One explicit struct, constructed once at startup and passed by reference
//! through the dispatcher and parser. There are no ambient globals; anything
//! a command needs to know about the session lives here.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::render::OutputFormat;

/// Ordered user skill levels. Commands are gated by the minimum level they
/// require; the check happens before any argument validation or execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkillLevel {
    Operator,
    Administrator,
    Expert,
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkillLevel::Operator => "operator",
            SkillLevel::Administrator => "administrator",
            SkillLevel::Expert => "expert",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operator" => Ok(SkillLevel::Operator),
            "administrator" => Ok(SkillLevel::Administrator),
            "expert" => Ok(SkillLevel::Expert),
            other => Err(format!("unknown skill level: {}", other)),
        }
    }
}

/// Per-session preferences and mode flags.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Active skill level; commands above it are refused.
    pub skill: SkillLevel,
    /// Wait for the cluster transition to settle after transition-triggering
    /// commands.
    pub wait: bool,
    /// Upper bound on one settle wait.
    pub settle_timeout: Duration,
    /// Proceed without confirmation prompts (scripting).
    pub force: bool,
    /// Rendering mode for `show` output.
    pub output: OutputFormat,
    /// Reading commands from a file or pipe; local errors set a nonzero exit
    /// status but processing continues.
    pub batch: bool,
    /// Interactive session; may also be switched on by the dispatcher when a
    /// level is entered as the last token of a line.
    pub interactive: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            skill: SkillLevel::Expert,
            wait: false,
            settle_timeout: Duration::from_secs(60),
            force: false,
            output: OutputFormat::Plain,
            batch: false,
            interactive: false,
        }
    }
}
