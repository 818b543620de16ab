//! Error types for the shell and the configuration language engine.
//!
//! Every failure in the engine falls into one of five kinds. Dispatcher-level
//! failures (syntax, skill, arity) never start execution; parse-time failures
//! abort the current command and leave the document untouched; external
//! failures are surfaced without corrupting the in-memory model.

use thiserror::Error;

use crate::config::SkillLevel;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShellError {
    /// Unrecognized token, malformed section, unbalanced bracket or quote.
    /// Carries the offending remainder of the input.
    #[error("syntax error near: {0}")]
    Syntax(String),

    /// The active skill level is below what the command requires.
    #[error("{cmd}: skill level {required} required")]
    Skill { cmd: String, required: SkillLevel },

    /// Wrong argument count; carries the command's usage text.
    #[error("usage: {usage}")]
    Arity { usage: String },

    /// Reference to a nonexistent identifier, duplicate identifier on
    /// create, inconsistent rule expression.
    #[error("{0}")]
    Semantic(String),

    /// Schema oracle or settle-notification failure.
    #[error("{0}")]
    External(String),
}

impl ShellError {
    /// Syntax error from a token remainder.
    pub fn syntax_at(tokens: &[String]) -> ShellError {
        ShellError::Syntax(tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_at_joins_remainder() {
        let toks = vec!["bad".to_string(), "input".to_string()];
        assert_eq!(
            ShellError::syntax_at(&toks),
            ShellError::Syntax("bad input".to_string())
        );
    }

    #[test]
    fn test_display_messages() {
        let e = ShellError::Skill {
            cmd: "erase".to_string(),
            required: SkillLevel::Expert,
        };
        assert_eq!(e.to_string(), "erase: skill level expert required");
    }
}
