//! The command dispatcher.
//!
//! One session owns the document factory, the static level tree, the
//! navigation stack, and the user preferences. Each input line is walked
//! against the tree; the stack is marked before the walk and truncated back
//! to the mark on any failure and after any terminal command, so only
//! navigation-only lines move the session between levels. The skill check
//! runs before the arity check, and both run before execution, so a refused
//! command has no side effects of any kind.

use std::mem;
use std::time::Duration;

use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use crate::lexing::split_line;
use crate::model::CibFactory;
use crate::render::RenderOpts;
use crate::schema::Schema;
use crate::shell::levels::{Command, CommandAction, Entry, LevelTree, ROOT};

/// Settle-notification capability: blocks until the cluster transition
/// triggered by the last command has settled, or the timeout elapses. A
/// failure marks the command failed; it never undoes the edit.
pub trait SettleNotifier {
    fn wait_for_settle(&mut self, timeout: Duration, interactive: bool) -> Result<()>;
}

/// A notifier for sessions with nothing to wait on.
pub struct NullNotifier;

impl SettleNotifier for NullNotifier {
    fn wait_for_settle(&mut self, _timeout: Duration, _interactive: bool) -> Result<()> {
        Ok(())
    }
}

/// What one dispatched line produced.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Possibly with text to print.
    Continue(Option<String>),
    Quit,
}

pub struct Session<'a> {
    factory: CibFactory,
    tree: LevelTree,
    stack: Vec<usize>,
    pub config: ShellConfig,
    schema: &'a dyn Schema,
    notifier: &'a mut dyn SettleNotifier,
    /// Comment lines waiting to be attached to the next object definition.
    pending_comments: Vec<String>,
}

impl<'a> Session<'a> {
    pub fn new(
        config: ShellConfig,
        schema: &'a dyn Schema,
        notifier: &'a mut dyn SettleNotifier,
    ) -> Self {
        Session {
            factory: CibFactory::new(),
            tree: LevelTree::new(),
            stack: vec![ROOT],
            config,
            schema,
            notifier,
            pending_comments: Vec::new(),
        }
    }

    pub fn factory(&self) -> &CibFactory {
        &self.factory
    }

    pub fn current_level(&self) -> &str {
        let idx = self.stack.last().copied().unwrap_or(ROOT);
        self.tree.level(idx).name
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Dispatch one logical line. Comment and empty lines are no-op
    /// successes; comments are remembered and attached to the next object
    /// definition.
    pub fn dispatch_line(&mut self, line: &str) -> Result<Outcome> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Outcome::Continue(None));
        }
        if trimmed.starts_with('#') {
            self.pending_comments.push(trimmed.to_string());
            return Ok(Outcome::Continue(None));
        }
        let tokens = split_line(trimmed)?;
        let mark = self.stack.len();
        let result = self.walk(&tokens, mark);
        if result.is_err() {
            // any failure rolls navigation back to where the line started
            self.stack.truncate(mark);
        }
        result
    }

    fn walk(&mut self, tokens: &[String], mark: usize) -> Result<Outcome> {
        let comments = mem::take(&mut self.pending_comments);
        let mut i = 0;
        while i < tokens.len() {
            let tok = tokens[i].as_str();
            let current = self.stack.last().copied().unwrap_or(ROOT);
            match self.tree.level(current).lookup(tok) {
                Some(Entry::Level(idx)) => {
                    if i == tokens.len() - 1 && !self.config.interactive {
                        // entering a level as the last token of the line
                        // means a human is navigating
                        tracing::debug!(level = tok, "assuming interactive session");
                        self.config.interactive = true;
                    }
                    self.stack.push(idx);
                    i += 1;
                }
                Some(Entry::Command(cmd)) => {
                    if self.config.skill < cmd.skill {
                        return Err(ShellError::Skill {
                            cmd: cmd.name.to_string(),
                            required: cmd.skill,
                        });
                    }
                    let args = &tokens[i..];
                    if !cmd.arity.accepts(args.len() - 1) {
                        return Err(ShellError::Arity {
                            usage: cmd.usage.to_string(),
                        });
                    }
                    tracing::debug!(command = cmd.name, level = self.current_level(), "dispatch");
                    let outcome = self.execute(&cmd, args, comments)?;
                    if cmd.triggers_transition && self.config.wait {
                        let timeout = self.config.settle_timeout;
                        if let Err(e) = self.notifier.wait_for_settle(timeout, self.config.interactive) {
                            tracing::warn!(command = cmd.name, error = %e, "settle wait failed");
                            return Err(e);
                        }
                    }
                    // levels entered on the way to a command do not outlive
                    // the line; only navigation-only lines move the session
                    self.stack.truncate(mark);
                    return Ok(outcome);
                }
                None => return Err(ShellError::syntax_at(&tokens[i..])),
            }
        }
        // the line only navigated levels
        Ok(Outcome::Continue(None))
    }

    fn execute(
        &mut self,
        cmd: &Command,
        args: &[String],
        comments: Vec<String>,
    ) -> Result<Outcome> {
        match cmd.action {
            CommandAction::DefineObject => {
                self.factory.create_from_tokens(args, &comments, self.schema)?;
                Ok(Outcome::Continue(None))
            }
            CommandAction::Show => {
                let opts = RenderOpts {
                    format: self.config.output,
                    with_comments: true,
                };
                let text = self.factory.render(&args[1..], &opts)?;
                Ok(Outcome::Continue(Some(text)))
            }
            CommandAction::Delete => {
                let mut notes = Vec::new();
                for id in &args[1..] {
                    for dangling in self.factory.delete(id)? {
                        notes.push(format!("warning: {}", dangling));
                    }
                }
                let text = if notes.is_empty() {
                    None
                } else {
                    Some(notes.join("\n"))
                };
                Ok(Outcome::Continue(text))
            }
            CommandAction::Rename => {
                self.factory.rename(&args[1], &args[2])?;
                Ok(Outcome::Continue(None))
            }
            CommandAction::Erase => {
                self.factory.erase();
                Ok(Outcome::Continue(None))
            }
            CommandAction::Commit => Ok(Outcome::Continue(None)),
            CommandAction::Up => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
                Ok(Outcome::Continue(None))
            }
            CommandAction::Quit => Ok(Outcome::Quit),
            CommandAction::SetSkill => {
                self.config.skill = args[1].parse().map_err(ShellError::Semantic)?;
                Ok(Outcome::Continue(None))
            }
            CommandAction::SetWait => {
                self.config.wait = parse_bool(&args[1])?;
                Ok(Outcome::Continue(None))
            }
            CommandAction::SetOutput => {
                self.config.output = args[1].parse().map_err(ShellError::Semantic)?;
                Ok(Outcome::Continue(None))
            }
            CommandAction::ShowOptions => Ok(Outcome::Continue(Some(format!(
                "skill-level: {}\nwait: {}\noutput: {}",
                self.config.skill, self.config.wait, self.config.output
            )))),
        }
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "yes" | "true" | "on" => Ok(true),
        "no" | "false" | "off" => Ok(false),
        other => Err(ShellError::Semantic(format!(
            "expected yes or no, got: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SkillLevel;
    use crate::schema::NullSchema;

    fn session<'a>(notifier: &'a mut dyn SettleNotifier) -> Session<'a> {
        Session::new(ShellConfig::default(), &NullSchema, notifier)
    }

    #[test]
    fn test_navigation_persists_across_lines() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.dispatch_line("configure").unwrap();
        assert_eq!(s.current_level(), "configure");
        s.dispatch_line("primitive p1 Dummy").unwrap();
        assert!(s.factory().find("p1").is_some());
        s.dispatch_line("up").unwrap();
        assert_eq!(s.current_level(), "root");
    }

    #[test]
    fn test_combined_line_returns_to_the_starting_level() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.dispatch_line("configure primitive p1 Dummy").unwrap();
        assert!(s.factory().find("p1").is_some());
        // reaching a command releases the levels entered on the way
        assert_eq!(s.current_level(), "root");
        assert_eq!(s.depth(), 1);
        // so a follow-up bare command resolves at root, not configure
        assert!(s.dispatch_line("primitive p2 Dummy").is_err());
    }

    #[test]
    fn test_entering_level_as_last_token_flags_interactive() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        assert!(!s.config.interactive);
        s.dispatch_line("configure").unwrap();
        assert!(s.config.interactive);
    }

    #[test]
    fn test_unknown_token_rolls_the_stack_back() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        let err = s.dispatch_line("configure frobnicate x").unwrap_err();
        assert!(matches!(err, ShellError::Syntax(_)));
        assert_eq!(s.current_level(), "root");
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn test_skill_gate_refuses_before_any_side_effect() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.config.skill = SkillLevel::Operator;
        let err = s.dispatch_line("configure primitive p1 Dummy").unwrap_err();
        assert_eq!(
            err,
            ShellError::Skill {
                cmd: "primitive".to_string(),
                required: SkillLevel::Administrator,
            }
        );
        assert!(s.factory().is_empty());
        assert_eq!(s.current_level(), "root");
    }

    #[test]
    fn test_arity_violation_reports_usage() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        let err = s.dispatch_line("configure rename onlyone").unwrap_err();
        assert_eq!(
            err,
            ShellError::Arity {
                usage: "rename <old-id> <new-id>".to_string(),
            }
        );
    }

    #[test]
    fn test_skill_check_precedes_arity_check() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.config.skill = SkillLevel::Operator;
        // wrong arity AND insufficient skill: the skill refusal wins
        let err = s.dispatch_line("configure rename onlyone").unwrap_err();
        assert!(matches!(err, ShellError::Skill { .. }));
    }

    #[test]
    fn test_comment_lines_attach_to_next_definition() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.dispatch_line("configure").unwrap();
        s.dispatch_line("# the fencing device").unwrap();
        s.dispatch_line("primitive st1 stonith:null").unwrap();
        let st1 = s.factory().find("st1").unwrap();
        let comments: Vec<&str> = st1.comments().collect();
        assert_eq!(comments, ["# the fencing device"]);
    }

    #[test]
    fn test_show_renders_the_document() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.dispatch_line("configure primitive p1 Dummy params state=1")
            .unwrap();
        let out = s.dispatch_line("configure show").unwrap();
        assert_eq!(
            out,
            Outcome::Continue(Some("primitive p1 Dummy params state=1".to_string()))
        );
    }

    struct RecordingNotifier {
        calls: usize,
        timeout: Option<Duration>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn new(fail: bool) -> Self {
            RecordingNotifier {
                calls: 0,
                timeout: None,
                fail,
            }
        }
    }

    impl SettleNotifier for RecordingNotifier {
        fn wait_for_settle(&mut self, timeout: Duration, _interactive: bool) -> Result<()> {
            self.calls += 1;
            self.timeout = Some(timeout);
            if self.fail {
                Err(ShellError::External("transition did not settle".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_commit_waits_for_settle_when_enabled() {
        let mut n = RecordingNotifier::new(false);
        let mut s = session(&mut n);
        s.config.wait = true;
        s.config.settle_timeout = Duration::from_secs(90);
        s.dispatch_line("configure commit").unwrap();
        drop(s);
        assert_eq!(n.calls, 1);
        assert_eq!(n.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_settle_failure_does_not_undo_the_edit() {
        let mut n = RecordingNotifier::new(true);
        let mut s = session(&mut n);
        s.config.wait = true;
        s.dispatch_line("configure").unwrap();
        s.dispatch_line("primitive p1 Dummy").unwrap();
        let err = s.dispatch_line("commit").unwrap_err();
        assert!(matches!(err, ShellError::External(_)));
        assert!(s.factory().find("p1").is_some());
    }

    #[test]
    fn test_quit_from_anywhere() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.dispatch_line("configure").unwrap();
        assert_eq!(s.dispatch_line("quit").unwrap(), Outcome::Quit);
    }

    #[test]
    fn test_options_round() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.dispatch_line("options").unwrap();
        s.dispatch_line("skill-level operator").unwrap();
        assert_eq!(s.config.skill, SkillLevel::Operator);
        s.dispatch_line("wait yes").unwrap();
        assert!(s.config.wait);
        let err = s.dispatch_line("wait sideways").unwrap_err();
        assert!(matches!(err, ShellError::Semantic(_)));
    }

    #[test]
    fn test_one_line_preference_change_returns_to_root() {
        let mut n = NullNotifier;
        let mut s = session(&mut n);
        s.dispatch_line("options skill-level operator").unwrap();
        assert_eq!(s.config.skill, SkillLevel::Operator);
        assert_eq!(s.current_level(), "root");
    }
}
