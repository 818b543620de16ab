//! End-to-end shell flows: a whole script through the batch runner, with
//! navigation, preferences, edits, and failures mixed together.

use cibsh::config::{ShellConfig, SkillLevel};
use cibsh::schema::default_schema;
use cibsh::shell::{run_lines, NullNotifier, Outcome, Session};
use cibsh::ShellError;

fn batch_session<'a>(notifier: &'a mut NullNotifier) -> Session<'a> {
    let config = ShellConfig {
        batch: true,
        ..ShellConfig::default()
    };
    Session::new(config, default_schema(), notifier)
}

#[test]
fn test_full_script() {
    let script = "\
configure
# the web stack
primitive web apache params port=8080
primitive db Dummy params state=started
group stack db web
colocation keep inf: web db
order first-db Mandatory: db web
up
options
skill-level administrator
up
configure
rename db database
delete keep
quit
";
    let mut n = NullNotifier;
    let mut s = batch_session(&mut n);
    let status = run_lines(&mut s, script.as_bytes());
    assert_eq!(status, 0);
    assert_eq!(s.config.skill, SkillLevel::Administrator);
    assert!(s.factory().find("database").is_some());
    assert!(s.factory().find("db").is_none());
    assert!(s.factory().find("keep").is_none());
    let web = s.factory().find("web").unwrap();
    assert_eq!(web.comments().count(), 1);
    // rename rewrote the group member and the order constraint
    let order = s.factory().find("first-db").unwrap();
    assert_eq!(order.attr("first"), Some("database"));
}

#[test]
fn test_failing_lines_set_status_but_do_not_stop() {
    let script = "\
configure
primitive ok Dummy
primitive ok Dummy
show nosuch
primitive ok2 Dummy
";
    let mut n = NullNotifier;
    let mut s = batch_session(&mut n);
    let status = run_lines(&mut s, script.as_bytes());
    assert_eq!(status, 1);
    assert!(s.factory().find("ok").is_some());
    assert!(s.factory().find("ok2").is_some());
}

#[test]
fn test_operator_skill_blocks_edits_but_not_show() {
    let mut n = NullNotifier;
    let mut s = batch_session(&mut n);
    s.dispatch_line("configure primitive p1 Dummy").unwrap();
    s.dispatch_line("options skill-level operator").unwrap();
    let err = s.dispatch_line("configure delete p1").unwrap_err();
    assert!(matches!(err, ShellError::Skill { .. }));
    assert!(s.factory().find("p1").is_some());
    let out = s.dispatch_line("configure show p1").unwrap();
    assert_eq!(
        out,
        Outcome::Continue(Some("primitive p1 Dummy".to_string()))
    );
}

#[test]
fn test_erase_needs_expert() {
    let mut n = NullNotifier;
    let mut s = batch_session(&mut n);
    s.dispatch_line("configure primitive p1 Dummy").unwrap();
    s.config.skill = SkillLevel::Administrator;
    assert!(matches!(
        s.dispatch_line("configure erase").unwrap_err(),
        ShellError::Skill { .. }
    ));
    s.config.skill = SkillLevel::Expert;
    s.dispatch_line("configure erase").unwrap();
    assert!(s.factory().is_empty());
}

#[test]
fn test_entering_a_level_then_reading_lines_stays_in_the_level() {
    // the half-interactive mode: one argument line enters a level and the
    // shell keeps reading commands there
    let mut n = NullNotifier;
    let mut s = batch_session(&mut n);
    s.dispatch_line("configure").unwrap();
    assert!(s.depth() > 1);
    let status = run_lines(&mut s, "primitive p1 Dummy\nshow p1\n".as_bytes());
    assert_eq!(status, 0);
    assert!(s.factory().find("p1").is_some());
}

#[test]
fn test_command_line_does_not_leave_the_session_in_a_level() {
    let mut n = NullNotifier;
    let mut s = batch_session(&mut n);
    s.dispatch_line("configure primitive p1 Dummy").unwrap();
    assert_eq!(s.depth(), 1);
}
