//! Fencing topology.
//!
//! `fencing_topology` takes a sequence of clauses: an optional subject
//! (`<target>:`, `pattern:<regex>`, or `attr:<name>=<value>`; no subject
//! means the clause applies to every target) followed by device groups.
//! Each group token is a comma-joined device list forming one level; level
//! indices count upward from 1 per subject.

use crate::error::{Result, ShellError};
use crate::model::Element;

use super::common::{is_group_marker, strip_colon, Cursor};

/// The subject a fencing level applies to.
#[derive(Debug, Clone, PartialEq)]
enum Subject {
    All,
    Target(String),
    Pattern(String),
    Attr(String, String),
}

impl Subject {
    fn apply(&self, level: &mut Element) {
        match self {
            Subject::All => {}
            Subject::Target(t) => level.set_attr("target", t),
            Subject::Pattern(p) => level.set_attr("target-pattern", p),
            Subject::Attr(name, value) => {
                level.set_attr("target-attribute", name);
                level.set_attr("target-value", value);
            }
        }
    }
}

pub fn parse_fencing_topology(cur: &mut Cursor<'_>) -> Result<Element> {
    let mut el = Element::new("fencing_topology");
    let mut subject = Subject::All;
    // per-subject level counters: a re-mentioned subject continues its
    // own sequence rather than restarting at 1
    let mut counters: Vec<(Subject, u32)> = Vec::new();
    while let Some(tok) = cur.next() {
        if is_group_marker(tok) {
            return Err(ShellError::Syntax(tok.to_string()));
        }
        if let Some(pattern) = tok.strip_prefix("pattern:") {
            if pattern.is_empty() {
                return Err(ShellError::Syntax(tok.to_string()));
            }
            subject = Subject::Pattern(pattern.to_string());
            continue;
        }
        if let Some(attr) = tok.strip_prefix("attr:") {
            let (name, value) = attr
                .split_once('=')
                .filter(|(n, v)| !n.is_empty() && !v.is_empty())
                .ok_or_else(|| ShellError::Syntax(tok.to_string()))?;
            subject = Subject::Attr(name.to_string(), value.to_string());
            continue;
        }
        if let Some(target) = strip_colon(tok) {
            subject = Subject::Target(target.to_string());
            continue;
        }
        let index = match counters.iter_mut().find(|(s, _)| *s == subject) {
            Some((_, count)) => {
                *count += 1;
                *count
            }
            None => {
                counters.push((subject.clone(), 1));
                1
            }
        };
        let mut level = Element::new("fencing-level");
        subject.apply(&mut level);
        level.set_attr("index", &index.to_string());
        level.set_attr("devices", tok);
        el.push_element(level);
    }
    Ok(el)
}
