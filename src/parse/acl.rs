//! ACL roles and targets.
//!
//! A role is a list of permissions: a verb (`read`, `write`, `deny`)
//! followed by optional attributes and one subject spec. A spec with no
//! verb of its own inherits the most recent explicit verb. The legacy
//! `tag:` spec is canonicalized to `type:` on sight.

use crate::error::{Result, ShellError};
use crate::model::Element;

use super::common::{is_group_marker, parse_nv, Cursor, Nv};

const VERBS: &[&str] = &["read", "write", "deny"];

pub fn parse_role(cur: &mut Cursor<'_>) -> Result<Element> {
    let id = cur.expect_word()?;
    let mut el = Element::new("acl_role");
    el.set_attr("id", id);
    let mut verb: Option<String> = None;
    let mut pending: Vec<(String, String)> = Vec::new();
    let mut permissions = 0usize;
    while let Some(tok) = cur.next() {
        if VERBS.contains(&tok) {
            if !pending.is_empty() {
                return Err(ShellError::Syntax(tok.to_string()));
            }
            verb = Some(tok.to_string());
            continue;
        }
        if let Some(spec) = parse_spec(tok) {
            let kind = verb
                .clone()
                .ok_or_else(|| ShellError::Syntax(tok.to_string()))?;
            let mut perm = Element::new("acl_permission");
            perm.set_attr("kind", &kind);
            for (name, value) in pending.drain(..) {
                perm.set_attr(&name, &value);
            }
            let (attr, value) = spec;
            perm.set_attr(attr, value);
            el.push_element(perm);
            permissions += 1;
            continue;
        }
        match parse_nv(tok) {
            Some(Nv::Pair {
                id: None,
                name,
                value: Some(value),
            }) => {
                if verb.is_none() {
                    // role-level attribute (description) before any verb
                    el.set_attr(&name, &value);
                } else {
                    pending.push((name, value));
                }
            }
            _ => return Err(ShellError::Syntax(tok.to_string())),
        }
    }
    if permissions == 0 || !pending.is_empty() {
        return Err(ShellError::Syntax(String::new()));
    }
    Ok(el)
}

/// Subject specs: `xpath:"..."`, `ref:id`, `type:tag` (and the legacy
/// `tag:`), `attribute:name`. Returns the canonical attribute name.
fn parse_spec(tok: &str) -> Option<(&'static str, &str)> {
    for (prefix, attr) in [
        ("xpath:", "xpath"),
        ("ref:", "reference"),
        ("type:", "object-type"),
        ("tag:", "object-type"),
        ("attribute:", "attribute"),
    ] {
        if let Some(value) = tok.strip_prefix(prefix) {
            if !value.is_empty() {
                return Some((attr, value));
            }
        }
    }
    None
}

/// `acl_target <id> <role>...`
pub fn parse_acl_target(cur: &mut Cursor<'_>) -> Result<Element> {
    let id = cur.expect_word()?;
    let mut el = Element::new("acl_target");
    el.set_attr("id", id);
    let mut roles = 0usize;
    while let Some(tok) = cur.peek() {
        if is_group_marker(tok) || tok.contains('=') {
            break;
        }
        el.push_element(Element::new("role").with_attr("id", tok));
        roles += 1;
        cur.advance();
    }
    if roles == 0 {
        return Err(cur.err());
    }
    Ok(el)
}
