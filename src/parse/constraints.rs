//! Constraints: colocation, order, location.
//!
//! Colocation and order share the resource-reference grammar: a run of bare
//! references and bracket-delimited resource sets, followed by optional
//! constraint-level `name=value` attributes. Two bare references with no
//! sets collapse to the simple attribute form; anything else becomes
//! `resource_set` children in encounter order.

use crate::error::{Result, ShellError};
use crate::model::Element;

use super::common::{
    is_group_marker, is_score, parse_nv, score_from_cli, strip_colon, Cursor, Nv,
};
use super::rules;

/// Which simple-form attribute names a constraint family uses.
#[derive(Clone, Copy)]
enum RefStyle {
    /// rsc / with-rsc, role suffixes
    Colocation,
    /// first / then, action suffixes
    Order,
}

pub fn parse_colocation(cur: &mut Cursor<'_>) -> Result<Element> {
    let id = cur.expect_word()?;
    let mut el = Element::new("rsc_colocation");
    el.set_attr("id", id);
    let score_tok = cur.expect_word()?;
    let score = strip_colon(score_tok)
        .filter(|p| is_score(p))
        .ok_or_else(|| ShellError::Syntax(score_tok.to_string()))?;
    el.set_attr("score", &score_from_cli(score));
    parse_references(cur, &mut el, RefStyle::Colocation)?;
    Ok(el)
}

pub fn parse_order(cur: &mut Cursor<'_>) -> Result<Element> {
    let id = cur.expect_word()?;
    let mut el = Element::new("rsc_order");
    el.set_attr("id", id);
    let head_tok = cur.expect_word()?;
    let head = strip_colon(head_tok).ok_or_else(|| ShellError::Syntax(head_tok.to_string()))?;
    match head {
        "Mandatory" | "Optional" | "Serialize" => el.set_attr("kind", head),
        s if is_score(s) => el.set_attr("score", &score_from_cli(s)),
        _ => return Err(ShellError::Syntax(head_tok.to_string())),
    }
    parse_references(cur, &mut el, RefStyle::Order)?;
    Ok(el)
}

/// `location <id> <rsc> <score>: <node>` or `location <id> <rsc> rule ...`.
pub fn parse_location(cur: &mut Cursor<'_>) -> Result<Element> {
    let id = cur.expect_word()?;
    let rsc = cur.expect_word()?;
    let mut el = Element::new("rsc_location");
    el.set_attr("id", id);
    el.set_attr("rsc", rsc);
    match cur.peek() {
        Some("rule") => {
            while cur.peek() == Some("rule") {
                cur.advance();
                let rule = rules::parse_rule(cur)?;
                el.push_element(rule);
            }
        }
        Some(tok) => {
            let score = strip_colon(tok)
                .filter(|p| is_score(p))
                .ok_or_else(|| cur.err())?;
            el.set_attr("score", &score_from_cli(score));
            cur.advance();
            let node = cur.expect_word()?;
            el.set_attr("node", node);
        }
        None => return Err(ShellError::Syntax(String::new())),
    }
    Ok(el)
}

enum RefItem {
    Single { name: String, suffix: Option<String> },
    Set(Element),
}

fn parse_references(cur: &mut Cursor<'_>, el: &mut Element, style: RefStyle) -> Result<()> {
    let mut items = Vec::new();
    let mut extras: Vec<(String, String)> = Vec::new();
    while let Some(tok) = cur.peek() {
        match tok {
            "[" => {
                cur.advance();
                items.push(RefItem::Set(parse_resource_set(cur)?));
            }
            t if t.contains('=') => {
                match parse_nv(t) {
                    Some(Nv::Pair {
                        id: None,
                        name,
                        value: Some(value),
                    }) => extras.push((name, value)),
                    _ => return Err(cur.err()),
                }
                cur.advance();
            }
            t if is_group_marker(t) => return Err(cur.err()),
            t => {
                let (name, suffix) = split_suffix(t);
                items.push(RefItem::Single { name, suffix });
                cur.advance();
            }
        }
    }
    let all_single = items
        .iter()
        .all(|i| matches!(i, RefItem::Single { .. }));
    if all_single && items.len() == 2 {
        let names = simple_attr_names(style);
        for (item, (ref_attr, role_attr)) in items.into_iter().zip(names) {
            if let RefItem::Single { name, suffix } = item {
                el.set_attr(ref_attr, &name);
                if let Some(suffix) = suffix {
                    el.set_attr(role_attr, &suffix);
                }
            }
        }
    } else if items.is_empty() {
        return Err(ShellError::Syntax(String::new()));
    } else {
        for item in items {
            match item {
                RefItem::Set(set) => el.push_element(set),
                RefItem::Single { name, suffix } => {
                    let mut set = Element::new("resource_set");
                    if let Some(suffix) = suffix {
                        set.set_attr("role", &suffix);
                    }
                    set.push_element(Element::new("resource_ref").with_attr("id", &name));
                    el.push_element(set);
                }
            }
        }
    }
    for (name, value) in extras {
        el.set_attr(&name, &value);
    }
    Ok(())
}

fn simple_attr_names(style: RefStyle) -> [(&'static str, &'static str); 2] {
    match style {
        RefStyle::Colocation => [("rsc", "rsc-role"), ("with-rsc", "with-rsc-role")],
        RefStyle::Order => [("first", "first-action"), ("then", "then-action")],
    }
}

/// A bracketed set: references with an optional uniform `:Role` suffix and
/// trailing attribute flags. A bracket means "not sequential" unless the
/// flags say otherwise.
fn parse_resource_set(cur: &mut Cursor<'_>) -> Result<Element> {
    let mut set = Element::new("resource_set");
    set.set_attr("sequential", "false");
    loop {
        let tok = cur.next().ok_or_else(|| ShellError::Syntax("]".to_string()))?;
        match tok {
            "]" => break,
            t if t.contains('=') => match parse_nv(t) {
                Some(Nv::Pair {
                    id: None,
                    name,
                    value: Some(value),
                }) => set.set_attr(&name, &value),
                _ => return Err(ShellError::Syntax(t.to_string())),
            },
            t if is_group_marker(t) => return Err(ShellError::Syntax(t.to_string())),
            t => {
                let (name, suffix) = split_suffix(t);
                if let Some(suffix) = suffix {
                    if let Some(existing) = set.attr("role") {
                        if existing != suffix {
                            return Err(ShellError::Semantic(format!(
                                "conflicting roles in resource set: {} vs {}",
                                existing, suffix
                            )));
                        }
                    }
                    set.set_attr("role", &suffix);
                }
                set.push_element(Element::new("resource_ref").with_attr("id", &name));
            }
        }
    }
    if set.child_elements().next().is_none() {
        return Err(ShellError::Syntax("[ ]".to_string()));
    }
    Ok(set)
}

/// `rsc:Master` -> (`rsc`, `Master`).
fn split_suffix(tok: &str) -> (String, Option<String>) {
    match tok.split_once(':') {
        Some((name, suffix)) if !name.is_empty() && !suffix.is_empty() => {
            (name.to_string(), Some(suffix.to_string()))
        }
        _ => (tok.to_string(), None),
    }
}
