//! CLI rendering of configuration objects.
//!
//! Each object kind mirrors its sub-grammar in [crate::parse]: children are
//! walked in stored order, scores come back in their `inf` spellings, and
//! resource sets fold back to the bracket notation (a bracket implies
//! `sequential=false`, so that flag is never written out). Fencing levels are
//! regrouped by subject with plain targets ahead of pattern and attribute
//! subjects. ACL permission verbs are restated on every permission even when
//! the input relied on inheritance.

use crate::error::{Result, ShellError};
use crate::lexing::requote;
use crate::model::Element;
use crate::parse::common::score_to_cli;

use super::modes::RenderOpts;

/// Render one configuration object to its canonical CLI text.
pub fn render_object(el: &Element, opts: &RenderOpts) -> Result<String> {
    let words = match el.tag.as_str() {
        "primitive" => resource_words(el, opts, "primitive"),
        "template" => resource_words(el, opts, "rsc_template"),
        "group" => group_words(el, opts),
        "clone" | "ms" => clone_words(el, opts),
        "rsc_colocation" => colocation_words(el, opts),
        "rsc_order" => order_words(el, opts),
        "rsc_location" => location_words(el, opts),
        "fencing_topology" => fencing_words(el, opts),
        "acl_role" => role_words(el, opts),
        "acl_target" => target_words(el, opts),
        "alert" => alert_words(el, opts),
        other => {
            return Err(ShellError::Semantic(format!(
                "cannot render object type: {}",
                other
            )))
        }
    };
    let mut lines = Vec::new();
    if opts.with_comments {
        for comment in el.comments() {
            lines.push(comment.to_string());
        }
    }
    lines.push(words.join(" "));
    Ok(lines.join("\n"))
}

/// Always-quoted form, used for paths and xpath specs.
fn quote_always(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// One nvpair back to its token form. `set_id` is the enclosing set's id;
/// an explicit nvpair id that does not follow the `<set>-<name>` pattern is
/// a pinned id and is rendered as `$id:name=value`.
fn nv_to_cli(nv: &Element, set_id: Option<&str>) -> String {
    if let Some(idref) = nv.attr("id-ref") {
        return match nv.attr("name") {
            Some(name) => format!("@{}:{}", idref, name),
            None => format!("@{}", idref),
        };
    }
    let name = nv.attr("name").unwrap_or_default();
    let pinned = nv.id().filter(|id| match set_id {
        Some(set_id) => **id != format!("{}-{}", set_id, name),
        None => true,
    });
    match (pinned, nv.attr("value")) {
        (Some(id), Some(value)) => format!("${}:{}={}", id, name, requote(value)),
        (None, Some(value)) => format!("{}={}", name, requote(value)),
        (_, None) => name.to_string(),
    }
}

/// An attribute set (`params`, `meta`, `utilization`, `attributes`) back to
/// its section form, including the priority prefix and any rule children.
fn attr_set_words(set: &Element, keyword: &str, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![opts.keyword(keyword)];
    if let Some(score) = set.attr("score") {
        words.push(format!("{}:", score));
    }
    for child in set.child_elements() {
        match child.tag.as_str() {
            "rule" => words.extend(rule_words(child, opts)),
            _ => words.push(nv_to_cli(child, set.id())),
        }
    }
    words
}

fn rule_words(rule: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![opts.keyword("rule")];
    if let Some(role) = rule.attr("role") {
        words.push(format!("$role={}", role));
    }
    if let Some(score) = rule.attr("score") {
        words.push(format!("{}:", score_to_cli(score)));
    }
    let connective = rule.attr("boolean-op").unwrap_or("and");
    for (i, expr) in rule.child_elements().enumerate() {
        if i > 0 {
            words.push(connective.to_string());
        }
        words.extend(expression_words(expr));
    }
    words
}

fn expression_words(expr: &Element) -> Vec<String> {
    if expr.tag == "date_expression" {
        let mut words = vec!["date".to_string()];
        match expr.attr("operation") {
            Some("in_range") => {
                words.push("in".to_string());
                if let Some(start) = expr.attr("start") {
                    words.push(format!("start={}", start));
                }
                if let Some(end) = expr.attr("end") {
                    words.push(format!("end={}", end));
                }
            }
            Some("gt") => {
                words.push("gt".to_string());
                if let Some(start) = expr.attr("start") {
                    words.push(start.to_string());
                }
            }
            _ => {
                words.push("lt".to_string());
                if let Some(end) = expr.attr("end") {
                    words.push(end.to_string());
                }
            }
        }
        return words;
    }
    let attribute = expr.attr("attribute").unwrap_or_default().to_string();
    let operation = expr.attr("operation").unwrap_or_default().to_string();
    if matches!(operation.as_str(), "defined" | "not_defined") {
        return vec![operation, attribute];
    }
    let value = expr.attr("value").unwrap_or_default();
    let value = match expr.attr("type") {
        Some(t) => format!("{}:{}", t, value),
        None => requote(value),
    };
    vec![attribute, operation, value]
}

fn resource_words(el: &Element, opts: &RenderOpts, keyword: &str) -> Vec<String> {
    let mut words = vec![opts.keyword(keyword), opts.ident(el.id().unwrap_or_default())];
    let agent: Vec<&str> = ["class", "provider", "type"]
        .iter()
        .filter_map(|name| el.attr(name))
        .collect();
    words.push(agent.join(":"));
    for child in el.child_elements() {
        match child.tag.as_str() {
            "instance_attributes" => words.extend(attr_set_words(child, "params", opts)),
            "meta_attributes" => words.extend(attr_set_words(child, "meta", opts)),
            "utilization" => words.extend(attr_set_words(child, "utilization", opts)),
            "operations" => {
                for op in child.child_elements() {
                    words.extend(op_words(op, opts));
                }
            }
            _ => {}
        }
    }
    words
}

fn op_words(op: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![
        opts.keyword("op"),
        op.attr("name").unwrap_or_default().to_string(),
    ];
    for (name, value) in &op.attrs {
        if name == "name" || name == "id" {
            continue;
        }
        words.push(format!("{}={}", name, requote(value)));
    }
    words
}

fn container_section_words(el: &Element, opts: &RenderOpts, words: &mut Vec<String>) {
    for child in el.child_elements() {
        match child.tag.as_str() {
            "instance_attributes" => words.extend(attr_set_words(child, "params", opts)),
            "meta_attributes" => words.extend(attr_set_words(child, "meta", opts)),
            _ => {}
        }
    }
}

fn group_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![opts.keyword("group"), opts.ident(el.id().unwrap_or_default())];
    for member in el.child_elements().filter(|c| c.tag == "crmsh-ref") {
        words.push(member.id().unwrap_or_default().to_string());
    }
    container_section_words(el, opts, &mut words);
    words
}

fn clone_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![
        opts.keyword(&el.tag),
        opts.ident(el.id().unwrap_or_default()),
    ];
    if let Some(child) = el.first_child("crmsh-ref") {
        words.push(child.id().unwrap_or_default().to_string());
    }
    container_section_words(el, opts, &mut words);
    words
}

const COLOCATION_ATTRS: &[&str] = &["id", "score", "rsc", "with-rsc", "rsc-role", "with-rsc-role"];
const ORDER_ATTRS: &[&str] = &[
    "id",
    "score",
    "kind",
    "first",
    "then",
    "first-action",
    "then-action",
];

fn colocation_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![
        opts.keyword("colocation"),
        opts.ident(el.id().unwrap_or_default()),
    ];
    words.push(format!(
        "{}:",
        score_to_cli(el.attr("score").unwrap_or_default())
    ));
    if el.has_attr("rsc") {
        words.push(ref_with_suffix(el, "rsc", "rsc-role"));
        words.push(ref_with_suffix(el, "with-rsc", "with-rsc-role"));
    } else {
        for set in el.child_elements().filter(|c| c.tag == "resource_set") {
            words.extend(set_words(set));
        }
    }
    extra_attr_words(el, COLOCATION_ATTRS, &mut words);
    words
}

fn order_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![
        opts.keyword("order"),
        opts.ident(el.id().unwrap_or_default()),
    ];
    let head = match el.attr("kind") {
        Some(kind) => kind.to_string(),
        None => score_to_cli(el.attr("score").unwrap_or_default()),
    };
    words.push(format!("{}:", head));
    if el.has_attr("first") {
        words.push(ref_with_suffix(el, "first", "first-action"));
        words.push(ref_with_suffix(el, "then", "then-action"));
    } else {
        for set in el.child_elements().filter(|c| c.tag == "resource_set") {
            words.extend(set_words(set));
        }
    }
    extra_attr_words(el, ORDER_ATTRS, &mut words);
    words
}

fn ref_with_suffix(el: &Element, ref_attr: &str, suffix_attr: &str) -> String {
    let name = el.attr(ref_attr).unwrap_or_default();
    match el.attr(suffix_attr) {
        Some(suffix) => format!("{}:{}", name, suffix),
        None => name.to_string(),
    }
}

fn extra_attr_words(el: &Element, known: &[&str], words: &mut Vec<String>) {
    for (name, value) in &el.attrs {
        if known.contains(&name.as_str()) {
            continue;
        }
        words.push(format!("{}={}", name, requote(value)));
    }
}

/// One resource set back to its reference notation. A set holding a single
/// reference and no flags renders as the bare reference; everything else is
/// bracketed, with `sequential=false` implied by the bracket itself.
fn set_words(set: &Element) -> Vec<String> {
    let role = set.attr("role");
    let refs: Vec<String> = set
        .child_elements()
        .filter(|c| c.tag == "resource_ref")
        .map(|r| {
            let id = r.id().unwrap_or_default();
            match role {
                Some(role) => format!("{}:{}", id, role),
                None => id.to_string(),
            }
        })
        .collect();
    let mut flags = Vec::new();
    for (name, value) in &set.attrs {
        match name.as_str() {
            "id" | "role" => {}
            "sequential" if value == "false" => {}
            _ => flags.push(format!("{}={}", name, value)),
        }
    }
    if refs.len() == 1 && flags.is_empty() && role.is_none() {
        return refs;
    }
    // every bracketed set states its sequencing explicitly
    if !set.has_attr("sequential") {
        flags.push("sequential=true".to_string());
    }
    let mut words = vec!["[".to_string()];
    words.extend(refs);
    words.extend(flags);
    words.push("]".to_string());
    words
}

fn location_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![
        opts.keyword("location"),
        opts.ident(el.id().unwrap_or_default()),
        el.attr("rsc").unwrap_or_default().to_string(),
    ];
    if let Some(node) = el.attr("node") {
        words.push(format!(
            "{}:",
            score_to_cli(el.attr("score").unwrap_or_default())
        ));
        words.push(node.to_string());
    } else {
        for rule in el.child_elements().filter(|c| c.tag == "rule") {
            words.extend(rule_words(rule, opts));
        }
    }
    words
}

/// The subject a fencing level applies to, as grouped for output.
#[derive(PartialEq)]
enum SubjectKey {
    All,
    Target(String),
    Pattern(String),
    Attr(String, String),
}

impl SubjectKey {
    fn of(level: &Element) -> SubjectKey {
        if let Some(target) = level.attr("target") {
            SubjectKey::Target(target.to_string())
        } else if let Some(pattern) = level.attr("target-pattern") {
            SubjectKey::Pattern(pattern.to_string())
        } else if let Some(name) = level.attr("target-attribute") {
            SubjectKey::Attr(
                name.to_string(),
                level.attr("target-value").unwrap_or_default().to_string(),
            )
        } else {
            SubjectKey::All
        }
    }

    /// Plain targets sort ahead of pattern and attribute subjects.
    fn is_primary(&self) -> bool {
        matches!(self, SubjectKey::All | SubjectKey::Target(_))
    }

    fn token(&self) -> Option<String> {
        match self {
            SubjectKey::All => None,
            SubjectKey::Target(target) => Some(format!("{}:", target)),
            SubjectKey::Pattern(pattern) => Some(format!("pattern:{}", pattern)),
            SubjectKey::Attr(name, value) => Some(format!("attr:{}={}", name, value)),
        }
    }
}

fn fencing_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut buckets: Vec<(SubjectKey, Vec<&Element>)> = Vec::new();
    for level in el.child_elements().filter(|c| c.tag == "fencing-level") {
        let key = SubjectKey::of(level);
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, levels)) => levels.push(level),
            None => buckets.push((key, vec![level])),
        }
    }
    let mut words = vec![opts.keyword("fencing_topology")];
    let (primary, secondary): (Vec<_>, Vec<_>) =
        buckets.into_iter().partition(|(k, _)| k.is_primary());
    for (key, mut levels) in primary.into_iter().chain(secondary) {
        levels.sort_by_key(|l| {
            l.attr("index")
                .and_then(|i| i.parse::<u32>().ok())
                .unwrap_or(u32::MAX)
        });
        if let Some(token) = key.token() {
            words.push(token);
        }
        for level in levels {
            words.push(level.attr("devices").unwrap_or_default().to_string());
        }
    }
    words
}

const PERMISSION_SPECS: &[(&str, &str)] = &[
    ("xpath", "xpath"),
    ("reference", "ref"),
    ("object-type", "type"),
    ("attribute", "attribute"),
];

fn role_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![opts.keyword("role"), opts.ident(el.id().unwrap_or_default())];
    for (name, value) in &el.attrs {
        if name != "id" {
            words.push(format!("{}={}", name, requote(value)));
        }
    }
    for perm in el.child_elements().filter(|c| c.tag == "acl_permission") {
        words.push(opts.keyword(perm.attr("kind").unwrap_or_default()));
        for (name, value) in &perm.attrs {
            if name == "id" || name == "kind" {
                continue;
            }
            match PERMISSION_SPECS.iter().find(|(attr, _)| *attr == name) {
                Some(("xpath", prefix)) => words.push(format!("{}:{}", prefix, quote_always(value))),
                Some((_, prefix)) => words.push(format!("{}:{}", prefix, value)),
                None => words.push(format!("{}={}", name, requote(value))),
            }
        }
    }
    words
}

fn target_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![
        opts.keyword("acl_target"),
        opts.ident(el.id().unwrap_or_default()),
    ];
    for role in el.child_elements().filter(|c| c.tag == "role") {
        words.push(role.id().unwrap_or_default().to_string());
    }
    words
}

fn alert_words(el: &Element, opts: &RenderOpts) -> Vec<String> {
    let mut words = vec![
        opts.keyword("alert"),
        opts.ident(el.id().unwrap_or_default()),
        quote_always(el.attr("path").unwrap_or_default()),
    ];
    let children: Vec<&Element> = el.child_elements().collect();
    let last = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate() {
        match child.tag.as_str() {
            "instance_attributes" => words.extend(attr_set_words(child, "attributes", opts)),
            "meta_attributes" => words.extend(attr_set_words(child, "meta", opts)),
            "recipient" => {
                // a recipient needs braces when it carries sections of its
                // own or when alert-level sections follow it
                let braced = child.child_elements().next().is_some() || i < last;
                words.push(opts.keyword("to"));
                let value = quote_always(child.attr("value").unwrap_or_default());
                if braced {
                    words.push("{".to_string());
                    words.push(value);
                    for section in child.child_elements() {
                        match section.tag.as_str() {
                            "instance_attributes" => {
                                words.extend(attr_set_words(section, "attributes", opts))
                            }
                            "meta_attributes" => {
                                words.extend(attr_set_words(section, "meta", opts))
                            }
                            _ => {}
                        }
                    }
                    words.push("}".to_string());
                } else {
                    words.push(value);
                }
            }
            _ => {}
        }
    }
    words
}
