//! Resource definitions: primitives, templates, groups, clones.

use crate::error::{Result, ShellError};
use crate::model::Element;
use crate::schema::Schema;

use super::common::{is_group_marker, parse_attr_set, parse_nv, Cursor, Nv};

const PRIMITIVE_SECTIONS: &[&str] = &["params", "meta", "op"];
const CONTAINER_SECTIONS: &[&str] = &["params", "meta"];

/// `primitive <id> [<class>:[<provider>:]]<type> [params ...] [meta ...]
/// [op <name> <nv>...]...` — also used for `rsc_template` (tag `template`).
pub fn parse_primitive(cur: &mut Cursor<'_>, schema: &dyn Schema, tag: &str) -> Result<Element> {
    let id = cur.expect_word()?;
    let agent = cur.expect_word()?;
    let mut el = Element::new(tag);
    el.set_attr("id", id);
    let agent_type = set_agent_attrs(&mut el, agent)?;
    loop {
        match cur.peek() {
            None => break,
            Some("params") => {
                cur.advance();
                let set = parse_attr_set(
                    cur,
                    "instance_attributes",
                    PRIMITIVE_SECTIONS,
                    Some((schema, &agent_type)),
                )?;
                el.push_element(set);
            }
            Some("meta") => {
                cur.advance();
                let set = parse_attr_set(cur, "meta_attributes", PRIMITIVE_SECTIONS, None)?;
                el.push_element(set);
            }
            Some("op") => {
                cur.advance();
                let op = parse_op(cur)?;
                if el.first_child("operations").is_none() {
                    el.push_element(Element::new("operations"));
                }
                if let Some(ops) = el.first_child_mut("operations") {
                    ops.push_element(op);
                }
            }
            Some(_) => return Err(cur.err()),
        }
    }
    Ok(el)
}

/// Split `class:provider:type` into its attribute parts; bare `type` and
/// `class:type` are legal spellings.
fn set_agent_attrs(el: &mut Element, agent: &str) -> Result<String> {
    let parts: Vec<&str> = agent.split(':').collect();
    let agent_type = match parts.as_slice() {
        [t] if !t.is_empty() => {
            el.set_attr("type", t);
            t.to_string()
        }
        [c, t] if !c.is_empty() && !t.is_empty() => {
            el.set_attr("class", c);
            el.set_attr("type", t);
            t.to_string()
        }
        [c, p, t] if !c.is_empty() && !p.is_empty() && !t.is_empty() => {
            el.set_attr("class", c);
            el.set_attr("provider", p);
            el.set_attr("type", t);
            t.to_string()
        }
        _ => return Err(ShellError::Syntax(agent.to_string())),
    };
    Ok(agent_type)
}

/// `op <name> <nv>...` — attrs keep their CLI order after the name.
fn parse_op(cur: &mut Cursor<'_>) -> Result<Element> {
    let name = cur.expect_word()?;
    let mut op = Element::new("op");
    op.set_attr("name", name);
    while let Some(tok) = cur.peek() {
        if PRIMITIVE_SECTIONS.contains(&tok) {
            break;
        }
        match parse_nv(tok) {
            Some(Nv::Pair {
                id: None,
                name,
                value: Some(value),
            }) => {
                op.set_attr(&name, &value);
                cur.advance();
            }
            _ => break,
        }
    }
    Ok(op)
}

/// `group <id> <rsc>... [params ...] [meta ...]` — members are stored as
/// references, not copies.
pub fn parse_group(cur: &mut Cursor<'_>) -> Result<Element> {
    let id = cur.expect_word()?;
    let mut el = Element::new("group");
    el.set_attr("id", id);
    let mut members = 0usize;
    while let Some(tok) = cur.peek() {
        if CONTAINER_SECTIONS.contains(&tok) || is_group_marker(tok) || tok.contains('=') {
            break;
        }
        el.push_element(Element::new("crmsh-ref").with_attr("id", tok));
        members += 1;
        cur.advance();
    }
    if members == 0 {
        return Err(cur.err());
    }
    parse_container_sections(cur, &mut el)?;
    Ok(el)
}

/// `clone <id> <rsc> [params ...] [meta ...]` — also `ms` (tag `ms`).
pub fn parse_clone(cur: &mut Cursor<'_>, tag: &str) -> Result<Element> {
    let id = cur.expect_word()?;
    let child = cur.expect_word()?;
    if is_group_marker(child) || child.contains('=') {
        return Err(ShellError::Syntax(child.to_string()));
    }
    let mut el = Element::new(tag);
    el.set_attr("id", id);
    el.push_element(Element::new("crmsh-ref").with_attr("id", child));
    parse_container_sections(cur, &mut el)?;
    Ok(el)
}

fn parse_container_sections(cur: &mut Cursor<'_>, el: &mut Element) -> Result<()> {
    loop {
        match cur.peek() {
            None => break,
            Some("params") => {
                cur.advance();
                let set = parse_attr_set(cur, "instance_attributes", CONTAINER_SECTIONS, None)?;
                el.push_element(set);
            }
            Some("meta") => {
                cur.advance();
                let set = parse_attr_set(cur, "meta_attributes", CONTAINER_SECTIONS, None)?;
                el.push_element(set);
            }
            Some(_) => return Err(cur.err()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::split_line;
    use crate::schema::{NullSchema, StaticSchema};

    fn primitive(text: &str, schema: &dyn Schema) -> Result<Element> {
        let toks = split_line(text).unwrap();
        let mut cur = Cursor::new(&toks[1..]);
        parse_primitive(&mut cur, schema, "primitive")
    }

    #[test]
    fn test_agent_spellings() {
        let el = primitive("primitive d0 ocf:pacemaker:Dummy", &NullSchema).unwrap();
        assert_eq!(el.attr("class"), Some("ocf"));
        assert_eq!(el.attr("provider"), Some("pacemaker"));
        assert_eq!(el.attr("type"), Some("Dummy"));

        let el = primitive("primitive vm1 Xen", &NullSchema).unwrap();
        assert_eq!(el.attr("class"), None);
        assert_eq!(el.attr("type"), Some("Xen"));

        let el = primitive("primitive s1 me:Special", &NullSchema).unwrap();
        assert_eq!(el.attr("class"), Some("me"));
        assert_eq!(el.attr("provider"), None);
        assert_eq!(el.attr("type"), Some("Special"));
    }

    #[test]
    fn test_normalization_applies_to_known_params_only() {
        let schema = StaticSchema::with_entries(&[("Xen", &["shutdown_timeout"])]);
        let el = primitive("primitive vm1 Xen params shutdown-timeout=0", &schema).unwrap();
        let set = el.first_child("instance_attributes").unwrap();
        let nv = set.first_child("nvpair").unwrap();
        assert_eq!(nv.attr("name"), Some("shutdown_timeout"));
    }

    #[test]
    fn test_ops_collect_in_order() {
        let el = primitive(
            "primitive d0 Dummy op start timeout=60 interval=0 op monitor interval=60 timeout=30",
            &NullSchema,
        )
        .unwrap();
        let ops: Vec<&Element> = el.first_child("operations").unwrap().child_elements().collect();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].attr("name"), Some("start"));
        let names: Vec<&str> = ops[1].attrs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["name", "interval", "timeout"]);
    }

    #[test]
    fn test_group_members_then_sections() {
        let toks = split_line("group g1 p1 p2 meta target-role=Stopped").unwrap();
        let mut cur = Cursor::new(&toks[1..]);
        let el = parse_group(&mut cur).unwrap();
        let tags: Vec<&str> = el.child_elements().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, ["crmsh-ref", "crmsh-ref", "meta_attributes"]);
    }

    #[test]
    fn test_group_without_members_is_an_error() {
        let toks = split_line("group g1").unwrap();
        let mut cur = Cursor::new(&toks[1..]);
        assert!(parse_group(&mut cur).is_err());
    }
}
