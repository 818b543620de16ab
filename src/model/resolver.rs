//! ID assignment and reference resolution.
//!
//! Elements created without an explicit identifier receive one derived from
//! the parent identifier and their structural role (`<parent>-meta_attributes`,
//! `<parent>-<op-name>-<interval>`, `<parent>-<ordinal>` for resource sets),
//! so repeated structures get distinct, reproducible names.
//!
//! References take four forms: bare identifier (positional resource
//! reference), `@id` (value substitution from another object's attribute
//! set, stored as an `id-ref` nvpair), `ref:id` (ACL subject by id), and
//! `type:`/`pattern:` classification subjects, which match by kind rather
//! than identity and are not resolved here.

use crate::error::{Result, ShellError};
use crate::model::element::Element;
use crate::model::idmgmt::IdRegistry;

/// Walk a freshly parsed object and assign every missing identifier.
///
/// The object's own id must already be present (generated or explicit) and
/// registered by the caller.
pub fn assign_ids(el: &mut Element, reg: &mut IdRegistry) -> Result<()> {
    let parent_id = el
        .id()
        .ok_or_else(|| ShellError::Semantic(format!("object <{}> has no identifier", el.tag)))?
        .to_string();
    let mut set_ordinal = 0usize;
    for child in el.child_elements_mut() {
        let tag = child.tag.clone();
        match tag.as_str() {
            "instance_attributes" | "meta_attributes" | "utilization" => {
                let set_id = ensure_id(child, reg, &format!("{}-{}", parent_id, tag))?;
                assign_set_member_ids(child, reg, &set_id)?;
            }
            "operations" => {
                for op in child.child_elements_mut() {
                    let name = op.attr("name").unwrap_or("op").to_string();
                    let interval = op.attr("interval").unwrap_or("0").to_string();
                    ensure_id(op, reg, &format!("{}-{}-{}", parent_id, name, interval))?;
                }
            }
            "resource_set" => {
                ensure_id(child, reg, &format!("{}-{}", parent_id, set_ordinal))?;
                set_ordinal += 1;
            }
            "rule" => {
                let rule_id = ensure_id(child, reg, &format!("{}-rule", parent_id))?;
                assign_expression_ids(child, reg, &rule_id)?;
            }
            "acl_permission" => {
                let kind = child.attr("kind").unwrap_or("perm").to_string();
                ensure_id(child, reg, &format!("{}-{}", parent_id, kind))?;
            }
            "recipient" => {
                let recipient_id = ensure_id(child, reg, &format!("{}-recipient", parent_id))?;
                for set in child.child_elements_mut() {
                    let set_tag = set.tag.clone();
                    let set_id = ensure_id(set, reg, &format!("{}-{}", recipient_id, set_tag))?;
                    assign_set_member_ids(set, reg, &set_id)?;
                }
            }
            "fencing-level" => {
                let index = child.attr("index").unwrap_or("0").to_string();
                ensure_id(child, reg, &format!("fencing_level-{}", index))?;
            }
            // reference children carry the id of their target
            "crmsh-ref" | "resource_ref" | "role" => {}
            _ => {}
        }
    }
    Ok(())
}

/// Assign nvpair and nested-rule ids inside one attribute set.
fn assign_set_member_ids(set: &mut Element, reg: &mut IdRegistry, set_id: &str) -> Result<()> {
    for member in set.child_elements_mut() {
        let tag = member.tag.clone();
        match tag.as_str() {
            "nvpair" => {
                if member.has_attr("id-ref") {
                    continue;
                }
                let name = member.attr("name").unwrap_or("nv").to_string();
                ensure_id(member, reg, &format!("{}-{}", set_id, name))?;
            }
            "rule" => {
                let rule_id = ensure_id(member, reg, &format!("{}-rule", set_id))?;
                assign_expression_ids(member, reg, &rule_id)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn assign_expression_ids(rule: &mut Element, reg: &mut IdRegistry, rule_id: &str) -> Result<()> {
    for expr in rule.child_elements_mut() {
        ensure_id(expr, reg, &format!("{}-expression", rule_id))?;
    }
    Ok(())
}

/// Register an explicit id, or generate one from `base` if missing. Returns
/// the id the element ends up with.
fn ensure_id(el: &mut Element, reg: &mut IdRegistry, base: &str) -> Result<String> {
    if let Some(id) = el.id() {
        let id = id.to_string();
        reg.save(&id)?;
        return Ok(id);
    }
    let id = reg.generate(base);
    el.set_attr("id", &id);
    Ok(id)
}

/// Validate every `@id` reference inside an object against the registry.
pub fn validate_idrefs(el: &Element, reg: &IdRegistry) -> Result<()> {
    let mut missing: Option<String> = None;
    el.walk(&mut |node| {
        if missing.is_some() {
            return;
        }
        if let Some(idref) = node.attr("id-ref") {
            if !reg.contains(idref) {
                missing = Some(idref.to_string());
            }
        }
    });
    match missing {
        Some(idref) => Err(ShellError::Semantic(format!(
            "no such identifier: {}",
            idref
        ))),
        None => Ok(()),
    }
}

/// Collect every identifier defined inside an object subtree.
pub fn collect_ids(el: &Element) -> Vec<String> {
    let mut ids = Vec::new();
    el.walk(&mut |node| {
        // reference children carry foreign ids, not definitions
        if matches!(node.tag.as_str(), "crmsh-ref" | "resource_ref" | "role") {
            return;
        }
        if node.has_attr("id-ref") {
            return;
        }
        if let Some(id) = node.id() {
            ids.push(id.to_string());
        }
    });
    ids
}

/// Describe every reference `el` makes into `targets`. Used by delete to
/// report the dangling references it leaves behind.
pub fn references_into(el: &Element, targets: &[String]) -> Vec<String> {
    let hit = |v: &str| targets.iter().any(|t| t == v);
    let owner = el.id().unwrap_or("<anonymous>").to_string();
    let mut found = Vec::new();
    el.walk(&mut |node| {
        if let Some(idref) = node.attr("id-ref") {
            if hit(idref) {
                found.push(format!("{}: @{}", owner, idref));
            }
        }
        if matches!(node.tag.as_str(), "crmsh-ref" | "resource_ref" | "role") {
            if let Some(id) = node.id() {
                if hit(id) {
                    found.push(format!("{}: {}", owner, id));
                }
            }
        }
        for name in ["rsc", "with-rsc", "first", "then", "reference"] {
            if let Some(v) = node.attr(name) {
                if hit(v) {
                    found.push(format!("{}: {}={}", owner, name, v));
                }
            }
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nvpair_ids_follow_set_id() {
        let mut reg = IdRegistry::new();
        reg.save("dummy-5").unwrap();
        let mut el = Element::new("primitive").with_attr("id", "dummy-5").with_child(
            Element::new("instance_attributes")
                .with_child(Element::new("nvpair").with_attr("name", "buz").with_attr("value", "bin")),
        );
        assign_ids(&mut el, &mut reg).unwrap();
        let set = el.first_child("instance_attributes").unwrap();
        assert_eq!(set.id(), Some("dummy-5-instance_attributes"));
        let nv = set.first_child("nvpair").unwrap();
        assert_eq!(nv.id(), Some("dummy-5-instance_attributes-buz"));
    }

    #[test]
    fn test_op_ids_use_name_and_interval() {
        let mut reg = IdRegistry::new();
        reg.save("dummy").unwrap();
        let mut el = Element::new("primitive").with_attr("id", "dummy").with_child(
            Element::new("operations")
                .with_child(
                    Element::new("op")
                        .with_attr("name", "start")
                        .with_attr("timeout", "60")
                        .with_attr("interval", "0"),
                )
                .with_child(
                    Element::new("op")
                        .with_attr("name", "monitor")
                        .with_attr("interval", "60"),
                ),
        );
        assign_ids(&mut el, &mut reg).unwrap();
        let ops: Vec<&Element> = el.first_child("operations").unwrap().child_elements().collect();
        assert_eq!(ops[0].id(), Some("dummy-start-0"));
        assert_eq!(ops[1].id(), Some("dummy-monitor-60"));
    }

    #[test]
    fn test_resource_set_ids_are_ordinal() {
        let mut reg = IdRegistry::new();
        reg.save("colo-2").unwrap();
        let mut el = Element::new("rsc_colocation")
            .with_attr("id", "colo-2")
            .with_child(Element::new("resource_set"))
            .with_child(Element::new("resource_set"));
        assign_ids(&mut el, &mut reg).unwrap();
        let sets: Vec<&Element> = el.child_elements().collect();
        assert_eq!(sets[0].id(), Some("colo-2-0"));
        assert_eq!(sets[1].id(), Some("colo-2-1"));
    }

    #[test]
    fn test_idref_validation() {
        let mut reg = IdRegistry::new();
        reg.save("dummy-5-instance_attributes-buz").unwrap();
        let ok = Element::new("primitive").with_child(
            Element::new("instance_attributes")
                .with_child(Element::new("nvpair").with_attr("id-ref", "dummy-5-instance_attributes-buz")),
        );
        validate_idrefs(&ok, &reg).unwrap();

        let bad = Element::new("primitive").with_child(
            Element::new("instance_attributes")
                .with_child(Element::new("nvpair").with_attr("id-ref", "nowhere")),
        );
        assert!(matches!(
            validate_idrefs(&bad, &reg),
            Err(ShellError::Semantic(_))
        ));
    }
}
