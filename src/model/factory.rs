//! The document factory.
//!
//! Owns the element forest and the identifier registry. Objects are created
//! from CLI text or from a deserialized element tree, mutated only through
//! explicit edit commands, and destroyed by explicit delete. A parse or
//! validation failure leaves the document exactly as it was: identifiers are
//! assigned against a scratch registry that only replaces the real one once
//! the whole object is accepted.

use crate::error::{Result, ShellError};
use crate::lexing::split_line;
use crate::model::element::{Element, Node};
use crate::model::idmgmt::IdRegistry;
use crate::model::resolver;
use crate::parse;
use crate::render::{render_object, RenderOpts};
use crate::schema::Schema;

#[derive(Debug, Default)]
pub struct CibFactory {
    objects: Vec<Element>,
    registry: IdRegistry,
}

impl CibFactory {
    pub fn new() -> Self {
        CibFactory::default()
    }

    pub fn objects(&self) -> &[Element] {
        &self.objects
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Create one object from CLI text. The text may carry leading `#`
    /// comment lines, which are attached to the object, and continuation
    /// markers, which are joined before tokenizing.
    pub fn create_from_cli(&mut self, text: &str, schema: &dyn Schema) -> Result<&Element> {
        let logical = crate::lexing::join_continuations(text.lines());
        let mut comments = Vec::new();
        let mut definition = None;
        for line in &logical {
            if line.starts_with('#') {
                comments.push(line.clone());
            } else if !line.trim().is_empty() {
                if definition.is_some() {
                    return Err(ShellError::Syntax(line.clone()));
                }
                definition = Some(line.clone());
            }
        }
        let definition = definition.ok_or_else(|| ShellError::Syntax(text.to_string()))?;
        let tokens = split_line(&definition)?;
        self.create_from_tokens(&tokens, &comments, schema)
    }

    /// Create one object from a pre-split token slice (the dispatcher path;
    /// the slice starts with the object-kind keyword).
    pub fn create_from_tokens(
        &mut self,
        tokens: &[String],
        comments: &[String],
        schema: &dyn Schema,
    ) -> Result<&Element> {
        let mut el = parse::parse_object(tokens, schema)?;
        for comment in comments.iter().rev() {
            el.children.insert(0, Node::Comment(comment.clone()));
        }
        self.commit(el)
    }

    /// Insert a deserialized element (the structured-document path).
    pub fn create_from_element(&mut self, el: Element) -> Result<&Element> {
        self.commit(el)
    }

    /// Register identifiers, validate references, and adopt the object.
    /// Nothing is committed on failure.
    fn commit(&mut self, mut el: Element) -> Result<&Element> {
        let mut scratch = self.registry.clone();
        match el.id() {
            Some(id) => scratch.save(id)?,
            None => {
                let id = scratch.generate(&el.tag.clone());
                el.set_attr("id", &id);
            }
        }
        resolver::assign_ids(&mut el, &mut scratch)?;
        resolver::validate_idrefs(&el, &scratch)?;
        self.registry = scratch;
        tracing::debug!(id = el.id().unwrap_or(""), tag = %el.tag, "object created");
        self.objects.push(el);
        Ok(self.objects.last().expect("just pushed"))
    }

    /// Find a top-level object by identifier.
    pub fn find(&self, id: &str) -> Option<&Element> {
        self.objects.iter().find(|el| el.id() == Some(id))
    }

    /// Delete an object. Returns descriptions of the dangling references the
    /// deletion leaves behind; they are reported, never silently dropped.
    pub fn delete(&mut self, id: &str) -> Result<Vec<String>> {
        let pos = self
            .objects
            .iter()
            .position(|el| el.id() == Some(id))
            .ok_or_else(|| ShellError::Semantic(format!("object {} does not exist", id)))?;
        let removed = self.objects.remove(pos);
        let removed_ids = resolver::collect_ids(&removed);
        for rid in &removed_ids {
            self.registry.remove(rid);
        }
        let mut dangling = Vec::new();
        for obj in &self.objects {
            dangling.extend(resolver::references_into(obj, &removed_ids));
        }
        for d in &dangling {
            tracing::warn!(reference = %d, deleted = id, "dangling reference left by delete");
        }
        Ok(dangling)
    }

    /// Rename a top-level object, updating references document-wide.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if self.registry.contains(new) {
            return Err(ShellError::Semantic(format!(
                "identifier already in use: {}",
                new
            )));
        }
        let pos = self
            .objects
            .iter()
            .position(|el| el.id() == Some(old))
            .ok_or_else(|| ShellError::Semantic(format!("object {} does not exist", old)))?;
        self.objects[pos].set_attr("id", new);
        self.registry.remove(old);
        self.registry.save(new)?;
        for obj in &mut self.objects {
            rewrite_references(obj, old, new);
        }
        Ok(())
    }

    /// Drop the whole document.
    pub fn erase(&mut self) {
        self.objects.clear();
        self.registry.clear();
    }

    /// Resolve an `@id` reference to the value stored under that nvpair
    /// identifier. Resolving a deleted identifier is a semantic error, not
    /// an empty value.
    pub fn resolve_reference(&self, idref: &str) -> Result<String> {
        for obj in &self.objects {
            let mut value = None;
            obj.walk(&mut |node| {
                if node.tag == "nvpair" && node.id() == Some(idref) {
                    value = node.attr("value").map(|v| v.to_string());
                }
            });
            if let Some(v) = value {
                return Ok(v);
            }
        }
        Err(ShellError::Semantic(format!(
            "no such identifier: {}",
            idref
        )))
    }

    /// Render the whole document (or a selection of ids) as canonical text,
    /// one object per line.
    pub fn render(&self, ids: &[String], opts: &RenderOpts) -> Result<String> {
        let mut out = Vec::new();
        if ids.is_empty() {
            for obj in &self.objects {
                out.push(render_object(obj, opts)?);
            }
        } else {
            for id in ids {
                let obj = self
                    .find(id)
                    .ok_or_else(|| ShellError::Semantic(format!("object {} does not exist", id)))?;
                out.push(render_object(obj, opts)?);
            }
        }
        Ok(out.join("\n"))
    }

    /// Encode the document as the structured interchange tree.
    pub fn to_interchange(&self) -> Result<String> {
        let root = Element {
            tag: "configuration".to_string(),
            attrs: Vec::new(),
            children: self.objects.iter().cloned().map(Node::Element).collect(),
        };
        serde_json::to_string_pretty(&root).map_err(|e| ShellError::External(e.to_string()))
    }

    /// Load a document from the structured interchange tree. Replaces the
    /// current document only if every object is accepted.
    pub fn from_interchange(text: &str) -> Result<CibFactory> {
        let root: Element =
            serde_json::from_str(text).map_err(|e| ShellError::External(e.to_string()))?;
        let mut factory = CibFactory::new();
        for node in root.children {
            if let Node::Element(el) = node {
                factory.create_from_element(el)?;
            }
        }
        Ok(factory)
    }
}

fn rewrite_references(el: &mut Element, old: &str, new: &str) {
    for name in ["id-ref", "rsc", "with-rsc", "first", "then", "reference"] {
        if el.attr(name) == Some(old) {
            el.set_attr(name, new);
        }
    }
    if matches!(el.tag.as_str(), "crmsh-ref" | "resource_ref" | "role") && el.id() == Some(old) {
        el.set_attr("id", new);
    }
    for child in el.child_elements_mut() {
        rewrite_references(child, old, new);
    }
}
