//! The attributed element tree.
//!
//! Attributes and children are ordered vectors: deserializing and
//! re-serializing a document reproduces the relative order in which every
//! structure was encountered, and the CLI renderer walks children in stored
//! order. Comment lines attached to an object are leading comment nodes.

use serde::{Deserialize, Serialize};

/// One node of an element's child list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// A verbatim `# ...` comment line attached to the enclosing object.
    Comment(String),
    Element(Element),
}

/// An attributed element: tag, ordered attributes, ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute append.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value in place (the original
    /// position is kept) or appending a new one.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(pos).1)
    }

    /// The object identifier, when present.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_comment(&mut self, text: &str) {
        self.children.push(Node::Comment(text.to_string()));
    }

    /// Child elements in order, skipping comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(el) => Some(el),
            Node::Comment(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(el) => Some(el),
            Node::Comment(_) => None,
        })
    }

    /// Leading comment nodes attached to this object.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|n| match n {
            Node::Comment(text) => Some(text.as_str()),
            Node::Element(_) => None,
        })
    }

    /// First child element with the given tag.
    pub fn first_child(&self, tag: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.tag == tag)
    }

    pub fn first_child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|el| el.tag == tag)
    }

    /// Depth-first walk over this element and every descendant element.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for child in self.child_elements() {
            child.walk(visit);
        }
    }
}
