//! In-memory page model.
//!
//! A [`Document`] is an arena of elements addressed by [`NodeId`]. It carries
//! exactly what the parallax pipeline reads and writes: tags, ids, classes,
//! attributes, inline style, and the parent/child structure.
//!
//! Node ids stay valid for the lifetime of the document. Removing a subtree
//! detaches it from its parent rather than freeing it, so a stale id resolves
//! to a disconnected element instead of a different one.
//!
//! ## Queries
//!
//! All multi-node queries return nodes in document order (pre-order, parent
//! before children, siblings left to right). Scoped lookups search only the
//! descendants of the scope, never the scope itself.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// Element kinds the page model knows how to hold and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Body,
    Section,
    Div,
    Img,
    Script,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Body => "body",
            Tag::Section => "section",
            Tag::Div => "div",
            Tag::Img => "img",
            Tag::Script => "script",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: Tag,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes (including `id`), sorted by name.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    /// Inline style serialized as `prop: value; ...`, or `None` when empty.
    pub fn style_text(&self) -> Option<String> {
        if self.style.is_empty() {
            return None;
        }
        Some(
            self.style
                .iter()
                .map(|(k, v)| format!("{k}: {v};"))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed element tree rooted at a `<body>`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new(Tag::Body)],
        }
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: Tag) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    ///
    /// Ignored when either id is unknown or `child` is an ancestor of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        if self.ancestors_inclusive(parent).any(|n| n == child) {
            return;
        }
        self.detach(child);
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_new(&mut self, parent: NodeId, tag: Tag) -> NodeId {
        let node = self.create_element(tag);
        self.append_child(parent, node);
        node
    }

    /// Remove `node` from its parent's child list.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.get(node).and_then(Element::parent) else {
            return;
        };
        if let Some(el) = self.get_mut(parent) {
            el.children.retain(|c| *c != node);
        }
        if let Some(el) = self.get_mut(node) {
            el.parent = None;
        }
    }

    /// Detach every child of `node`. Returns how many were removed.
    pub fn clear_children(&mut self, node: NodeId) -> usize {
        let Some(el) = self.get_mut(node) else {
            return 0;
        };
        let children = std::mem::take(&mut el.children);
        for child in &children {
            if let Some(c) = self.get_mut(*child) {
                c.parent = None;
            }
        }
        children.len()
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.set_attribute(node, "id", id);
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.get_mut(node) {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.style.insert(property.to_string(), value.to_string());
        }
    }

    /// Iterate from `node` up through its ancestors.
    pub fn ancestors_inclusive(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(node).map(|_| node), move |n| {
            self.get(*n).and_then(Element::parent)
        })
    }

    /// Whether `node` is reachable from the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.ancestors_inclusive(node).any(|n| n == self.body())
    }

    /// Nearest element (starting with `node` itself) carrying `class`.
    pub fn closest(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.ancestors_inclusive(node)
            .find(|n| self.get(*n).is_some_and(|el| el.has_class(class)))
    }

    /// Descendants of `root` in document order, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(root) {
            Some(el) => el.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(el) = self.get(node) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    /// Descendants of `root` carrying `class`, in document order.
    pub fn query_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|n| self.get(*n).is_some_and(|el| el.has_class(class)))
            .collect()
    }

    /// First descendant of `scope` whose `id` equals `id`.
    pub fn find_by_id_within(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| self.get(*n).and_then(Element::id) == Some(id))
    }
}
