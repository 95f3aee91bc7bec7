//! In-memory document
//!
//! [`MemoryDom`] keeps nodes in a slotmap arena. It is the reference
//! [`DomBackend`] and the one tests run against: besides the backend
//! operations it can serialize a subtree to HTML, query classes, style,
//! properties and attributes, and count the mutations a pass performed.

use std::any::Any;
use std::fmt::Write as _;

use indexmap::{IndexMap, IndexSet};
use slotmap::SlotMap;

use crate::backend::{DomBackend, Listener, Namespace, NodeId, PropValue};
use crate::error::{DomError, Result};

#[derive(Debug)]
struct ElementData {
    tag: String,
    ns: Namespace,
    classes: IndexSet<String>,
    style: String,
    properties: IndexMap<String, PropValue>,
    attributes: IndexMap<String, String>,
}

#[derive(Debug)]
enum NodeData {
    Text(String),
    Element(ElementData),
}

#[derive(Debug)]
struct MemoryNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A document held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryDom {
    nodes: SlotMap<NodeId, MemoryNode>,
    mutations: usize,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating operations performed so far
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    pub fn reset_mutations(&mut self) {
        self.mutations = 0;
    }

    /// Whether the node is still live
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Tag of an element
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    pub fn namespace(&self, node: NodeId) -> Option<Namespace> {
        self.element(node).map(|el| el.ns)
    }

    /// Data of a text node
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node)?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    /// Concatenated text of a subtree
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Classes of an element in the order they were added
    pub fn classes(&self, node: NodeId) -> Vec<&str> {
        self.element(node)
            .map(|el| el.classes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.classes.contains(class))
    }

    /// Inline style text of an element
    pub fn style(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.style.as_str())
    }

    pub fn property(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        self.element(node)?.properties.get(name)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    /// Descendant elements with the given tag, in document order
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.tag(node) == Some(tag) {
                found.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        found
    }

    /// Serialize a node and its subtree
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Serialize the children of a node
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node)?.data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut MemoryNode> {
        self.nodes.get_mut(node).ok_or(DomError::StaleNode(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData> {
        match &mut self.node_mut(node)?.data {
            NodeData::Element(el) => Ok(el),
            NodeData::Text(_) => Err(DomError::NotAnElement(node)),
        }
    }

    fn check_live(&self, node: NodeId) -> Result<()> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(DomError::StaleNode(node))
        }
    }

    /// Remove a node from its parent's child list, if it has one
    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&c| c != node);
        }
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.check_live(child)?;
        self.element_mut(parent)?;
        self.detach(child);
        let siblings = &mut self.node_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mutations += 1;
        Ok(())
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node) else {
            return;
        };
        match &n.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for &child in &n.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node) else {
            return;
        };
        match &n.data {
            NodeData::Text(text) => escape_into(text, out),
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                if !el.classes.is_empty() {
                    let classes: Vec<&str> = el.classes.iter().map(String::as_str).collect();
                    let _ = write!(out, " class=\"{}\"", classes.join(" "));
                }
                if !el.style.is_empty() {
                    out.push_str(" style=\"");
                    escape_into(&el.style, out);
                    out.push('"');
                }
                for (name, value) in &el.attributes {
                    let _ = write!(out, " {name}=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                for &child in &n.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

impl DomBackend for MemoryDom {
    fn create_element(&mut self, tag: &str, ns: Namespace) -> NodeId {
        self.mutations += 1;
        self.nodes.insert(MemoryNode {
            data: NodeData::Element(ElementData {
                tag: tag.to_owned(),
                ns,
                classes: IndexSet::new(),
                style: String::new(),
                properties: IndexMap::new(),
                attributes: IndexMap::new(),
            }),
            parent: None,
            children: Vec::new(),
        })
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.mutations += 1;
        self.nodes.insert(MemoryNode {
            data: NodeData::Text(text.to_owned()),
            parent: None,
            children: Vec::new(),
        })
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        match &mut self.node_mut(node)?.data {
            NodeData::Text(data) => {
                data.clear();
                data.push_str(text);
            }
            NodeData::Element(_) => return Err(DomError::NotText(node)),
        }
        self.mutations += 1;
        Ok(())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.children.first().copied()
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_at(parent, usize::MAX, child)
    }

    fn prepend(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_at(parent, 0, child)
    }

    fn insert_after(&mut self, parent: NodeId, anchor: NodeId, child: NodeId) -> Result<()> {
        if anchor == child || self.parent(anchor) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: anchor,
            });
        }
        self.check_live(child)?;
        self.detach(child);
        let index = self
            .children(parent)
            .iter()
            .position(|&c| c == anchor)
            .ok_or(DomError::NotAChild {
                parent,
                child: anchor,
            })?;
        self.insert_at(parent, index + 1, child)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_live(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        self.mutations += 1;
        Ok(())
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        if self.element_mut(node)?.classes.insert(class.to_owned()) {
            self.mutations += 1;
        }
        Ok(())
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        if self.element_mut(node)?.classes.shift_remove(class) {
            self.mutations += 1;
        }
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, css: &str) -> Result<()> {
        let el = self.element_mut(node)?;
        el.style.clear();
        el.style.push_str(css);
        self.mutations += 1;
        Ok(())
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: PropValue) -> Result<()> {
        self.element_mut(node)?
            .properties
            .insert(name.to_owned(), value);
        self.mutations += 1;
        Ok(())
    }

    fn delete_property(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.element_mut(node)?.properties.shift_remove(name);
        self.mutations += 1;
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        self.mutations += 1;
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.element_mut(node)?.attributes.shift_remove(name);
        self.mutations += 1;
        Ok(())
    }

    fn listener(&self, node: NodeId, kind: &str) -> Option<Listener> {
        let el = self.element(node)?;
        let value = el
            .properties
            .iter()
            .find(|(name, _)| name.strip_prefix("on") == Some(kind))
            .map(|(_, value)| value)?;
        value.as_listener().cloned()
    }

    fn release(&mut self, node: NodeId) {
        if !self.nodes.contains_key(node) {
            return;
        }
        self.detach(node);
        if let Some(released) = self.nodes.remove(node) {
            for child in released.children {
                if let Some(child) = self.nodes.get_mut(child) {
                    child.parent = None;
                }
            }
        }
        self.mutations += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(dom: &mut MemoryDom) -> NodeId {
        dom.create_element("div", Namespace::Html)
    }

    #[test]
    fn test_child_insertion_order() {
        let mut dom = MemoryDom::new();
        let root = div(&mut dom);
        let a = dom.create_text("a");
        let b = dom.create_text("b");
        let c = dom.create_text("c");

        dom.append(root, b).unwrap();
        dom.prepend(root, a).unwrap();
        dom.insert_after(root, b, c).unwrap();
        assert_eq!(dom.children(root), &[a, b, c]);
        assert_eq!(dom.inner_html(root), "abc");

        dom.remove_child(root, b).unwrap();
        assert_eq!(dom.children(root), &[a, c]);
        assert_eq!(dom.parent(b), None);
    }

    #[test]
    fn test_insert_moves_attached_node() {
        let mut dom = MemoryDom::new();
        let left = div(&mut dom);
        let right = div(&mut dom);
        let child = dom.create_text("x");

        dom.append(left, child).unwrap();
        dom.append(right, child).unwrap();
        assert!(dom.children(left).is_empty());
        assert_eq!(dom.parent(child), Some(right));
    }

    #[test]
    fn test_structural_errors() {
        let mut dom = MemoryDom::new();
        let root = div(&mut dom);
        let stray = dom.create_text("s");
        let other = dom.create_text("o");

        assert_eq!(
            dom.remove_child(root, stray),
            Err(DomError::NotAChild {
                parent: root,
                child: stray
            })
        );
        assert!(dom.insert_after(root, stray, other).is_err());
        assert_eq!(dom.add_class(stray, "x"), Err(DomError::NotAnElement(stray)));

        dom.release(stray);
        assert_eq!(dom.set_text(stray, "y"), Err(DomError::StaleNode(stray)));
    }

    #[test]
    fn test_html_serialization() {
        let mut dom = MemoryDom::new();
        let root = div(&mut dom);
        dom.add_class(root, "a").unwrap();
        dom.add_class(root, "b").unwrap();
        dom.set_style(root, "color:red;").unwrap();
        let svg = dom.create_element("svg", Namespace::Svg);
        dom.set_attribute(svg, "width", "10").unwrap();
        let text = dom.create_text("1 < 2");
        dom.append(root, svg).unwrap();
        dom.append(root, text).unwrap();

        assert_eq!(
            dom.to_html(root),
            r#"<div class="a b" style="color:red;"><svg width="10"></svg>1 &lt; 2</div>"#
        );
        assert_eq!(dom.find_by_tag(root, "svg"), vec![svg]);
        assert_eq!(dom.text_content(root), "1 < 2");
    }

    #[test]
    fn test_listener_lookup() {
        let mut dom = MemoryDom::new();
        let button = dom.create_element("button", Namespace::Html);
        let listener = Listener::callback(|_| {});
        dom.set_property(button, "onclick", listener.clone().into())
            .unwrap();
        dom.set_property(button, "title", "x".into()).unwrap();

        assert_eq!(dom.listener(button, "click"), Some(listener));
        assert_eq!(dom.listener(button, "input"), None);
    }

    #[test]
    fn test_release_orphans_children() {
        let mut dom = MemoryDom::new();
        let root = div(&mut dom);
        let inner = div(&mut dom);
        let leaf = dom.create_text("leaf");
        dom.append(root, inner).unwrap();
        dom.append(inner, leaf).unwrap();

        dom.release(inner);
        assert!(!dom.contains(inner));
        assert!(dom.children(root).is_empty());
        assert_eq!(dom.parent(leaf), None);
        assert!(dom.contains(leaf));
    }

    #[test]
    fn test_mutation_counter() {
        let mut dom = MemoryDom::new();
        let root = div(&mut dom);
        dom.reset_mutations();
        dom.add_class(root, "a").unwrap();
        // Adding a class already present does not mutate
        dom.add_class(root, "a").unwrap();
        assert_eq!(dom.mutations(), 1);
    }
}
