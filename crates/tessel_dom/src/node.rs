//! DOM node wrappers
//!
//! A wrapper owns one backend node and remembers what has been applied to it,
//! so a pass only pushes the difference. Element wrappers collect the classes,
//! style and children of the in-progress pass separately from the applied
//! state; the two are reconciled in [`Reconciler`](crate::Reconciler), never
//! while the tree is being walked.

use indexmap::{IndexMap, IndexSet};
use tessel_core::Ikey;

use crate::backend::{DomBackend, Namespace, NodeId, PropValue};
use crate::error::Result;

/// A wrapper stored in the ref table
#[derive(Debug)]
pub enum DomNode {
    Text(TextNode),
    Element(ElementNode),
    /// Content rendered at the end of the root element
    Portal(ElementNode),
}

impl DomNode {
    /// The backend node this wrapper owns (a portal reports the root node)
    pub fn node(&self) -> NodeId {
        match self {
            Self::Text(text) => text.node,
            Self::Element(el) | Self::Portal(el) => el.node,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The wrapper as a parent for children: an element or a portal
    pub fn as_container_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Self::Element(el) | Self::Portal(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    pub fn is_portal(&self) -> bool {
        matches!(self, Self::Portal(_))
    }
}

/// Wrapper of a text node
#[derive(Debug)]
pub struct TextNode {
    node: NodeId,
    text: String,
}

impl TextNode {
    pub fn new(dom: &mut dyn DomBackend, text: &str) -> Self {
        Self {
            node: dom.create_text(text),
            text: text.to_owned(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Write the text through when it changed
    pub fn set_text(&mut self, dom: &mut dyn DomBackend, text: &str) -> Result<bool> {
        if self.text == text {
            return Ok(false);
        }
        dom.set_text(self.node, text)?;
        self.text.clear();
        self.text.push_str(text);
        Ok(true)
    }
}

/// Wrapper of an element node
#[derive(Debug)]
pub struct ElementNode {
    node: NodeId,
    tag: String,
    ns: Namespace,
    /// Classes currently on the node
    classes: IndexSet<String>,
    /// Classes collected during the in-progress pass
    pass_classes: IndexSet<String>,
    style: String,
    pass_style: String,
    /// Properties and attributes currently assigned
    props: IndexMap<String, PropValue>,
    /// Children from the last completed pass
    mounted: IndexMap<Ikey, NodeId>,
    /// Children collected during the in-progress pass
    pending: Vec<Ikey>,
}

impl ElementNode {
    /// Create the backend element and wrap it
    pub fn new(dom: &mut dyn DomBackend, tag: &str, ns: Namespace) -> Self {
        Self::wrap(dom.create_element(tag, ns), tag, ns)
    }

    /// Wrap an element the caller already owns
    pub fn wrap(node: NodeId, tag: &str, ns: Namespace) -> Self {
        Self {
            node,
            tag: tag.to_owned(),
            ns,
            classes: IndexSet::new(),
            pass_classes: IndexSet::new(),
            style: String::new(),
            pass_style: String::new(),
            props: IndexMap::new(),
            mounted: IndexMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn ns(&self) -> Namespace {
        self.ns
    }

    /// Whether this wrapper can be reused for a call of `tag` in `ns`
    pub fn matches(&self, tag: &str, ns: Namespace) -> bool {
        self.ns == ns && self.tag == tag
    }

    /// Reset the per-pass state when the element is visited
    pub fn begin_pass(&mut self) {
        self.pass_classes.clear();
        self.pass_style.clear();
        self.pending.clear();
    }

    /// Add classes for this pass
    pub fn add_classes<I, S>(&mut self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass_classes.extend(classes.into_iter().map(Into::into));
    }

    /// Append inline style text for this pass
    pub fn add_style(&mut self, css: &str) {
        self.pass_style.push_str(css);
    }

    /// Record a child visited this pass
    pub fn push_child(&mut self, ikey: Ikey) {
        self.pending.push(ikey);
    }

    pub fn pending(&self) -> &[Ikey] {
        &self.pending
    }

    /// Children mounted by the last completed pass, in order
    pub fn mounted(&self) -> impl Iterator<Item = (&Ikey, NodeId)> {
        self.mounted.iter().map(|(ikey, node)| (ikey, *node))
    }

    /// Node of the last mounted child
    pub fn last_mounted(&self) -> Option<NodeId> {
        self.mounted.last().map(|(_, node)| *node)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    /// Assign staged properties.
    ///
    /// HTML elements take every value as a property. SVG elements take
    /// attributes, string-coerced, except listeners which stay properties.
    /// `Undefined` deletes; a value equal to the applied one is skipped.
    pub fn apply_props(
        &mut self,
        dom: &mut dyn DomBackend,
        props: IndexMap<String, PropValue>,
    ) -> Result<()> {
        for (name, value) in props {
            if value.is_undefined() {
                if let Some(previous) = self.props.shift_remove(&name) {
                    match (self.ns, previous) {
                        (Namespace::Svg, PropValue::Listener(_)) | (Namespace::Html, _) => {
                            dom.delete_property(self.node, &name)?
                        }
                        (Namespace::Svg, _) => dom.remove_attribute(self.node, &name)?,
                    }
                }
                continue;
            }
            if self.props.get(&name) == Some(&value) {
                continue;
            }
            match (self.ns, value.to_attribute()) {
                (Namespace::Svg, Some(attribute)) => {
                    dom.set_attribute(self.node, &name, &attribute)?
                }
                _ => dom.set_property(self.node, &name, value.clone())?,
            }
            self.props.insert(name, value);
        }
        Ok(())
    }

    /// Apply the pass's classes and style as a diff against the node
    pub(crate) fn apply_presentation(&mut self, dom: &mut dyn DomBackend) -> Result<()> {
        for class in &self.pass_classes {
            if !self.classes.contains(class) {
                dom.add_class(self.node, class)?;
            }
        }
        for class in &self.classes {
            if !self.pass_classes.contains(class) {
                dom.remove_class(self.node, class)?;
            }
        }
        self.classes = std::mem::take(&mut self.pass_classes);

        if self.pass_style != self.style {
            dom.set_style(self.node, &self.pass_style)?;
        }
        self.style = std::mem::take(&mut self.pass_style);
        Ok(())
    }

    pub(crate) fn take_children(&mut self) -> (Vec<Ikey>, IndexMap<Ikey, NodeId>) {
        (
            std::mem::take(&mut self.pending),
            std::mem::take(&mut self.mounted),
        )
    }

    pub(crate) fn set_mounted(&mut self, mounted: IndexMap<Ikey, NodeId>) {
        self.mounted = mounted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDom;

    #[test]
    fn test_presentation_diff() {
        let mut dom = MemoryDom::new();
        let mut el = ElementNode::new(&mut dom, "div", Namespace::Html);

        el.begin_pass();
        el.add_classes(["a", "b"]);
        el.add_style("color:red;");
        el.apply_presentation(&mut dom).unwrap();
        assert_eq!(dom.classes(el.node()), vec!["a", "b"]);

        el.begin_pass();
        el.add_classes(["b", "c"]);
        el.add_style("color:red;");
        dom.reset_mutations();
        el.apply_presentation(&mut dom).unwrap();
        assert_eq!(dom.classes(el.node()), vec!["b", "c"]);
        // add c, remove a; style unchanged
        assert_eq!(dom.mutations(), 2);
        assert_eq!(el.style(), "color:red;");
    }

    #[test]
    fn test_html_props_skip_unchanged() {
        let mut dom = MemoryDom::new();
        let mut el = ElementNode::new(&mut dom, "input", Namespace::Html);
        let props = || IndexMap::from([("value".to_owned(), PropValue::from("x"))]);

        el.apply_props(&mut dom, props()).unwrap();
        dom.reset_mutations();
        el.apply_props(&mut dom, props()).unwrap();
        assert_eq!(dom.mutations(), 0);

        el.apply_props(
            &mut dom,
            IndexMap::from([("value".to_owned(), PropValue::Undefined)]),
        )
        .unwrap();
        assert_eq!(dom.property(el.node(), "value"), None);
    }

    #[test]
    fn test_svg_props_become_attributes() {
        let mut dom = MemoryDom::new();
        let mut el = ElementNode::new(&mut dom, "circle", Namespace::Svg);
        el.apply_props(
            &mut dom,
            IndexMap::from([
                ("r".to_owned(), PropValue::from(4)),
                (
                    "onclick".to_owned(),
                    PropValue::from(crate::Listener::callback(|_| {})),
                ),
            ]),
        )
        .unwrap();
        assert_eq!(dom.attribute(el.node(), "r"), Some("4"));
        assert!(dom.listener(el.node(), "click").is_some());

        el.apply_props(
            &mut dom,
            IndexMap::from([("r".to_owned(), PropValue::Undefined)]),
        )
        .unwrap();
        assert_eq!(dom.attribute(el.node(), "r"), None);
    }

    #[test]
    fn test_text_write_through() {
        let mut dom = MemoryDom::new();
        let mut text = TextNode::new(&mut dom, "a");
        assert!(!text.set_text(&mut dom, "a").unwrap());
        assert!(text.set_text(&mut dom, "b").unwrap());
        assert_eq!(dom.text(text.node()), Some("b"));
    }
}
