//! Child list reconciliation
//!
//! After an UPDATE pass every element wrapper holds the children it was given
//! during the pass (`pending`) next to the children mounted by the previous
//! pass (`mounted`). [`Reconciler`] walks the pending list in order:
//!
//! - a child already mounted with the same node is patched in place, never moved
//! - a new child is inserted right after the previously processed child, or as
//!   the first child when nothing was processed yet
//! - mounted children left unused are detached
//!
//! The pending list then becomes the mounted list. Reordered children are not
//! detected; anchoring only guarantees new children land in call order.
//!
//! Portals mount their children into the root element, after the root's own
//! children, in the order the portals were visited.

use indexmap::IndexMap;
use tessel_core::Ikey;

use crate::backend::{DomBackend, NodeId};
use crate::error::Result;
use crate::node::DomNode;

/// Lookup of wrappers by identity
pub trait NodeStore {
    fn dom_node(&self, ikey: &str) -> Option<&DomNode>;

    fn dom_node_mut(&mut self, ikey: &str) -> Option<&mut DomNode>;
}

/// Counters collected while reconciling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Children inserted into a parent
    pub inserted: usize,
    /// Children patched in place
    pub patched: usize,
    /// Children detached from a parent
    pub removed: usize,
}

/// Applies the outcome of a pass to the backend
pub struct Reconciler<'a, S: NodeStore + ?Sized> {
    store: &'a mut S,
    dom: &'a mut dyn DomBackend,
    stats: ReconcileStats,
}

impl<'a, S: NodeStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a mut S, dom: &'a mut dyn DomBackend) -> Self {
        Self {
            store,
            dom,
            stats: ReconcileStats::default(),
        }
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// Reconcile the root element, then the portals visited this pass in
    /// order, then unmount the portals that were not visited.
    pub fn update_root(&mut self, root: &str, portals: &[Ikey], unvisited: &[Ikey]) -> Result<()> {
        self.update(root)?;
        let mut last = self
            .store
            .dom_node(root)
            .and_then(DomNode::as_element)
            .and_then(|el| el.last_mounted());
        for portal in portals {
            last = self.update_portal(portal, last)?;
        }
        for portal in unvisited {
            self.unmount_portal(portal)?;
        }
        Ok(())
    }

    /// Patch the subtree at `ikey` and return its node for anchoring
    pub fn update(&mut self, ikey: &str) -> Result<Option<NodeId>> {
        let Some(wrapper) = self.store.dom_node_mut(ikey) else {
            tracing::warn!(ikey, "child wrapper missing during reconciliation");
            return Ok(None);
        };
        let el = match wrapper {
            DomNode::Text(text) => return Ok(Some(text.node())),
            // Portal children are mounted by the root
            DomNode::Portal(_) => return Ok(None),
            DomNode::Element(el) => el,
        };

        el.apply_presentation(&mut *self.dom)?;
        let parent = el.node();
        let (pending, mounted) = el.take_children();

        let (mounted, _) = self.mount_children(parent, pending, mounted, None)?;
        if let Some(DomNode::Element(el)) = self.store.dom_node_mut(ikey) {
            el.set_mounted(mounted);
        }
        Ok(Some(parent))
    }

    /// Mount a portal's children after `last` and return the new last node
    pub fn update_portal(&mut self, ikey: &str, last: Option<NodeId>) -> Result<Option<NodeId>> {
        let Some(DomNode::Portal(portal)) = self.store.dom_node_mut(ikey) else {
            return Ok(last);
        };
        let parent = portal.node();
        let (pending, mounted) = portal.take_children();

        let (mounted, last) = self.mount_children(parent, pending, mounted, last)?;
        if let Some(DomNode::Portal(portal)) = self.store.dom_node_mut(ikey) {
            portal.set_mounted(mounted);
        }
        Ok(last)
    }

    /// Detach every child a portal mounted
    pub fn unmount_portal(&mut self, ikey: &str) -> Result<()> {
        let Some(DomNode::Portal(portal)) = self.store.dom_node_mut(ikey) else {
            return Ok(());
        };
        let parent = portal.node();
        let (_, mounted) = portal.take_children();
        for (_, node) in mounted {
            self.detach(parent, node)?;
        }
        Ok(())
    }

    fn mount_children(
        &mut self,
        parent: NodeId,
        pending: Vec<Ikey>,
        mut unused: IndexMap<Ikey, NodeId>,
        mut last: Option<NodeId>,
    ) -> Result<(IndexMap<Ikey, NodeId>, Option<NodeId>)> {
        let mut mounted = IndexMap::with_capacity(pending.len());

        for child in pending {
            if mounted.contains_key(&child) {
                tracing::warn!(ikey = %child, "child visited twice in one parent; keeping the first");
                continue;
            }
            let Some(node) = self.store.dom_node(&child).map(DomNode::node) else {
                continue;
            };

            if unused.get(&child) == Some(&node) {
                unused.shift_remove(&child);
                self.update(&child)?;
                self.stats.patched += 1;
            } else {
                match last {
                    Some(anchor) => self.dom.insert_after(parent, anchor, node)?,
                    None if self.dom.first_child(parent).is_some() => {
                        self.dom.prepend(parent, node)?
                    }
                    None => self.dom.append(parent, node)?,
                }
                self.stats.inserted += 1;
                self.update(&child)?;
            }

            last = Some(node);
            mounted.insert(child, node);
        }

        for (_, node) in unused {
            self.detach(parent, node)?;
        }
        Ok((mounted, last))
    }

    fn detach(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        // A node already released or moved has nothing left to detach here
        if self.dom.parent(node) == Some(parent) {
            self.dom.remove_child(parent, node)?;
            self.stats.removed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Namespace;
    use crate::node::{ElementNode, TextNode};
    use crate::MemoryDom;
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct Store(FxHashMap<Ikey, DomNode>);

    impl NodeStore for Store {
        fn dom_node(&self, ikey: &str) -> Option<&DomNode> {
            self.0.get(ikey)
        }

        fn dom_node_mut(&mut self, ikey: &str) -> Option<&mut DomNode> {
            self.0.get_mut(ikey)
        }
    }

    impl Store {
        fn root(&mut self) -> &mut ElementNode {
            self.0
                .get_mut("")
                .and_then(DomNode::as_container_mut)
                .unwrap()
        }

        fn visit(&mut self, children: &[&str]) {
            self.root().begin_pass();
            for child in children {
                self.root().push_child(Ikey::from(*child));
            }
        }
    }

    fn setup(dom: &mut MemoryDom, texts: &[&str]) -> (Store, NodeId) {
        let mut store = Store::default();
        let root = ElementNode::new(dom, "div", Namespace::Html);
        let node = root.node();
        store.0.insert(Ikey::from(""), DomNode::Element(root));
        for text in texts {
            store
                .0
                .insert(Ikey::from(*text), DomNode::Text(TextNode::new(dom, text)));
        }
        (store, node)
    }

    #[test]
    fn test_insert_in_call_order() {
        let mut dom = MemoryDom::new();
        let (mut store, root) = setup(&mut dom, &["a", "b", "c"]);

        store.visit(&["a", "c"]);
        Reconciler::new(&mut store, &mut dom).update("").unwrap();
        assert_eq!(dom.inner_html(root), "ac");

        // b lands between the two anchored children
        store.visit(&["a", "b", "c"]);
        let mut rec = Reconciler::new(&mut store, &mut dom);
        rec.update("").unwrap();
        assert_eq!(rec.stats().inserted, 1);
        assert_eq!(rec.stats().patched, 2);
        assert_eq!(dom.inner_html(root), "abc");
    }

    #[test]
    fn test_new_first_child_is_prepended() {
        let mut dom = MemoryDom::new();
        let (mut store, root) = setup(&mut dom, &["a", "b"]);

        store.visit(&["b"]);
        Reconciler::new(&mut store, &mut dom).update("").unwrap();
        store.visit(&["a", "b"]);
        Reconciler::new(&mut store, &mut dom).update("").unwrap();
        assert_eq!(dom.inner_html(root), "ab");
    }

    #[test]
    fn test_unused_children_removed() {
        let mut dom = MemoryDom::new();
        let (mut store, root) = setup(&mut dom, &["a", "b"]);

        store.visit(&["a", "b"]);
        Reconciler::new(&mut store, &mut dom).update("").unwrap();

        store.visit(&["a"]);
        let mut rec = Reconciler::new(&mut store, &mut dom);
        rec.update("").unwrap();
        assert_eq!(rec.stats().removed, 1);
        assert_eq!(dom.inner_html(root), "a");
        assert_eq!(store.root().mounted().count(), 1);
        assert!(store.root().pending().is_empty());
    }

    #[test]
    fn test_unchanged_pass_is_idempotent() {
        let mut dom = MemoryDom::new();
        let (mut store, root) = setup(&mut dom, &["a", "b"]);

        store.visit(&["a", "b"]);
        Reconciler::new(&mut store, &mut dom).update("").unwrap();
        let first = dom.children(root).to_vec();

        dom.reset_mutations();
        store.visit(&["a", "b"]);
        Reconciler::new(&mut store, &mut dom).update("").unwrap();
        assert_eq!(dom.children(root), first.as_slice());
        assert_eq!(dom.mutations(), 0);
    }

    #[test]
    fn test_portal_mounts_after_root_children() {
        let mut dom = MemoryDom::new();
        let (mut store, root) = setup(&mut dom, &["a", "p1"]);
        store.0.insert(
            Ikey::from("portal"),
            DomNode::Portal(ElementNode::wrap(root, "div", Namespace::Html)),
        );
        let portals = [Ikey::from("portal")];

        store.visit(&["a"]);
        if let Some(DomNode::Portal(portal)) = store.0.get_mut("portal") {
            portal.begin_pass();
            portal.push_child(Ikey::from("p1"));
        }
        Reconciler::new(&mut store, &mut dom)
            .update_root("", &portals, &[])
            .unwrap();
        assert_eq!(dom.inner_html(root), "ap1");

        // Portal not visited: its children are unmounted
        store.visit(&["a"]);
        Reconciler::new(&mut store, &mut dom)
            .update_root("", &[], &portals)
            .unwrap();
        assert_eq!(dom.inner_html(root), "a");
    }
}
