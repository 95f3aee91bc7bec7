//! Runtime state shared by every pass
//!
//! The [`Runtime`] owns the backend, the ref table and the key path. A pass
//! borrows it through a [`Context`](crate::Context); after an UPDATE pass it
//! reconciles the DOM and sweeps the instances the pass did not visit.

use std::any::{Any, TypeId};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tessel_core::{Ikey, KeyPath, RefTable};
use tessel_dom::{
    DomBackend, DomError, DomNode, ElementNode, Event, Namespace, NodeId, NodeStore, Reconciler,
};

use crate::component::{ComponentSlot, Registry};
use crate::config::Config;
use crate::error::{RenderFailure, Result};

/// Which of the two passes is running
#[derive(Clone, Debug)]
pub enum Phase {
    /// Logic only: deliver `event` to the component at `receiver`
    Recv { receiver: Ikey, event: Rc<Event> },
    /// Build and patch the DOM, optionally after an event
    Update { event: Option<Rc<Event>> },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::Recv { .. } => PhaseKind::Recv,
            Self::Update { .. } => PhaseKind::Update,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update { .. })
    }

    pub fn is_recv(&self) -> bool {
        matches!(self, Self::Recv { .. })
    }

    /// The event that caused this pass
    pub fn event(&self) -> Option<&Event> {
        match self {
            Self::Recv { event, .. } => Some(event),
            Self::Update { event } => event.as_deref(),
        }
    }

    pub fn receiver(&self) -> Option<&Ikey> {
        match self {
            Self::Recv { receiver, .. } => Some(receiver),
            Self::Update { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Recv,
    Update,
}

/// Counters of one pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassStats {
    pub phase: PhaseKind,
    /// Instances created by the pass
    pub created: usize,
    /// Instances reused from an earlier pass
    pub reused: usize,
    /// DOM nodes inserted into a parent
    pub inserted: usize,
    /// DOM nodes detached from a parent
    pub removed: usize,
    /// Ref table entries dropped because the pass did not visit them
    pub evicted: usize,
}

impl PassStats {
    pub fn new(phase: PhaseKind) -> Self {
        Self {
            phase,
            created: 0,
            reused: 0,
            inserted: 0,
            removed: 0,
            evicted: 0,
        }
    }

    pub(crate) fn count(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.reused += 1;
        }
    }
}

/// Totals over the lifetime of an app
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub recv_passes: u64,
    pub update_passes: u64,
    /// Live ref table entries, the root included
    pub instances: usize,
}

/// Shared flag set when an update is requested
pub type DirtyFlag = Arc<AtomicBool>;

/// Requests a future UPDATE pass; cheap to clone and `Send`
#[derive(Clone, Debug)]
pub struct UpdateHandle {
    flag: DirtyFlag,
}

impl UpdateHandle {
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// What the ref table stores
pub(crate) enum Instance {
    Node(DomNode),
    Component(ComponentSlot),
}

/// The ref table of an app
pub(crate) struct InstanceTable(RefTable<Instance>);

impl InstanceTable {
    pub fn component_mut(&mut self, ikey: &str) -> Option<&mut ComponentSlot> {
        match self.0.resolve_mut(ikey)? {
            Instance::Component(slot) => Some(slot),
            Instance::Node(_) => None,
        }
    }

    pub fn component(&self, ikey: &str) -> Option<&ComponentSlot> {
        match self.0.resolve(ikey)? {
            Instance::Component(slot) => Some(slot),
            Instance::Node(_) => None,
        }
    }

    pub fn element_mut(&mut self, ikey: &str) -> Option<&mut ElementNode> {
        match self.0.resolve_mut(ikey)? {
            Instance::Node(node) => node.as_element_mut(),
            Instance::Component(_) => None,
        }
    }

    /// An element or portal that can take children
    pub fn container_mut(&mut self, ikey: &str) -> Option<&mut ElementNode> {
        match self.0.resolve_mut(ikey)? {
            Instance::Node(node) => node.as_container_mut(),
            Instance::Component(_) => None,
        }
    }
}

impl Deref for InstanceTable {
    type Target = RefTable<Instance>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for InstanceTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl NodeStore for InstanceTable {
    fn dom_node(&self, ikey: &str) -> Option<&DomNode> {
        match self.0.resolve(ikey)? {
            Instance::Node(node) => Some(node),
            Instance::Component(_) => None,
        }
    }

    fn dom_node_mut(&mut self, ikey: &str) -> Option<&mut DomNode> {
        match self.0.resolve_mut(ikey)? {
            Instance::Node(node) => Some(node),
            Instance::Component(_) => None,
        }
    }
}

pub(crate) type ErrorHook = Box<dyn FnMut(&RenderFailure)>;

pub(crate) struct Runtime {
    pub dom: Box<dyn DomBackend>,
    pub table: InstanceTable,
    pub keys: KeyPath,
    pub registry: Registry,
    pub config: Config,
    /// Identity of the root element wrapper
    pub root: Ikey,
    pub root_node: NodeId,
    pub error_hook: Option<ErrorHook>,
    pub providers: FxHashMap<TypeId, Rc<dyn Any>>,
    pub dirty: DirtyFlag,
    /// Portals visited by the in-progress pass, in order
    pub pending_portals: Vec<Ikey>,
    pub mounted_portals: Vec<Ikey>,
    pub pass: PassStats,
    pub totals: RuntimeStats,
    /// First backend failure of the in-progress pass
    pub dom_failure: Option<DomError>,
}

impl Runtime {
    /// Create a runtime; the root element is created unless `root` is given
    pub fn new(config: Config, mut dom: Box<dyn DomBackend>, root: Option<NodeId>) -> Self {
        let root_el = match root {
            Some(node) => ElementNode::wrap(node, &config.root_tag, Namespace::Html),
            None => ElementNode::new(&mut *dom, &config.root_tag, Namespace::Html),
        };
        let root_node = root_el.node();

        let mut table = InstanceTable(RefTable::new());
        let root = table
            .visit_or_insert_with("", || Instance::Node(DomNode::Element(root_el)))
            .ikey;

        let keys = KeyPath::new(config.key_separator).with_duplicate_tracking(config.diagnostics);

        Self {
            dom,
            table,
            keys,
            registry: Registry::with_builtins(),
            config,
            root,
            root_node,
            error_hook: None,
            providers: FxHashMap::default(),
            dirty: Arc::new(AtomicBool::new(false)),
            pending_portals: Vec::new(),
            mounted_portals: Vec::new(),
            pass: PassStats::new(PhaseKind::Update),
            totals: RuntimeStats::default(),
            dom_failure: None,
        }
    }

    /// Reset per-pass state
    pub fn begin_pass(&mut self, kind: PhaseKind) {
        self.pass = PassStats::new(kind);
        self.providers.clear();
        self.keys.reset();
        self.dom_failure = None;

        match kind {
            PhaseKind::Recv => self.totals.recv_passes += 1,
            PhaseKind::Update => {
                self.totals.update_passes += 1;
                self.dirty.store(false, Ordering::Release);
                self.table.begin_pass();
                self.pending_portals.clear();
                if let Some(Instance::Node(DomNode::Element(root))) = self.table.visit(&self.root) {
                    root.begin_pass();
                    root.add_classes(self.config.root_classes.iter().cloned());
                }
            }
        }
    }

    /// Reconcile the DOM and evict what the pass did not visit
    pub fn commit(&mut self) -> Result<()> {
        let unvisited: Vec<Ikey> = self
            .mounted_portals
            .iter()
            .filter(|&portal| !self.pending_portals.contains(portal))
            .cloned()
            .collect();

        let stats = {
            let mut reconciler = Reconciler::new(&mut self.table, &mut *self.dom);
            reconciler.update_root(&self.root, &self.pending_portals, &unvisited)?;
            reconciler.stats()
        };
        self.pass.inserted = stats.inserted;
        self.pass.removed = stats.removed;
        self.mounted_portals = std::mem::take(&mut self.pending_portals);

        let evicted = self.table.sweep();
        self.pass.evicted = evicted.len();
        for (ikey, instance) in evicted {
            tracing::trace!(ikey = %ikey, "evicting instance");
            self.release(instance);
        }
        self.totals.instances = self.table.len();

        match self.dom_failure.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Give up an instance removed from the table
    pub fn release(&mut self, instance: Instance) {
        match instance {
            // A portal borrows the root node
            Instance::Node(DomNode::Portal(_)) => {}
            Instance::Node(node) => self.dom.release(node.node()),
            Instance::Component(_) => {}
        }
    }

    /// Hand a render failure to the error hook, or log it
    pub fn report(&mut self, failure: RenderFailure) {
        match self.error_hook.as_mut() {
            Some(hook) => hook(&failure),
            None => tracing::error!(ikey = %failure.ikey, "render failed: {:#}", failure.error),
        }
    }

    /// Remember the first backend failure of the pass
    pub fn record_dom_failure(&mut self, err: DomError) {
        tracing::warn!(error = %err, "DOM operation failed");
        self.dom_failure.get_or_insert(err);
    }

    pub fn update_handle(&self) -> UpdateHandle {
        UpdateHandle {
            flag: Arc::clone(&self.dirty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_dom::MemoryDom;

    #[test]
    fn test_root_is_created_and_kept() {
        let mut rt = Runtime::new(Config::development(), Box::new(MemoryDom::new()), None);
        assert!(rt.table.contains(""));

        rt.begin_pass(PhaseKind::Update);
        rt.commit().unwrap();
        assert!(rt.table.contains(""));
        assert_eq!(rt.pass.evicted, 0);
        assert_eq!(rt.totals.instances, 1);
    }

    #[test]
    fn test_update_handle_sets_dirty_flag() {
        let mut rt = Runtime::new(Config::development(), Box::new(MemoryDom::new()), None);
        let handle = rt.update_handle();
        handle.request();
        assert!(handle.is_requested());

        rt.begin_pass(PhaseKind::Update);
        assert!(!handle.is_requested());
    }

    #[test]
    fn test_phase_event_access() {
        let event = Rc::new(Event::click());
        let recv = Phase::Recv {
            receiver: Ikey::from("btn"),
            event: event.clone(),
        };
        assert_eq!(recv.kind(), PhaseKind::Recv);
        assert_eq!(recv.event().map(Event::kind), Some("click"));
        assert_eq!(recv.receiver().map(|r| r.as_str()), Some("btn"));

        let update = Phase::Update { event: None };
        assert!(update.event().is_none());
        assert!(update.is_update());
    }
}
