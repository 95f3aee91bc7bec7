//! Tessel DOM Layer
//!
//! Everything between the traversal and a real document:
//!
//! - **Backend seam**: [`DomBackend`] with [`MemoryDom`] as the in-memory implementation
//! - **Wrappers**: [`DomNode`] owns one backend node and the state applied to it
//! - **Reconciliation**: [`Reconciler`] turns the children collected during a
//!   pass into anchored insertions and removals
//! - **Events**: [`Event`] and the [`Listener`] values stored on elements
//!
//! # Example
//!
//! ```rust
//! use tessel_dom::{DomBackend, MemoryDom, Namespace};
//!
//! let mut dom = MemoryDom::new();
//! let root = dom.create_element("div", Namespace::Html);
//! let text = dom.create_text("hello");
//! dom.append(root, text).unwrap();
//! assert_eq!(dom.to_html(root), "<div>hello</div>");
//! ```

pub mod backend;
pub mod error;
pub mod event;
pub mod memory;
pub mod node;
pub mod reconcile;

pub use backend::{DomBackend, Listener, Namespace, NodeId, PropValue};
pub use error::{DomError, Result};
pub use event::{Event, EventPayload, PayloadKind};
pub use memory::MemoryDom;
pub use node::{DomNode, ElementNode, TextNode};
pub use reconcile::{NodeStore, ReconcileStats, Reconciler};
