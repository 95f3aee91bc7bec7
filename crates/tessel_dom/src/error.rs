//! Error types for tessel_dom

use thiserror::Error;

use crate::backend::NodeId;

/// Errors raised by a [`DomBackend`](crate::DomBackend)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The handle refers to a node that was released
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),

    /// The node is not a child of the given parent
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// The operation needs an element, not a text node
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// The operation needs a text node
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
}

/// Result type for DOM operations
pub type Result<T> = std::result::Result<T, DomError>;
