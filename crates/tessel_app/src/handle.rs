//! Handles to instances produced by a call

use tessel_core::{Ikey, Ref};
use tessel_dom::NodeId;

/// What a call produced, as seen by a ref or by the caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Handle {
    Element { ikey: Ikey, node: NodeId },
    Text { ikey: Ikey, node: NodeId },
    Component { ikey: Ikey },
    Portal { ikey: Ikey },
}

impl Handle {
    pub fn ikey(&self) -> &Ikey {
        match self {
            Self::Element { ikey, .. }
            | Self::Text { ikey, .. }
            | Self::Component { ikey }
            | Self::Portal { ikey } => ikey,
        }
    }

    /// The backend node, for elements and text nodes
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Element { node, .. } | Self::Text { node, .. } => Some(*node),
            Self::Component { .. } | Self::Portal { .. } => None,
        }
    }
}

/// A ref target filled by the next call after [`Context::set_ref`](crate::Context::set_ref)
pub type NodeRef = Ref<Handle>;
