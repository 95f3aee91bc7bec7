//! The DOM backend seam
//!
//! Node wrappers and the reconciler never touch a document directly; every
//! mutation goes through [`DomBackend`]. [`MemoryDom`](crate::MemoryDom) is the
//! in-process implementation; a browser backend plugs in through the same
//! trait.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use slotmap::{new_key_type, Key};
use tessel_core::Ikey;

use crate::error::Result;
use crate::event::Event;

new_key_type! {
    /// Handle to a node owned by a backend
    pub struct NodeId;
}

impl NodeId {
    /// Convert to a raw u64 representation
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Element namespace
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
}

/// An event listener stored as an element property
#[derive(Clone)]
pub enum Listener {
    /// Route the event to a component identity through a RECV pass
    Fire { receiver: Ikey },
    /// Run a closure before the UPDATE pass
    Callback(Rc<dyn Fn(&Event)>),
}

impl Listener {
    /// Wrap a closure
    pub fn callback(f: impl Fn(&Event) + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fire { receiver: a }, Self::Fire { receiver: b }) => a == b,
            (Self::Callback(a), Self::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fire { receiver } => f.debug_struct("Fire").field("receiver", receiver).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// A value assigned to an element property or attribute
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// Remove the property or attribute
    Undefined,
    Bool(bool),
    Number(f64),
    Text(String),
    Listener(Listener),
}

impl PropValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Self::Listener(listener) => Some(listener),
            _ => None,
        }
    }

    /// String form used for attribute assignment; `None` for values that
    /// cannot be stringified
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Number(value) => Some(value.to_string()),
            Self::Text(text) => Some(text.clone()),
            Self::Undefined | Self::Listener(_) => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Listener> for PropValue {
    fn from(value: Listener) -> Self {
        Self::Listener(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

/// A document the runtime can build and patch
///
/// Creation is infallible; every operation on an existing node reports a
/// stale handle or a structural mismatch as a [`DomError`](crate::DomError).
pub trait DomBackend {
    /// Create a detached element
    fn create_element(&mut self, tag: &str, ns: Namespace) -> NodeId;

    /// Create a detached text node
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Replace the data of a text node
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    /// Append `child` as the last child of `parent`, detaching it first
    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Insert `child` as the first child of `parent`, detaching it first
    fn prepend(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Insert `child` directly after `anchor`, which must be a child of `parent`
    fn insert_after(&mut self, parent: NodeId, anchor: NodeId, child: NodeId) -> Result<()>;

    /// Detach `child` from `parent`
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()>;

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()>;

    /// Replace the inline style text
    fn set_style(&mut self, node: NodeId, css: &str) -> Result<()>;

    fn set_property(&mut self, node: NodeId, name: &str, value: PropValue) -> Result<()>;

    fn delete_property(&mut self, node: NodeId, name: &str) -> Result<()>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()>;

    /// The listener registered on `node` for events of `kind` (`click` reads `onclick`)
    fn listener(&self, node: NodeId, kind: &str) -> Option<Listener>;

    /// Drop a node no wrapper refers to anymore
    fn release(&mut self, node: NodeId);

    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_equality() {
        let a = Listener::callback(|_| {});
        let b = a.clone();
        let c = Listener::callback(|_| {});
        assert_eq!(a, b);
        assert_ne!(a, c);

        let fire = Listener::Fire {
            receiver: Ikey::from("btn"),
        };
        assert_eq!(
            fire,
            Listener::Fire {
                receiver: Ikey::from("btn")
            }
        );
        assert_ne!(fire, a);
    }

    #[test]
    fn test_attribute_coercion() {
        assert_eq!(PropValue::from(1.0).to_attribute().as_deref(), Some("1"));
        assert_eq!(PropValue::from(2.5).to_attribute().as_deref(), Some("2.5"));
        assert_eq!(PropValue::from(true).to_attribute().as_deref(), Some("true"));
        assert_eq!(PropValue::Undefined.to_attribute(), None);
        assert_eq!(PropValue::from(None::<&str>), PropValue::Undefined);
    }
}
