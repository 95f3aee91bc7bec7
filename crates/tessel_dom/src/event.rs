//! DOM events routed into the tree
//!
//! An [`Event`] is shared by every pass it causes: the RECV pass that lets the
//! receiving component react to it and the UPDATE pass that follows. The
//! cancel and propagation flags use interior mutability so handlers holding a
//! shared reference can still set them.

use std::cell::Cell;
use std::fmt;

/// Data carried by an event
#[derive(Clone, Debug, PartialEq, Default)]
pub enum EventPayload {
    #[default]
    None,
    /// New text of an input
    Text(String),
    /// New checked state
    Bool(bool),
    Number(f64),
    /// Pointer position relative to the target
    Pointer { x: f64, y: f64 },
    /// Key name
    Key(String),
}

/// Kind of payload a component produces, declared as capability metadata
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    None,
    Text,
    Bool,
    Number,
    Pointer,
    Key,
}

impl EventPayload {
    /// The kind of this payload
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::None => PayloadKind::None,
            Self::Text(_) => PayloadKind::Text,
            Self::Bool(_) => PayloadKind::Bool,
            Self::Number(_) => PayloadKind::Number,
            Self::Pointer { .. } => PayloadKind::Pointer,
            Self::Key(_) => PayloadKind::Key,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Key(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// An event delivered to the tree
pub struct Event {
    kind: String,
    payload: EventPayload,
    cancelable: bool,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    immediate_stopped: Cell<bool>,
}

impl Event {
    /// Create a non-cancelable event without payload
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: EventPayload::None,
            cancelable: false,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            immediate_stopped: Cell::new(false),
        }
    }

    /// A cancelable `click`
    pub fn click() -> Self {
        Self::new("click").cancelable(true)
    }

    /// An `input` event carrying the new text
    pub fn input(text: impl Into<String>) -> Self {
        Self::new("input").with_payload(EventPayload::Text(text.into()))
    }

    /// A `change` event carrying a checked state
    pub fn change(checked: bool) -> Self {
        Self::new("change").with_payload(EventPayload::Bool(checked))
    }

    /// Builder: attach a payload
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Builder: set whether the default action may be prevented
    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// The event name without the `on` prefix (`click`, `input`, ...)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    /// Prevent the default action; returns `false` if the event is not cancelable
    pub fn prevent_default(&self) -> bool {
        if self.cancelable {
            self.default_prevented.set(true);
        }
        self.cancelable
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop the event from bubbling to further ancestors
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// Stop bubbling and skip the remaining listeners of the current node
    pub fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_stopped.set(true);
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_stopped.get()
    }

    /// Name of the property holding this event's listener (`onclick`)
    pub fn listener_name(&self) -> String {
        format!("on{}", self.kind)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("payload", &self.payload)
            .field("cancelable", &self.cancelable)
            .field("default_prevented", &self.default_prevented.get())
            .field("propagation_stopped", &self.propagation_stopped.get())
            .field("immediate_stopped", &self.immediate_stopped.get())
            .finish()
    }
}
