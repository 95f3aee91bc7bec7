//! Tessel Application Runtime
//!
//! An immediate-mode UI runtime: the whole view is re-run on every pass and
//! call-site identity decides which DOM nodes and component instances
//! persist between passes.
//!
//! - **Passes**: UPDATE passes build and patch the DOM; RECV passes deliver an
//!   event to the component that created the listener and touch no DOM
//! - **Dispatch**: every [`Context`] call is an element, a text node or a
//!   component, keyed by its call site
//! - **Staging**: classes, style, properties and refs are set just before the
//!   call they apply to; components forward them to their primary element
//!
//! # Example
//!
//! ```rust
//! use tessel_app::prelude::*;
//!
//! let count = Binding::new(0);
//! let state = count.clone();
//! let mut app = App::new(move |ctx: &mut Context<'_>| {
//!     ctx.element("p", state.get().to_string());
//!     if ctx.component::<Button>("+".to_string()) {
//!         state.update(|n| *n += 1);
//!     }
//! });
//! app.update().unwrap();
//!
//! let button = app.backend::<MemoryDom>().unwrap().find_by_tag(app.root_node(), "button")[0];
//! app.dispatch_event(button, Event::click()).unwrap();
//! assert_eq!(count.get(), 1);
//! ```

mod app;
pub mod builtins;
mod component;
mod config;
mod content;
mod context;
mod error;
mod handle;
mod runtime;
mod staging;


pub use app::App;
pub use component::{AnyComponent, Capability, Component, Registry};
pub use config::Config;
pub use content::{view, Content, View, ViewResult, TEXT_KEY};
pub use context::Context;
pub use error::{AppError, RenderFailure, RenderResult, Result};
pub use handle::{Handle, NodeRef};
pub use runtime::{Phase, PhaseKind, PassStats, RuntimeStats, UpdateHandle};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::app::App;
    pub use crate::builtins::{Button, TextInput, ToggleButton, ToggleButtonProps};
    pub use crate::component::{Capability, Component, Registry};
    pub use crate::config::Config;
    pub use crate::content::{view, Content, View};
    pub use crate::context::Context;
    pub use crate::error::{AppError, RenderFailure, RenderResult, Result};
    pub use crate::handle::{Handle, NodeRef};
    pub use crate::runtime::{PassStats, PhaseKind, RuntimeStats, UpdateHandle};

    // Core types
    pub use tessel_core::{Binding, Ckey, Ikey, Ref, Value};

    // DOM types
    pub use tessel_dom::{
        DomBackend, Event, EventPayload, Listener, MemoryDom, NodeId, PayloadKind, PropValue,
    };
}
