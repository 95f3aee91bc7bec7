//! Components
//!
//! A component is a persistent unit of state plus a render procedure. The
//! runtime creates it on the first visit of its identity, runs [`render`]
//! once per pass that visits it, and drops it when a full pass no longer
//! reaches it.
//!
//! ```rust
//! use tessel_app::prelude::*;
//!
//! #[derive(Default)]
//! struct Greeting {
//!     renders: u32,
//! }
//!
//! impl Component for Greeting {
//!     type Props = String;
//!     type Output = ();
//!
//!     fn render(&mut self, ctx: &mut Context<'_>, name: String) -> RenderResult {
//!         self.renders += 1;
//!         ctx.element("p", format!("hello {name}"));
//!         Ok(())
//!     }
//! }
//! ```
//!
//! [`render`]: Component::render

use std::any::{type_name, Any, TypeId};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tessel_core::Ikey;
use tessel_dom::{PayloadKind, PropValue};

use crate::context::Context;
use crate::error::{AppError, RenderResult};

/// Declared interaction metadata of a component
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Capability {
    /// Produces only its render output
    #[default]
    Output,
    /// Fires on an event carrying `payload`
    Trigger { payload: PayloadKind },
    /// Reports a status change by writing a bound value
    Status,
}

impl Capability {
    /// Whether the component may create listeners
    pub fn is_interactive(self) -> bool {
        !matches!(self, Self::Output)
    }
}

/// A user-defined component
pub trait Component: Default + 'static {
    /// Arguments of one call
    type Props: 'static;
    /// What the call returns; the default is returned when the render fails
    type Output: Default + 'static;

    const CAPABILITY: Capability = Capability::Output;

    fn render(&mut self, ctx: &mut Context<'_>, props: Self::Props) -> RenderResult<Self::Output>;

    /// Accept a staged property; return `false` for unknown names
    fn assign(&mut self, key: &str, value: &PropValue) -> bool {
        let _ = (key, value);
        false
    }
}

/// Object-safe view of a [`Component`]
pub trait AnyComponent: 'static {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_name(&self) -> &'static str;
    fn capability(&self) -> Capability;
    fn assign_prop(&mut self, key: &str, value: &PropValue) -> bool;
    fn render_dyn(&mut self, ctx: &mut Context<'_>, props: Box<dyn Any>) -> RenderResult<Box<dyn Any>>;
}

impl<C: Component> AnyComponent for C {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn capability(&self) -> Capability {
        C::CAPABILITY
    }

    fn assign_prop(&mut self, key: &str, value: &PropValue) -> bool {
        self.assign(key, value)
    }

    fn render_dyn(&mut self, ctx: &mut Context<'_>, props: Box<dyn Any>) -> RenderResult<Box<dyn Any>> {
        let props = props
            .downcast::<C::Props>()
            .map_err(|_| AppError::PropsMismatch {
                name: type_name::<C>().to_owned(),
                expected: type_name::<C::Props>(),
            })?;
        Ok(Box::new(self.render(ctx, *props)?))
    }
}

pub(crate) fn construct<C: Component>() -> Box<dyn AnyComponent> {
    Box::new(C::default())
}

fn default_output<C: Component>() -> Box<dyn Any> {
    Box::new(C::Output::default())
}

/// How a registered component is built and called
#[derive(Clone, Copy)]
pub(crate) struct Registration {
    pub construct: fn() -> Box<dyn AnyComponent>,
    pub default_output: fn() -> Box<dyn Any>,
    pub type_id: TypeId,
    pub props: TypeId,
    pub props_name: &'static str,
    pub capability: Capability,
}

/// Components callable by name
#[derive(Default)]
pub struct Registry {
    entries: FxHashMap<String, Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the reference components
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<crate::builtins::Button>("Button");
        registry.register::<crate::builtins::TextInput>("TextInput");
        registry.register::<crate::builtins::ToggleButton>("ToggleButton");
        registry
    }

    /// Register `C` under `name`; returns `true` if it replaced an entry
    pub fn register<C: Component>(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let registration = Registration {
            construct: construct::<C>,
            default_output: default_output::<C>,
            type_id: TypeId::of::<C>(),
            props: TypeId::of::<C::Props>(),
            props_name: type_name::<C::Props>(),
            capability: C::CAPABILITY,
        };
        let replaced = self.entries.insert(name.clone(), registration).is_some();
        if replaced {
            tracing::warn!(name = %name, "component registration replaced");
        }
        replaced
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Declared capability of a registered component
    pub fn capability(&self, name: &str) -> Option<Capability> {
        self.entries.get(name).map(|entry| entry.capability)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn get(&self, name: &str) -> Option<Registration> {
        self.entries.get(name).copied()
    }
}

/// Components waiting for a primary element
pub(crate) type Owners = SmallVec<[Ikey; 4]>;

/// Ref table entry of a component
pub(crate) struct ComponentSlot {
    /// Taken out while the component renders
    pub instance: Option<Box<dyn AnyComponent>>,
    pub type_id: TypeId,
    pub capability: Capability,
    /// Element receiving classes/style meant for the component
    pub primary: Option<Ikey>,
    /// Whether `primary` was set through `main()`
    pub explicit: bool,
}

impl ComponentSlot {
    pub fn new(instance: Box<dyn AnyComponent>, type_id: TypeId) -> Self {
        let capability = instance.capability();
        Self {
            instance: Some(instance),
            type_id,
            capability,
            primary: None,
            explicit: false,
        }
    }

    /// Offer a default primary element; an explicit designation wins
    pub fn offer_primary(&mut self, element: &Ikey) {
        if !self.explicit {
            self.primary = Some(element.clone());
        }
    }

    /// Offer a primary element only if none is known yet
    pub fn offer_primary_once(&mut self, element: &Ikey) {
        if self.primary.is_none() {
            self.primary = Some(element.clone());
        }
    }

    pub fn designate(&mut self, element: Ikey) {
        self.primary = Some(element);
        self.explicit = true;
    }

    pub fn begin_render(&mut self) {
        self.primary = None;
        self.explicit = false;
    }
}

/// What a component's render left for its caller to merge
pub(crate) struct RenderOutcome {
    /// The element the component settled on, if any
    pub primary_element: Option<Ikey>,
    /// Owners queued before the component was called
    pub pending_owners: Owners,
}
