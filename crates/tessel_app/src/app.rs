//! Tessel Application
//!
//! The root driver. An [`App`] owns the runtime and the main render
//! procedure, runs UPDATE passes on demand and turns DOM events into RECV
//! passes followed by a single UPDATE.

use std::rc::Rc;
use std::sync::atomic::Ordering;

use tessel_dom::{DomBackend, Event, Listener, MemoryDom, NodeId};

use crate::component::{Component, Registry};
use crate::config::Config;
use crate::content::ViewResult;
use crate::context::Context;
use crate::error::{RenderFailure, RenderResult, Result};
use crate::runtime::{Phase, PhaseKind, PassStats, Runtime, RuntimeStats, UpdateHandle};

type MainFn = Box<dyn FnMut(&mut Context<'_>) -> RenderResult<()>>;

/// A Tessel application
///
/// # Example
///
/// ```rust
/// use tessel_app::prelude::*;
///
/// let mut app = App::new(|ctx: &mut Context<'_>| {
///     ctx.element("h1", "Hello Tessel!");
/// });
/// app.update().unwrap();
///
/// let dom = app.backend::<MemoryDom>().unwrap();
/// assert_eq!(dom.inner_html(app.root_node()), "<h1>Hello Tessel!</h1>");
/// ```
pub struct App {
    rt: Runtime,
    main: MainFn,
}

impl App {
    /// Create an app on an in-memory DOM with default configuration
    pub fn new<F, R>(main: F) -> Self
    where
        F: FnMut(&mut Context<'_>) -> R + 'static,
        R: ViewResult,
    {
        Self::with_config(Config::default(), main)
    }

    /// Create an app on an in-memory DOM
    pub fn with_config<F, R>(config: Config, main: F) -> Self
    where
        F: FnMut(&mut Context<'_>) -> R + 'static,
        R: ViewResult,
    {
        Self::with_backend(config, Box::new(MemoryDom::new()), main)
    }

    /// Create an app that owns a new root element on `dom`
    pub fn with_backend<F, R>(config: Config, dom: Box<dyn DomBackend>, main: F) -> Self
    where
        F: FnMut(&mut Context<'_>) -> R + 'static,
        R: ViewResult,
    {
        Self::build(Runtime::new(config, dom, None), main)
    }

    /// Create an app rendering into an existing `root` node of `dom`
    pub fn mount<F, R>(config: Config, dom: Box<dyn DomBackend>, root: NodeId, main: F) -> Self
    where
        F: FnMut(&mut Context<'_>) -> R + 'static,
        R: ViewResult,
    {
        Self::build(Runtime::new(config, dom, Some(root)), main)
    }

    fn build<F, R>(rt: Runtime, mut main: F) -> Self
    where
        F: FnMut(&mut Context<'_>) -> R + 'static,
        R: ViewResult,
    {
        Self {
            rt,
            main: Box::new(move |ctx: &mut Context<'_>| main(ctx).into_result()),
        }
    }

    /// Run one UPDATE pass
    pub fn update(&mut self) -> Result<PassStats> {
        self.run(Phase::Update { event: None })
    }

    fn run(&mut self, phase: Phase) -> Result<PassStats> {
        let kind = phase.kind();
        self.rt.begin_pass(kind);
        tracing::trace!(phase = ?kind, receiver = ?phase.receiver(), "pass started");

        let mut ctx = Context::new(&mut self.rt, phase);
        let result = (self.main)(&mut ctx);
        ctx.finish(result);

        if kind == PhaseKind::Update {
            self.rt.commit()?;
        }

        let stats = self.rt.pass;
        tracing::debug!(
            phase = ?stats.phase,
            created = stats.created,
            reused = stats.reused,
            inserted = stats.inserted,
            removed = stats.removed,
            evicted = stats.evicted,
            "pass finished"
        );
        Ok(stats)
    }

    /// Deliver a DOM event at `target`.
    ///
    /// The event bubbles from `target` through its ancestors. Every `Fire`
    /// listener on the way runs a RECV pass for its receiver and every
    /// callback listener is called, until propagation is stopped (including
    /// by `stop_immediate_propagation`). One UPDATE pass follows and its
    /// stats are returned.
    pub fn dispatch_event(&mut self, target: NodeId, event: Event) -> Result<PassStats> {
        let event = Rc::new(event);
        let kind = event.kind().to_owned();

        let mut node = Some(target);
        while let Some(current) = node {
            match self.rt.dom.listener(current, &kind) {
                Some(Listener::Fire { receiver }) => {
                    self.run(Phase::Recv {
                        receiver,
                        event: Rc::clone(&event),
                    })?;
                }
                Some(Listener::Callback(callback)) => callback(&*event),
                None => {}
            }
            if event.propagation_stopped() {
                break;
            }
            node = self.rt.dom.parent(current);
        }

        self.run(Phase::Update { event: Some(event) })
    }

    /// Route `event` straight to the component at `receiver`, then update
    pub fn fire(&mut self, receiver: &str, event: Event) -> Result<PassStats> {
        let event = Rc::new(event);
        self.run(Phase::Recv {
            receiver: receiver.into(),
            event: Rc::clone(&event),
        })?;
        self.run(Phase::Update { event: Some(event) })
    }

    /// Run an UPDATE pass if one was requested since the last one
    pub fn run_pending(&mut self) -> Result<Option<PassStats>> {
        if self.rt.dirty.swap(false, Ordering::AcqRel) {
            self.update().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn update_handle(&self) -> UpdateHandle {
        self.rt.update_handle()
    }

    /// Replace the render error hook; the default logs with `tracing::error!`
    pub fn on_error(&mut self, hook: impl FnMut(&RenderFailure) + 'static) {
        self.rt.error_hook = Some(Box::new(hook));
    }

    /// Register a component for [`Context::call`]
    pub fn register<C: Component>(&mut self, name: impl Into<String>) -> bool {
        self.rt.registry.register::<C>(name)
    }

    pub fn registry(&self) -> &Registry {
        &self.rt.registry
    }

    /// The live component instance at `ikey`
    pub fn component<C: Component>(&self, ikey: &str) -> Option<&C> {
        self.rt
            .table
            .component(ikey)?
            .instance
            .as_ref()?
            .as_any()
            .downcast_ref::<C>()
    }

    /// Whether an instance lives at `ikey`
    pub fn contains(&self, ikey: &str) -> bool {
        self.rt.table.contains(ikey)
    }

    pub fn stats(&self) -> RuntimeStats {
        self.rt.totals
    }

    /// Counters of the most recent pass
    pub fn last_pass(&self) -> PassStats {
        self.rt.pass
    }

    pub fn dom(&self) -> &dyn DomBackend {
        &*self.rt.dom
    }

    /// The backend as its concrete type
    pub fn backend<D: DomBackend + 'static>(&self) -> Option<&D> {
        self.rt.dom.as_any().downcast_ref::<D>()
    }

    /// Node of the root element
    pub fn root_node(&self) -> NodeId {
        self.rt.root_node
    }

    pub fn config(&self) -> &Config {
        &self.rt.config
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.rt.config)
            .field("stats", &self.rt.totals)
            .finish_non_exhaustive()
    }
}
