//! Context - the dispatch surface of a pass
//!
//! Every render procedure receives the [`Context`] of the running pass. Each
//! call on it contributes a local key (its call site, via `#[track_caller]`,
//! or an explicit key in the `*_keyed` variants) and is dispatched as one of
//! three shapes:
//!
//! - **element** ([`element`](Context::element), [`svg`](Context::svg)):
//!   create or reuse a wrapper, apply staged classes/style/properties, render
//!   the inner content with the element as DOM parent
//! - **text** ([`text`](Context::text)): create or reuse a text node
//! - **component** ([`component`](Context::component), [`call`](Context::call)):
//!   create or reuse the instance, forward staged state, run its render
//!
//! Setters ([`cls`](Context::cls), [`css`](Context::css), [`prop`](Context::prop),
//! [`set_ref`](Context::set_ref), [`main`](Context::main),
//! [`no_preserve`](Context::no_preserve)) stage state for the next call and
//! return `true` so they compose with `&&`.
//!
//! In a RECV pass no wrapper is created or patched; elements only walk their
//! content so components can see the event.

use std::any::{type_name, Any, TypeId};
use std::fmt::Display;
use std::rc::Rc;

use tessel_core::{Ckey, Ikey};
use tessel_dom::{
    DomNode, ElementNode, Event, Listener, Namespace, NodeId, PropValue, TextNode,
};

use crate::component::{construct, AnyComponent, Component, Owners, RenderOutcome};
use crate::config::Config;
use crate::content::Content;
use crate::error::{AppError, RenderFailure, RenderResult, Result};
use crate::handle::{Handle, NodeRef};
use crate::runtime::{Instance, Phase, PhaseKind, Runtime, UpdateHandle};
use crate::staging::{NoPreserve, Staged, Staging};

/// The per-pass dispatch surface
pub struct Context<'a> {
    rt: &'a mut Runtime,
    phase: Phase,
    staging: Staging,
    /// Wrapper receiving element and text children
    dom_parent: Ikey,
    /// Component whose render is running
    component: Option<Ikey>,
    /// Components waiting for their first element
    owners: Owners,
    /// Inside a deep `no_preserve` call: every instance is recreated
    no_preserve_deep: bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(rt: &'a mut Runtime, phase: Phase) -> Self {
        let dom_parent = rt.root.clone();
        Self {
            rt,
            phase,
            staging: Staging::default(),
            dom_parent,
            component: None,
            owners: Owners::new(),
            no_preserve_deep: false,
        }
    }

    /// Report a failure of the root render and drop leftover staging
    pub(crate) fn finish(mut self, result: RenderResult<()>) {
        if let Err(error) = result {
            let ikey = self.rt.root.clone();
            self.rt.report(RenderFailure { ikey, error });
        }
        self.flush_unconsumed();
    }

    // Phase and event access

    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn is_update(&self) -> bool {
        self.phase.is_update()
    }

    pub fn is_recv(&self) -> bool {
        self.phase.is_recv()
    }

    /// The event that caused this pass, if any
    pub fn event(&self) -> Option<&Event> {
        self.phase.event()
    }

    /// Whether the running component is the target of the RECV pass
    pub fn is_receiver(&self) -> bool {
        match (self.phase.receiver(), &self.component) {
            (Some(receiver), Some(current)) => receiver == current,
            _ => false,
        }
    }

    pub fn prevent_default(&self) -> Result<()> {
        let event = self.event().ok_or(AppError::NoEvent)?;
        if event.prevent_default() {
            Ok(())
        } else {
            Err(AppError::NotCancelable(event.kind().to_owned()))
        }
    }

    pub fn stop_propagation(&self) -> Result<()> {
        self.event().ok_or(AppError::NoEvent)?.stop_propagation();
        Ok(())
    }

    /// Stop propagation and skip the listeners not yet run for this event
    pub fn stop_immediate_propagation(&self) -> Result<()> {
        self.event()
            .ok_or(AppError::NoEvent)?
            .stop_immediate_propagation();
        Ok(())
    }

    /// A listener that routes events to the running component.
    ///
    /// Only trigger and status components may create one.
    pub fn fire_listener(&self) -> Result<PropValue> {
        let receiver = self.component.as_ref().ok_or(AppError::NotInteractive)?;
        let interactive = self
            .rt
            .table
            .component(receiver)
            .is_some_and(|slot| slot.capability.is_interactive());
        if !interactive {
            return Err(AppError::NotInteractive);
        }
        Ok(PropValue::Listener(Listener::Fire {
            receiver: receiver.clone(),
        }))
    }

    /// Identity of the innermost open scope
    pub fn current_ikey(&self) -> &str {
        self.rt.keys.current()
    }

    pub fn config(&self) -> &Config {
        &self.rt.config
    }

    pub fn diagnostics(&self) -> bool {
        self.rt.config.diagnostics
    }

    // Staging setters

    /// Fill `target` with the instance of the next call
    pub fn set_ref(&mut self, target: &NodeRef) -> bool {
        self.staging.push_ref(target);
        true
    }

    /// Fill every target with the instance of the next call
    pub fn refs<'r>(&mut self, targets: impl IntoIterator<Item = &'r NodeRef>) -> bool {
        for target in targets {
            self.staging.push_ref(target);
        }
        true
    }

    /// Stage whitespace-separated classes
    pub fn cls(&mut self, classes: &str) -> bool {
        self.staging.push_classes(classes);
        true
    }

    /// Stage inline style declarations
    pub fn css(&mut self, style: &str) -> bool {
        self.staging.push_style(style);
        true
    }

    /// Stage one property; `PropValue::Undefined` deletes it
    pub fn prop(&mut self, name: &str, value: impl Into<PropValue>) -> bool {
        self.staging.set_prop(name, value.into());
        true
    }

    pub fn props<K, V>(&mut self, props: impl IntoIterator<Item = (K, V)>) -> bool
    where
        K: AsRef<str>,
        V: Into<PropValue>,
    {
        for (name, value) in props {
            self.staging.set_prop(name.as_ref(), value.into());
        }
        true
    }

    /// Make the next call the explicit primary element of the running component
    pub fn main(&mut self) -> bool {
        self.staging.set_main();
        true
    }

    /// Recreate the instance of the next call on every UPDATE pass.
    ///
    /// With `deep`, everything rendered inside the call is recreated too.
    /// RECV passes still reach the instance created by the last UPDATE.
    pub fn no_preserve(&mut self, deep: bool) -> bool {
        self.staging.set_no_preserve(if deep {
            NoPreserve::Deep
        } else {
            NoPreserve::Shallow
        });
        true
    }

    /// Whether a call gets a fresh instance this pass, and whether its content does
    fn preservation(&self, staged: Option<NoPreserve>) -> (bool, bool) {
        let deep = self.no_preserve_deep || staged == Some(NoPreserve::Deep);
        let fresh = self.phase.is_update() && (deep || staged.is_some());
        (fresh, deep)
    }

    /// Render content with `deep` in effect for its calls
    fn render_content_with(&mut self, deep: bool, content: impl Content) {
        let outer = std::mem::replace(&mut self.no_preserve_deep, deep);
        self.render_content(content);
        self.no_preserve_deep = outer;
    }

    // Elements and text

    /// An HTML element; `tag` may be an alias from [`Config::element_aliases`]
    #[track_caller]
    pub fn element(&mut self, tag: &str, content: impl Content) -> Option<Handle> {
        self.element_keyed(Ckey::here(), tag, content)
    }

    pub fn element_keyed(&mut self, ckey: Ckey<'_>, tag: &str, content: impl Content) -> Option<Handle> {
        let alias = self.rt.config.alias_for(tag).map(str::to_owned);
        let tag = alias.as_deref().unwrap_or(tag);
        self.dispatch_element(ckey, tag, Namespace::Html, content)
    }

    /// An SVG element; properties become attributes
    #[track_caller]
    pub fn svg(&mut self, tag: &str, content: impl Content) -> Option<Handle> {
        self.svg_keyed(Ckey::here(), tag, content)
    }

    pub fn svg_keyed(&mut self, ckey: Ckey<'_>, tag: &str, content: impl Content) -> Option<Handle> {
        self.dispatch_element(ckey, tag, Namespace::Svg, content)
    }

    /// A text node
    #[track_caller]
    pub fn text(&mut self, text: impl Display) -> Option<Handle> {
        self.text_keyed(Ckey::here(), &text.to_string())
    }

    pub fn text_keyed(&mut self, ckey: Ckey<'_>, text: &str) -> Option<Handle> {
        let staged = self.staging.take();
        if self.diagnostics() {
            if staged.has_presentation() {
                tracing::warn!(scope = %self.rt.keys.current(), "text node cannot have classes or style");
            }
            if !staged.props.is_empty() {
                tracing::warn!(scope = %self.rt.keys.current(), "text node cannot have properties");
            }
            if staged.main {
                tracing::warn!(scope = %self.rt.keys.current(), "text node cannot be a primary element");
            }
        }
        if self.phase.is_recv() {
            return None;
        }
        let (fresh, _) = self.preservation(staged.no_preserve);

        let mut failure = None;
        let (ikey, node, created, stale) = {
            let rt = &mut *self.rt;
            let key = rt.keys.push(ckey);
            let reusable = !fresh
                && matches!(rt.table.resolve(key), Some(Instance::Node(DomNode::Text(_))));
            let stale = if reusable { None } else { rt.table.remove(key) };
            let visit = rt.table.visit_or_insert_with(key, || {
                Instance::Node(DomNode::Text(TextNode::new(&mut *rt.dom, text)))
            });
            let node = match visit.value {
                Instance::Node(DomNode::Text(wrapper)) => {
                    if let Err(err) = wrapper.set_text(&mut *rt.dom, text) {
                        failure = Some(err);
                    }
                    wrapper.node()
                }
                _ => unreachable!("text slot replaced above"),
            };
            (visit.ikey, node, visit.created, stale)
        };
        self.after_visit(created, stale, failure);

        let handle = Handle::Text {
            ikey: ikey.clone(),
            node,
        };
        staged.fulfill_refs(&handle);
        self.attach(&ikey);
        self.rt.keys.pop();
        Some(handle)
    }

    fn dispatch_element(
        &mut self,
        ckey: Ckey<'_>,
        tag: &str,
        ns: Namespace,
        content: impl Content,
    ) -> Option<Handle> {
        let staged = self.staging.take();
        let (fresh, deep) = self.preservation(staged.no_preserve);
        if self.phase.is_recv() {
            self.rt.keys.push(ckey);
            self.render_content_with(deep, content);
            self.rt.keys.pop();
            return None;
        }

        let Staged {
            refs,
            classes,
            style,
            props,
            main,
            ..
        } = staged;

        let mut failure = None;
        let (ikey, node, created, stale) = {
            let rt = &mut *self.rt;
            let key = rt.keys.push(ckey);
            let reusable = !fresh
                && matches!(
                    rt.table.resolve(key),
                    Some(Instance::Node(DomNode::Element(el))) if el.matches(tag, ns)
                );
            let stale = if reusable { None } else { rt.table.remove(key) };
            let visit = rt.table.visit_or_insert_with(key, || {
                Instance::Node(DomNode::Element(ElementNode::new(&mut *rt.dom, tag, ns)))
            });
            let node = match visit.value {
                Instance::Node(DomNode::Element(el)) => {
                    el.begin_pass();
                    if let Err(err) = el.apply_props(&mut *rt.dom, props) {
                        failure = Some(err);
                    }
                    el.node()
                }
                _ => unreachable!("element slot replaced above"),
            };
            (visit.ikey, node, visit.created, stale)
        };
        self.after_visit(created, stale, failure);

        let handle = Handle::Element {
            ikey: ikey.clone(),
            node,
        };
        for target in &refs {
            target.set(handle.clone());
        }
        self.fulfill_primary(&ikey, main);
        self.attach(&ikey);

        let parent = std::mem::replace(&mut self.dom_parent, ikey.clone());
        self.render_content_with(deep, content);
        self.dom_parent = parent;

        if let Some(el) = self.rt.table.element_mut(&ikey) {
            el.add_classes(classes);
            el.add_style(&style);
        }
        self.rt.keys.pop();
        Some(handle)
    }

    /// Count the visit and clean up what it replaced
    fn after_visit(
        &mut self,
        created: bool,
        stale: Option<Instance>,
        failure: Option<tessel_dom::DomError>,
    ) {
        self.rt.pass.count(created);
        if let Some(stale) = stale {
            self.rt.release(stale);
        }
        if let Some(err) = failure {
            self.rt.record_dom_failure(err);
        }
    }

    /// Append a visited wrapper to the current DOM parent
    fn attach(&mut self, ikey: &Ikey) {
        match self.rt.table.container_mut(&self.dom_parent) {
            Some(parent) => parent.push_child(ikey.clone()),
            None => tracing::warn!(parent = %self.dom_parent, child = %ikey, "DOM parent missing"),
        }
    }

    /// Render content at a dispatch boundary
    fn render_content(&mut self, content: impl Content) {
        if let Err(error) = content.render(self) {
            let ikey = Ikey::from(self.rt.keys.current());
            self.rt.report(RenderFailure { ikey, error });
        }
        self.flush_unconsumed();
    }

    fn flush_unconsumed(&mut self) {
        let diagnostics = self.rt.config.diagnostics;
        self.staging
            .clear_unconsumed(diagnostics, self.rt.keys.current());
    }

    // Primary element forwarding

    /// Offer a freshly visited element to every waiting owner
    fn fulfill_primary(&mut self, element: &Ikey, main: bool) {
        for owner in std::mem::take(&mut self.owners) {
            if let Some(slot) = self.rt.table.component_mut(&owner) {
                slot.offer_primary(element);
            }
        }
        if main {
            self.designate(element.clone());
        }
    }

    /// Make `element` the explicit primary of the running component
    fn designate(&mut self, element: Ikey) {
        let Some(current) = &self.component else {
            if self.diagnostics() {
                tracing::warn!(element = %element, "main() used outside a component");
            }
            return;
        };
        if let Some(slot) = self.rt.table.component_mut(current) {
            slot.designate(element);
        }
    }

    /// Merge what a component's render settled on into the caller's state
    fn merge_outcome(&mut self, ikey: &Ikey, outcome: RenderOutcome, staged: Staged) {
        let Some(primary) = outcome.primary_element else {
            // Owners queued before the call keep waiting
            self.owners = outcome.pending_owners;
            if self.diagnostics() && (staged.has_presentation() || staged.main) {
                tracing::warn!(
                    component = %ikey,
                    "classes, style or main() staged on a component without a primary element"
                );
            }
            return;
        };

        for owner in &outcome.pending_owners {
            if let Some(slot) = self.rt.table.component_mut(owner) {
                slot.offer_primary_once(&primary);
            }
        }
        self.owners.clear();

        if let Some(el) = self.rt.table.element_mut(&primary) {
            el.add_classes(staged.classes);
            el.add_style(&staged.style);
        }
        if staged.main {
            self.designate(primary);
        }
    }

    // Components

    /// Call a component
    #[track_caller]
    pub fn component<C: Component>(&mut self, props: C::Props) -> C::Output {
        self.component_keyed::<C>(Ckey::here(), props)
    }

    pub fn component_keyed<C: Component>(&mut self, ckey: Ckey<'_>, props: C::Props) -> C::Output {
        let mut output = None;
        self.dispatch_component(ckey, TypeId::of::<C>(), construct::<C>, |instance, ctx| {
            let component = instance
                .as_any_mut()
                .downcast_mut::<C>()
                .ok_or_else(|| anyhow::anyhow!("instance is not a {}", type_name::<C>()))?;
            output = Some(component.render(ctx, props)?);
            Ok(())
        });
        output.unwrap_or_default()
    }

    /// Call a registered component by name
    #[track_caller]
    pub fn call(&mut self, name: &str, props: Box<dyn Any>) -> Result<Box<dyn Any>> {
        self.call_keyed(Ckey::here(), name, props)
    }

    pub fn call_keyed(&mut self, ckey: Ckey<'_>, name: &str, props: Box<dyn Any>) -> Result<Box<dyn Any>> {
        let entry = self
            .rt
            .registry
            .get(name)
            .ok_or_else(|| AppError::UnknownComponent(name.to_owned()))?;
        if (*props).type_id() != entry.props {
            return Err(AppError::PropsMismatch {
                name: name.to_owned(),
                expected: entry.props_name,
            });
        }

        let mut output = None;
        self.dispatch_component(ckey, entry.type_id, entry.construct, |instance, ctx| {
            output = Some(instance.render_dyn(ctx, props)?);
            Ok(())
        });
        Ok(output.unwrap_or_else(entry.default_output))
    }

    /// Call a registered component by name and read its output as `O`
    #[track_caller]
    pub fn call_as<O: 'static>(&mut self, name: &str, props: Box<dyn Any>) -> Result<O> {
        let output = self.call_keyed(Ckey::here(), name, props)?;
        output
            .downcast::<O>()
            .map(|output| *output)
            .map_err(|_| AppError::OutputMismatch {
                name: name.to_owned(),
                requested: type_name::<O>(),
            })
    }

    fn dispatch_component(
        &mut self,
        ckey: Ckey<'_>,
        type_id: TypeId,
        construct: fn() -> Box<dyn AnyComponent>,
        render: impl FnOnce(&mut dyn AnyComponent, &mut Context<'_>) -> RenderResult<()>,
    ) {
        let staged = self.staging.take();
        let update = self.phase.is_update();
        let (fresh, deep) = self.preservation(staged.no_preserve);

        let (ikey, created, stale) = {
            let rt = &mut *self.rt;
            let key = rt.keys.push(ckey);
            let reusable = !fresh
                && matches!(
                    rt.table.resolve(key),
                    Some(Instance::Component(slot)) if slot.type_id == type_id
                );
            let stale = if reusable { None } else { rt.table.remove(key) };
            let visit = rt.table.visit_or_insert_with(key, || {
                Instance::Component(crate::component::ComponentSlot::new(construct(), type_id))
            });
            (visit.ikey, visit.created, stale)
        };
        self.after_visit(created, stale, None);
        staged.fulfill_refs(&Handle::Component { ikey: ikey.clone() });

        let instance = self.rt.table.component_mut(&ikey).and_then(|slot| {
            if update {
                slot.begin_render();
            }
            slot.instance.take()
        });
        let Some(mut instance) = instance else {
            let error = AppError::Reentrant(ikey.to_string()).into();
            self.rt.report(RenderFailure { ikey, error });
            self.rt.keys.pop();
            return;
        };

        if self.diagnostics() {
            for (name, value) in &staged.props {
                if !instance.assign_prop(name, value) {
                    tracing::warn!(
                        component = instance.type_name(),
                        prop = %name,
                        "component does not accept staged property"
                    );
                }
            }
        } else {
            for (name, value) in &staged.props {
                instance.assign_prop(name, value);
            }
        }

        let pending_owners = std::mem::take(&mut self.owners);
        if update {
            self.owners.push(ikey.clone());
        }
        let outer = self.component.replace(ikey.clone());
        let outer_deep = std::mem::replace(&mut self.no_preserve_deep, deep);
        let result = render(&mut *instance, self);
        self.no_preserve_deep = outer_deep;
        self.component = outer;

        let primary_element = match self.rt.table.component_mut(&ikey) {
            Some(slot) => {
                slot.instance = Some(instance);
                slot.primary.clone()
            }
            None => None,
        };
        if let Err(error) = result {
            self.rt.report(RenderFailure {
                ikey: ikey.clone(),
                error,
            });
        }
        self.flush_unconsumed();

        if update {
            let outcome = RenderOutcome {
                primary_element,
                pending_owners,
            };
            self.merge_outcome(&ikey, outcome, staged);
        } else {
            self.owners = pending_owners;
        }
        self.rt.keys.pop();
    }

    // Portals

    /// Render content at the end of the root element
    #[track_caller]
    pub fn portal(&mut self, content: impl Content) -> Result<Option<Handle>> {
        self.portal_keyed(Ckey::here(), content)
    }

    pub fn portal_keyed(&mut self, ckey: Ckey<'_>, content: impl Content) -> Result<Option<Handle>> {
        let staged = self.staging.take();
        if staged.has_presentation() {
            return Err(AppError::PortalStyling("classes or style"));
        }
        if staged.props.values().any(|value| value.as_listener().is_some()) {
            return Err(AppError::PortalStyling("event listeners"));
        }
        if staged.main {
            return Err(AppError::PortalStyling("a primary designation"));
        }
        if !staged.props.is_empty() && self.diagnostics() {
            tracing::warn!(scope = %self.rt.keys.current(), "properties staged on a portal are ignored");
        }
        // The portal itself is kept; only its content can be recreated
        let (_, deep) = self.preservation(staged.no_preserve);

        if self.phase.is_recv() {
            self.rt.keys.push(ckey);
            self.render_content_with(deep, content);
            self.rt.keys.pop();
            return Ok(None);
        }

        let (ikey, created, stale) = {
            let rt = &mut *self.rt;
            let root_node = rt.root_node;
            let key = rt.keys.push(ckey);
            let reusable = matches!(rt.table.resolve(key), Some(Instance::Node(DomNode::Portal(_))));
            let stale = if reusable { None } else { rt.table.remove(key) };
            let visit = rt.table.visit_or_insert_with(key, || {
                Instance::Node(DomNode::Portal(ElementNode::wrap(
                    root_node,
                    "portal",
                    Namespace::Html,
                )))
            });
            if let Instance::Node(DomNode::Portal(portal)) = visit.value {
                portal.begin_pass();
            }
            rt.pending_portals.push(visit.ikey.clone());
            (visit.ikey, visit.created, stale)
        };
        self.after_visit(created, stale, None);

        let handle = Handle::Portal { ikey: ikey.clone() };
        staged.fulfill_refs(&handle);

        // Portal content never becomes a primary element
        let parent = std::mem::replace(&mut self.dom_parent, ikey);
        let owners = std::mem::take(&mut self.owners);
        self.render_content_with(deep, content);
        self.owners = owners;
        self.dom_parent = parent;

        self.rt.keys.pop();
        Ok(Some(handle))
    }

    // Scopes and loops

    /// Run `body` in a scope keyed `key`
    pub fn keyed<R>(&mut self, key: &str, body: impl FnOnce(&mut Context<'_>) -> R) -> R {
        self.rt.keys.push(Ckey::Named(key));
        let result = body(self);
        self.rt.keys.pop();
        result
    }

    /// Run `body` once per item, each in a scope keyed by `key_fn`
    #[track_caller]
    pub fn for_each<T, K, I>(
        &mut self,
        items: I,
        key_fn: impl Fn(&T) -> K,
        mut body: impl FnMut(&mut Context<'_>, T),
    ) where
        I: IntoIterator<Item = T>,
        K: Display,
    {
        self.rt.keys.push(Ckey::here());
        for item in items {
            let key = key_fn(&item).to_string();
            self.rt.keys.push(Ckey::Named(&key));
            body(self, item);
            self.rt.keys.pop();
        }
        self.rt.keys.pop();
    }

    /// Run `body` for `0..count`, each index in its own scope
    #[track_caller]
    pub fn for_range(&mut self, count: usize, mut body: impl FnMut(&mut Context<'_>, usize)) {
        self.rt.keys.push(Ckey::here());
        for index in 0..count {
            self.rt.keys.push(Ckey::Index(index));
            body(self, index);
            self.rt.keys.pop();
        }
        self.rt.keys.pop();
    }

    // Provide / inject

    /// Share `value` with every later call of this pass; returns the value it replaced
    pub fn provide<T: 'static>(&mut self, value: T) -> Option<Rc<dyn Any>> {
        self.rt.providers.insert(TypeId::of::<T>(), Rc::new(value))
    }

    pub fn unprovide<T: 'static>(&mut self) -> Option<Rc<T>> {
        self.rt
            .providers
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
    }

    pub fn inject<T: 'static>(&self) -> Option<Rc<T>> {
        self.rt
            .providers
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    pub fn force_inject<T: 'static>(&self) -> Result<Rc<T>> {
        self.inject::<T>()
            .ok_or(AppError::NotProvided(type_name::<T>()))
    }

    // Root element and deferred updates

    /// Add classes to the root element for this pass
    pub fn root_classes(&mut self, classes: &str) -> bool {
        if self.is_update() {
            let root = self.rt.root.clone();
            if let Some(el) = self.rt.table.element_mut(&root) {
                el.add_classes(classes.split_whitespace());
            }
        }
        true
    }

    /// Add inline style to the root element for this pass
    pub fn root_style(&mut self, style: &str) -> bool {
        if self.is_update() {
            let root = self.rt.root.clone();
            let mut css = style.trim().to_owned();
            if !css.is_empty() && !css.ends_with(';') {
                css.push(';');
            }
            if let Some(el) = self.rt.table.element_mut(&root) {
                el.add_style(&css);
            }
        }
        true
    }

    /// Schedule an UPDATE pass to run from [`App::run_pending`](crate::App::run_pending)
    pub fn request_update(&self) {
        self.rt.update_handle().request();
    }

    pub fn update_handle(&self) -> UpdateHandle {
        self.rt.update_handle()
    }

    /// Node of the root element
    pub fn root_node(&self) -> NodeId {
        self.rt.root_node
    }
}
