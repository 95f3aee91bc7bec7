//! Reference components
//!
//! Small components built only on the public call protocol. They are
//! registered by name in every [`Registry::with_builtins`](crate::Registry::with_builtins).

use tessel_core::Value;
use tessel_dom::{PayloadKind, PropValue};

use crate::component::{Capability, Component};
use crate::context::Context;
use crate::error::RenderResult;

/// A `<button>` that reports clicks.
///
/// Returns `true` in the pass that receives its click. A staged `disabled`
/// property is kept until it is staged again.
#[derive(Debug, Default)]
pub struct Button {
    pub disabled: bool,
    clicks: u64,
}

impl Button {
    /// Clicks received while enabled
    pub fn clicks(&self) -> u64 {
        self.clicks
    }
}

impl Component for Button {
    type Props = String;
    type Output = bool;

    const CAPABILITY: Capability = Capability::Trigger {
        payload: PayloadKind::None,
    };

    fn render(&mut self, ctx: &mut Context<'_>, label: String) -> RenderResult<bool> {
        let fired = ctx.is_receiver() && !self.disabled;
        if fired {
            self.clicks += 1;
        }

        let onclick = ctx.fire_listener()?;
        ctx.prop("onclick", onclick);
        ctx.prop("disabled", self.disabled);
        ctx.element("button", label);
        Ok(fired)
    }

    fn assign(&mut self, key: &str, value: &PropValue) -> bool {
        match key {
            "disabled" => {
                self.disabled = value.as_bool().unwrap_or(false);
                true
            }
            _ => false,
        }
    }
}

/// An `<input>` that writes typed text into a bound value.
///
/// Returns `true` in the pass that wrote a new value.
#[derive(Debug, Default)]
pub struct TextInput {
    pub placeholder: Option<String>,
}

impl Component for TextInput {
    type Props = Value<String>;
    type Output = bool;

    const CAPABILITY: Capability = Capability::Status;

    fn render(&mut self, ctx: &mut Context<'_>, value: Value<String>) -> RenderResult<bool> {
        let mut changed = false;
        if ctx.is_receiver() {
            let typed = ctx
                .event()
                .and_then(|event| event.payload().as_text())
                .map(str::to_owned);
            if let Some(text) = typed {
                match value.set(text) {
                    Ok(()) => changed = true,
                    Err(err) => {
                        if ctx.diagnostics() {
                            tracing::warn!(scope = %ctx.current_ikey(), error = %err, "input value is not bound");
                        }
                    }
                }
            }
        }

        let oninput = ctx.fire_listener()?;
        ctx.prop("oninput", oninput);
        ctx.prop("value", value.get());
        if let Some(placeholder) = &self.placeholder {
            ctx.prop("placeholder", placeholder.as_str());
        }
        ctx.element("input", ());
        Ok(changed)
    }

    fn assign(&mut self, key: &str, value: &PropValue) -> bool {
        match key {
            "placeholder" => {
                self.placeholder = value.as_text().map(str::to_owned);
                true
            }
            _ => false,
        }
    }
}

/// Arguments of [`ToggleButton`]
#[derive(Debug, Default)]
pub struct ToggleButtonProps {
    pub checked: Value<bool>,
    pub label: String,
}

/// A [`Button`] that flips a bound flag and carries a `checked` class while set
#[derive(Debug, Default)]
pub struct ToggleButton;

impl Component for ToggleButton {
    type Props = ToggleButtonProps;
    type Output = bool;

    const CAPABILITY: Capability = Capability::Status;

    fn render(&mut self, ctx: &mut Context<'_>, props: ToggleButtonProps) -> RenderResult<bool> {
        let checked = props.checked.get();
        if checked {
            ctx.cls("checked");
        }
        if !ctx.component::<Button>(props.label) {
            return Ok(false);
        }
        props.checked.set(!checked)?;
        Ok(true)
    }
}
