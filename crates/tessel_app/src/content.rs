//! Inner content of elements and portals
//!
//! Content is either text, rendered as a single text node keyed `_t`, or a
//! view: a closure that issues further calls with the element as their DOM
//! parent.

use tessel_core::Ckey;

use crate::context::Context;
use crate::error::RenderResult;

/// Reserved local key of the text node created for text content
pub const TEXT_KEY: &str = "t";

/// Something that can fill an element
pub trait Content {
    fn render(self, ctx: &mut Context<'_>) -> RenderResult<()>;
}

/// What a view closure may return
pub trait ViewResult {
    fn into_result(self) -> RenderResult<()>;
}

impl ViewResult for () {
    fn into_result(self) -> RenderResult<()> {
        Ok(())
    }
}

impl<E: Into<anyhow::Error>> ViewResult for Result<(), E> {
    fn into_result(self) -> RenderResult<()> {
        self.map_err(Into::into)
    }
}

/// Closure content; build with [`view`]
pub struct View<F>(F);

/// Wrap a closure as element content
///
/// ```rust
/// use tessel_app::prelude::*;
///
/// let mut app = App::new(|ctx: &mut Context<'_>| {
///     ctx.element("ul", view(|ctx| {
///         ctx.element("li", "one");
///         ctx.element("li", "two");
///     }));
/// });
/// app.update().unwrap();
/// ```
pub fn view<F, R>(f: F) -> View<F>
where
    F: FnOnce(&mut Context<'_>) -> R,
    R: ViewResult,
{
    View(f)
}

impl<F, R> Content for View<F>
where
    F: FnOnce(&mut Context<'_>) -> R,
    R: ViewResult,
{
    fn render(self, ctx: &mut Context<'_>) -> RenderResult<()> {
        (self.0)(ctx).into_result()
    }
}

impl Content for () {
    fn render(self, _ctx: &mut Context<'_>) -> RenderResult<()> {
        Ok(())
    }
}

impl<C: Content> Content for Option<C> {
    fn render(self, ctx: &mut Context<'_>) -> RenderResult<()> {
        match self {
            Some(content) => content.render(ctx),
            None => Ok(()),
        }
    }
}

impl Content for &str {
    fn render(self, ctx: &mut Context<'_>) -> RenderResult<()> {
        ctx.text_keyed(Ckey::Reserved(TEXT_KEY), self);
        Ok(())
    }
}

impl Content for String {
    fn render(self, ctx: &mut Context<'_>) -> RenderResult<()> {
        self.as_str().render(ctx)
    }
}

impl Content for &String {
    fn render(self, ctx: &mut Context<'_>) -> RenderResult<()> {
        self.as_str().render(ctx)
    }
}

macro_rules! number_content {
    ($($ty:ty),*) => {
        $(
            impl Content for $ty {
                fn render(self, ctx: &mut Context<'_>) -> RenderResult<()> {
                    self.to_string().as_str().render(ctx)
                }
            }
        )*
    };
}

number_content!(i32, i64, u32, u64, usize, f32, f64);
