//! Counter Demo
//!
//! A counter with increment/reset buttons and a name field, driven headlessly
//! through the in-memory DOM. Every pass is printed as HTML.
//!
//! Run with: RUST_LOG=tessel_app=debug cargo run -p tessel_app --example counter

use tessel_app::prelude::*;

#[derive(Default)]
struct CounterView;

impl Component for CounterView {
    type Props = Binding<i64>;
    type Output = ();

    fn render(&mut self, ctx: &mut Context<'_>, count: Binding<i64>) -> RenderResult {
        let value = count.get();
        ctx.cls("count");
        if value < 0 {
            ctx.cls("negative");
        }
        ctx.element("output", value.to_string());

        if ctx.component::<Button>("+1".to_string()) {
            count.update(|n| *n += 1);
        }
        ctx.prop("disabled", value == 0);
        if ctx.component::<Button>("reset".to_string()) {
            count.set(0);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let count = Binding::new(0_i64);
    let name = Binding::new(String::new());

    let state = count.clone();
    let field = name.clone();
    let config = Config::development().alias("row", "div");
    let mut app = App::with_config(config, move |ctx: &mut Context<'_>| {
        ctx.cls("counter");
        ctx.element(
            "row",
            view(|ctx| {
                ctx.component::<CounterView>(state.clone());
            }),
        );
        ctx.prop("placeholder", "Your name");
        ctx.component::<TextInput>((&field).into());
        let greeting = field.with(|name| {
            if name.is_empty() {
                None
            } else {
                Some(format!("hello {name}"))
            }
        });
        ctx.element("p", greeting);
    });

    let stats = app.update()?;
    print_pass(&app, "initial", stats);

    for _ in 0..3 {
        let plus = buttons(&app)[0];
        let stats = app.dispatch_event(plus, Event::click())?;
        print_pass(&app, "click +1", stats);
    }

    let input = app
        .backend::<MemoryDom>()
        .map(|dom| dom.find_by_tag(app.root_node(), "input"))
        .unwrap_or_default();
    if let Some(&input) = input.first() {
        let stats = app.dispatch_event(input, Event::input("Ada"))?;
        print_pass(&app, "typed", stats);
    }

    let reset = buttons(&app)[1];
    let stats = app.dispatch_event(reset, Event::click())?;
    print_pass(&app, "reset", stats);

    tracing::info!(count = count.get(), name = %name.get(), stats = ?app.stats(), "done");
    Ok(())
}

fn buttons(app: &App) -> Vec<NodeId> {
    app.backend::<MemoryDom>()
        .map(|dom| dom.find_by_tag(app.root_node(), "button"))
        .unwrap_or_default()
}

fn print_pass(app: &App, label: &str, stats: PassStats) {
    if let Some(dom) = app.backend::<MemoryDom>() {
        println!("[{label}] {}", dom.inner_html(app.root_node()));
    }
    println!(
        "    created={} reused={} inserted={} removed={} evicted={}",
        stats.created, stats.reused, stats.inserted, stats.removed, stats.evicted
    );
}
