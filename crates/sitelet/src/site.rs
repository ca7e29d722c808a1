//! The pages of the demo site and the route table serving them.

use std::rc::Rc;
use std::sync::Arc;

use futures::executor::LocalPool;
use maud::{Markup, html};
use sitelet_client::reactive::Session;
use sitelet_client::{Remote, Reverser};
use tracing::debug;

use crate::remoting::{LoopbackTransport, RemoteRegistry};
use crate::sitelet::{Content, Context, RoutePattern, Sitelet, SiteletBuilder};
use crate::{Endpoint, MainTemplate, SiteError};

/// Name of the form field the Home widget submits.
pub const INPUT_FIELD: &str = "input";

/// Navbar items, with `current` marked active.
pub fn menu_bar(sitelet: &Sitelet, current: Option<Endpoint>) -> Markup {
    html! {
        @for target in Endpoint::ALL {
            li class=[(current == Some(target)).then_some("active")] {
                a href=(sitelet.link(target).unwrap_or("#")) { (target.title()) }
            }
        }
    }
}

/// Lay out `body` as the page for the endpoint being served.
pub fn page(ctx: &Context<'_>, body: Markup) -> Content {
    let title = ctx.endpoint().title();
    Content::Page {
        title: title.to_string(),
        html: MainTemplate::new()
            .title(title)
            .menu_bar(menu_bar(ctx.sitelet(), Some(ctx.endpoint())))
            .body(body)
            .render(),
    }
}

/// The 404 page; no menu item is active.
pub fn not_found_page(sitelet: &Sitelet) -> String {
    MainTemplate::new()
        .title("Not Found")
        .menu_bar(menu_bar(sitelet, None))
        .body(html! {
            h1 { "Not Found" }
            p { "There is no page at this address." }
        })
        .render()
}

/// The reverser widget after `submitted` went through it.
///
/// The remote call runs over the loopback transport, so the local executor
/// settles it without touching the network. Without a submission, or with
/// blank input, the widget renders idle.
fn reverser_markup(registry: &Arc<RemoteRegistry>, submitted: Option<&str>) -> Markup {
    let session = Session::new();
    let mut pool = LocalPool::new();
    let remote = Rc::new(Remote::new(LoopbackTransport::new(Arc::clone(registry))));
    let widget = Reverser::new(&session, remote, pool.spawner());

    if let Some(input) = submitted {
        widget.input().set(input.to_string());
        widget.send();
        pool.run_until_stalled();
        debug!("reverser settled: {:?}", widget.reversed().get());
    }

    let markup = widget.render();
    session.dispose();
    markup
}

fn home(ctx: &Context<'_>, registry: &Arc<RemoteRegistry>) -> Content {
    let body = html! {
        h1 { "Say Hi to the server!" }
        div { (reverser_markup(registry, ctx.param(INPUT_FIELD))) }
    };
    page(ctx, body)
}

fn about(ctx: &Context<'_>) -> Content {
    page(
        ctx,
        html! {
            h1 { "About" }
            p { "This is a template sitelet client-server application." }
        },
    )
}

/// Route table of the site: `/` (any method) is Home, `GET /about` is About.
///
/// Home accepts any method so the widget's form can post back to it.
pub fn build_site(registry: Arc<RemoteRegistry>) -> Result<Sitelet, SiteError> {
    SiteletBuilder::new()
        .with(
            Endpoint::Home,
            RoutePattern::parse("/")?,
            move |ctx: &Context<'_>| home(ctx, &registry),
        )
        .with(Endpoint::About, RoutePattern::parse("GET /about")?, about)
        .install()
}
