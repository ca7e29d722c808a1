#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::unwrap_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/*!
A small client-server site: a route table of pages, a typed page template,
and a remoting endpoint the client-side widget calls.

Requests are answered by the axum [`router`]:

- `POST /rpc` carries a codec-framed [`NetworkPacket`](sitelet_common::NetworkPacket)
  and is dispatched through the [`RemoteRegistry`]
- everything else is resolved by the [`Sitelet`]: `/` is the home page,
  `GET /about` the about page, anything else gets a 404 page. `HEAD` is
  served by the `GET` route of the same path.

Submitting the home page's form posts the `input` field back to `/`, which
renders the widget with the reversed string.

## Example

```rust,no_run
use sitelet::{ServerSettings, serve};

#[tokio::main]
async fn main() -> Result<(), sitelet::SiteError> {
    serve(ServerSettings::default()).await
}
```

## Routes

```rust
use axum::http::Method;
use sitelet::{Content, Context, Endpoint, RoutePattern, SiteletBuilder};

let about = |ctx: &Context<'_>| Content::Page {
    title: ctx.endpoint().title().to_string(),
    html: String::from("<h1>About</h1>"),
};
let site = SiteletBuilder::new()
    .with(Endpoint::About, RoutePattern::parse("GET /about")?, about)
    .install()?;

assert!(matches!(site.respond(&Method::GET, "/about"), Content::Page { .. }));
assert_eq!(site.respond(&Method::GET, "/missing"), Content::NotFound);
# Ok::<(), sitelet::SiteError>(())
```
*/

mod endpoint;
mod error;
pub mod http;
pub mod remoting;
mod settings;
pub mod site;
pub mod sitelet;
mod template;

pub use endpoint::Endpoint;
pub use error::SiteError;
pub use http::{AppState, router, serve};
pub use remoting::{DispatchError, LoopbackTransport, RemoteRegistry};
pub use settings::{ADDR_VAR, ServerSettings};
pub use sitelet::{Content, Context, Params, Route, RoutePattern, Sitelet, SiteletBuilder};
pub use template::MainTemplate;
