use axum::http::Method;
use sitelet::{Content, Context, Endpoint, RoutePattern, SiteError, SiteletBuilder};

fn blank(_: &Context<'_>) -> Content {
    Content::Page {
        title: String::new(),
        html: String::new(),
    }
}

#[test]
fn duplicate_route_is_rejected_at_install() {
    let result = SiteletBuilder::new()
        .with(Endpoint::Home, RoutePattern::parse("/").unwrap(), blank)
        .with(Endpoint::About, RoutePattern::parse("GET /").unwrap(), blank)
        .install();

    match result {
        Err(SiteError::DuplicateRoute {
            endpoint, existing, ..
        }) => {
            assert_eq!(endpoint, Endpoint::About);
            assert_eq!(existing, Endpoint::Home);
        }
        other => panic!("expected a duplicate route error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn same_path_with_distinct_methods_is_allowed() {
    let site = SiteletBuilder::new()
        .with(Endpoint::About, RoutePattern::parse("GET /about").unwrap(), blank)
        .with(Endpoint::Home, RoutePattern::parse("POST /about").unwrap(), blank)
        .install()
        .unwrap();

    let endpoint = |method| site.resolve(&method, "/about").map(|route| route.endpoint());
    assert_eq!(endpoint(Method::GET), Some(Endpoint::About));
    assert_eq!(endpoint(Method::POST), Some(Endpoint::Home));
    assert_eq!(endpoint(Method::PUT), None);
}

#[test]
fn handlers_see_their_endpoint_and_links() {
    let site = SiteletBuilder::new()
        .with(Endpoint::Home, RoutePattern::any("/"), |ctx: &Context<'_>| {
            Content::Page {
                title: format!("{:?}", ctx.endpoint()),
                html: ctx.link(Endpoint::About).unwrap_or_default(),
            }
        })
        .with(Endpoint::About, RoutePattern::get("/about"), blank)
        .install()
        .unwrap();

    assert_eq!(
        site.respond(&Method::DELETE, "/"),
        Content::Page {
            title: String::from("Home"),
            html: String::from("/about"),
        }
    );
}
