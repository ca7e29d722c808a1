//! Route table and page dispatch.
//!
//! A [`Sitelet`] maps `(method, path)` to an [`Endpoint`] and the handler that
//! renders it. Routes are fixed once [`SiteletBuilder::install`] succeeds.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use tracing::{debug, info, trace};

use crate::{Endpoint, SiteError};

/// Method constraint and exact path of a route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePattern {
    method: Option<Method>,
    path: String,
}

impl RoutePattern {
    /// Matches `path` for any method.
    pub fn any(path: impl Into<String>) -> Self {
        Self {
            method: None,
            path: path.into(),
        }
    }

    /// Matches `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Matches `method path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            path: path.into(),
        }
    }

    /// Parse `"/path"` or `"METHOD /path"`.
    pub fn parse(pattern: &str) -> Result<Self, SiteError> {
        let invalid = |reason| SiteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let parsed = match pattern.trim().split_once(char::is_whitespace) {
            None => Self::any(pattern.trim()),
            Some((method, path)) => {
                let method = Method::from_bytes(method.as_bytes())
                    .map_err(|_| invalid("unknown method"))?;
                Self::new(method, path.trim())
            }
        };
        parsed.validate().map_err(invalid)?;
        Ok(parsed)
    }

    /// `None` means any method.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// The exact path matched.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn validate(&self) -> Result<(), &'static str> {
        if !self.path.starts_with('/') {
            return Err("path must start with '/'");
        }
        if self.path.contains(['?', '#', ' ']) {
            return Err("path must not contain a query, fragment or space");
        }
        Ok(())
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| answers(m, method)) && self.path == path
    }

    /// Whether some request would match both patterns.
    fn overlaps(&self, other: &RoutePattern) -> bool {
        let methods_overlap = match (&self.method, &other.method) {
            (Some(a), Some(b)) => answers(a, b) || answers(b, a),
            _ => true,
        };
        methods_overlap && self.path == other.path
    }
}

/// Whether a route for `route` serves a `request` call. `HEAD` is answered
/// by the `GET` route of the same path.
fn answers(route: &Method, request: &Method) -> bool {
    route == request || (*route == Method::GET && *request == Method::HEAD)
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{} {}", method, self.path),
            None => f.write_str(&self.path),
        }
    }
}

/// What a handler produced for a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    /// A complete HTML page.
    Page {
        /// Text of the `<title>` element.
        title: String,
        /// The full document.
        html: String,
    },
    /// No route matched.
    NotFound,
}

type Handler = Arc<dyn Fn(&Context<'_>) -> Content + Send + Sync>;

/// One entry of the route table.
#[derive(Clone)]
pub struct Route {
    endpoint: Endpoint,
    pattern: RoutePattern,
    handler: Handler,
}

impl Route {
    /// The endpoint this route serves.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// How requests are matched to this route.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("endpoint", &self.endpoint)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Collects routes until [`install`](SiteletBuilder::install) validates them.
#[derive(Default)]
pub struct SiteletBuilder {
    routes: Vec<Route>,
}

impl SiteletBuilder {
    /// An empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `endpoint` at `pattern` with `handler`.
    pub fn with<H>(mut self, endpoint: Endpoint, pattern: RoutePattern, handler: H) -> Self
    where
        H: Fn(&Context<'_>) -> Content + Send + Sync + 'static,
    {
        self.routes.push(Route {
            endpoint,
            pattern,
            handler: Arc::new(handler),
        });
        self
    }

    /// Freeze the route table.
    ///
    /// Fails on a malformed path, or when a route would shadow an earlier
    /// one (same path, overlapping methods).
    pub fn install(self) -> Result<Sitelet, SiteError> {
        for (index, route) in self.routes.iter().enumerate() {
            route
                .pattern
                .validate()
                .map_err(|reason| SiteError::InvalidPattern {
                    pattern: route.pattern.to_string(),
                    reason,
                })?;

            if let Some(earlier) = self.routes[..index]
                .iter()
                .find(|earlier| earlier.pattern.overlaps(&route.pattern))
            {
                return Err(SiteError::DuplicateRoute {
                    pattern: route.pattern.to_string(),
                    endpoint: route.endpoint,
                    existing: earlier.endpoint,
                });
            }
            debug!("[Sitelet] {} -> {:?}", route.pattern, route.endpoint);
        }

        info!("[Sitelet] installed {} routes", self.routes.len());
        Ok(Sitelet {
            routes: self.routes.into(),
        })
    }
}

/// Immutable route table. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Sitelet {
    routes: Arc<[Route]>,
}

impl Sitelet {
    /// Routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route matching `method` and `path`.
    ///
    /// The query string is ignored; an empty path is the root.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<&Route> {
        let path = path.split_once('?').map_or(path, |(path, _query)| path);
        let path = if path.is_empty() { "/" } else { path };
        self.routes.iter().find(|route| route.pattern.matches(method, path))
    }

    /// Reverse routing: the path of the first route serving `endpoint`.
    pub fn link(&self, endpoint: Endpoint) -> Option<&str> {
        self.routes
            .iter()
            .find(|route| route.endpoint == endpoint)
            .map(|route| route.pattern.path())
    }

    /// Run the handler of the matching route, without request parameters.
    pub fn respond(&self, method: &Method, path: &str) -> Content {
        self.respond_with(method, path, &Params::default())
    }

    /// Run the handler of the matching route with the request's form or
    /// query fields.
    pub fn respond_with(&self, method: &Method, path: &str, params: &Params) -> Content {
        match self.resolve(method, path) {
            Some(route) => {
                trace!("[Sitelet] {} {} -> {:?}", method, path, route.endpoint);
                let ctx = Context {
                    sitelet: self,
                    endpoint: route.endpoint,
                    params,
                };
                (route.handler)(&ctx)
            }
            None => {
                debug!("[Sitelet] no route for {} {}", method, path);
                Content::NotFound
            }
        }
    }
}

/// Named fields submitted with a request, from its query string or its
/// form-encoded body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    /// Value of the field `name`, if it was submitted.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for Params {
    fn from(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Request-scoped view of the site handed to handlers.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    sitelet: &'a Sitelet,
    endpoint: Endpoint,
    params: &'a Params,
}

impl<'a> Context<'a> {
    /// The endpoint being served.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// URL of `endpoint`, if any route serves it.
    pub fn link(&self, endpoint: Endpoint) -> Option<String> {
        self.sitelet.link(endpoint).map(str::to_string)
    }

    /// The whole route table.
    pub fn sitelet(&self) -> &'a Sitelet {
        self.sitelet
    }

    /// Submitted field `name`.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params.get(name)
    }
}
