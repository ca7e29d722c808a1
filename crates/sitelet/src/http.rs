//! HTTP surface: pages from the [`Sitelet`], remoting on `POST <remoting_path>`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::post;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::remoting::{DispatchError, RemoteRegistry};
use crate::site::{build_site, not_found_page};
use crate::sitelet::{Content, Params, Sitelet};
use crate::{ServerSettings, SiteError};

/// Content type of remoting requests and replies.
pub const REMOTING_CONTENT_TYPE: &str = "application/octet-stream";

/// Everything a request handler needs, shared by all requests.
#[derive(Clone, Debug)]
pub struct AppState {
    sitelet: Sitelet,
    remoting: Arc<RemoteRegistry>,
    remoting_path: Arc<str>,
}

impl AppState {
    /// Serve `sitelet`, and `remoting` at `remoting_path`.
    pub fn new(sitelet: Sitelet, remoting: Arc<RemoteRegistry>, remoting_path: &str) -> Self {
        Self {
            sitelet,
            remoting,
            remoting_path: Arc::from(remoting_path),
        }
    }

    /// The site's pages and remote API, as configured by `settings`.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, SiteError> {
        let remoting = Arc::new(RemoteRegistry::site_api()?);
        let sitelet = build_site(Arc::clone(&remoting))?;
        Ok(Self::new(sitelet, remoting, &settings.remoting_path))
    }
}

/// Router answering every request through the sitelet or the remoting
/// endpoint. Unmatched requests get the 404 page, whatever their method.
pub fn router(state: AppState) -> Router {
    let remoting_path = state.remoting_path.to_string();
    Router::new()
        .route(&remoting_path, post(rpc).fallback(pages))
        .fallback(pages)
        .with_state(state)
}

async fn rpc(State(state): State<AppState>, body: Bytes) -> Response {
    remoting(&state.remoting, &body).await
}

/// Form fields come from the query string for `GET` and `HEAD`, and from a
/// form-encoded body otherwise. Anything else means no fields.
async fn pages(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let params = match form {
        Ok(Form(fields)) => Params::from(fields),
        Err(rejection) => {
            debug!("No form fields for {} {}: {}", method, uri.path(), rejection);
            Params::default()
        }
    };

    match state.sitelet.respond_with(&method, uri.path(), &params) {
        Content::Page { html, .. } => Html(html).into_response(),
        Content::NotFound => {
            (StatusCode::NOT_FOUND, Html(not_found_page(&state.sitelet))).into_response()
        }
    }
}

fn status_of(error: Option<&DispatchError>) -> StatusCode {
    match error {
        None => StatusCode::OK,
        Some(DispatchError::Malformed(_)) => StatusCode::BAD_REQUEST,
        Some(DispatchError::Unknown(_)) => StatusCode::NOT_FOUND,
        Some(DispatchError::Handler(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn remoting(registry: &RemoteRegistry, body: &[u8]) -> Response {
    match registry.handle_bytes(body).await {
        Ok(reply) => (
            status_of(reply.error.as_ref()),
            [(header::CONTENT_TYPE, REMOTING_CONTENT_TYPE)],
            reply.body,
        )
            .into_response(),
        Err(err) => {
            error!("Could not encode remoting reply: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Bind `settings.addr` and serve the site until Ctrl-C.
pub async fn serve(settings: ServerSettings) -> Result<(), SiteError> {
    let state = AppState::from_settings(&settings)?;
    let listener = TcpListener::bind(settings.addr)
        .await
        .map_err(|source| SiteError::Bind {
            addr: settings.addr,
            source,
        })?;

    info!("Listening on http://{}", settings.addr);
    info!("Remoting endpoint: POST {}", settings.remoting_path);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(SiteError::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(err) => {
            debug!("Ctrl-C handler unavailable ({}); running until killed", err);
            futures::future::pending::<()>().await;
        }
    }
}
