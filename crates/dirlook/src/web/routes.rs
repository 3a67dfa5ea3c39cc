//! HTTP routes.
//!
//! | Path                       | Handler           |
//! |----------------------------|-------------------|
//! | `/`                        | [`list_roots`]    |
//! | `/{root}`                  | [`list_root`]     |
//! | `/{root}/`                 | [`browse_root`]   |
//! | `/{root}/{*path}`          | [`browse`]        |
//! | `/download/{root}/`        | [`download_root`] |
//! | `/download/{root}/{*path}` | [`download`]      |
//!
//! A wildcard never matches an empty remainder, so the trailing-slash forms
//! get their own routes and behave like a nested request for the root.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::render;
use crate::config::Config;
use crate::error::FsError;
use crate::files::roots::discovery_from_config;
use crate::files::{
    DirectoryLister, FileTransfer, Listing, ListingOptions, PathResolver, RequestPath,
    ResolvedPath, RootDiscovery,
};

/// First segment of every download URL.
pub const DOWNLOAD_PREFIX: &str = "download";

/// Per-server handler state. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    resolver: PathResolver,
    lister: DirectoryLister,
    transfer: FileTransfer,
}

impl AppState {
    pub fn new(
        roots: Arc<dyn RootDiscovery>,
        listing: ListingOptions,
        transfer: FileTransfer,
    ) -> Self {
        Self {
            resolver: PathResolver::new(roots),
            lister: DirectoryLister::new(listing),
            transfer,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            discovery_from_config(&config.roots),
            config.listing.options(),
            FileTransfer::new(config.download.chunk_size),
        )
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    fn resolve_and_list(&self, request: &RequestPath) -> Result<(ResolvedPath, Listing), FsError> {
        let resolved = self.resolver.resolve(request)?;
        let listing = self.lister.list_children(&resolved.absolute)?;
        Ok((resolved, listing))
    }
}

/// Build the router serving all routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_roots))
        .route("/download/{root}/", get(download_root))
        .route("/download/{root}/{*path}", get(download))
        .route("/{root}", get(list_root))
        .route("/{root}/", get(browse_root))
        .route("/{root}/{*path}", get(browse))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for FsError {
    fn into_response(self) -> Response {
        warn!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", self)).into_response()
    }
}

/// `GET /`
pub async fn list_roots(State(state): State<AppState>) -> Result<Html<String>, FsError> {
    let roots = run_blocking(move || Ok(state.resolver.roots().list_roots())).await?;
    let links = render::root_links(&roots);
    Ok(Html(render::page(render::link_list(links)).into_string()))
}

/// `GET /{root}`
pub async fn list_root(
    State(state): State<AppState>,
    Path(root): Path<String>,
) -> Result<Html<String>, FsError> {
    let request = RequestPath::root(root);
    let (resolved, listing) = run_blocking(move || state.resolve_and_list(&request)).await?;
    let links = render::root_level_links(&resolved, &listing);
    Ok(Html(render::page(render::link_list(links)).into_string()))
}

/// `GET /{root}/`
pub async fn browse_root(
    State(state): State<AppState>,
    Path(root): Path<String>,
) -> Result<Html<String>, FsError> {
    browse_request(state, RequestPath::root(root)).await
}

/// `GET /{root}/{*path}`
pub async fn browse(
    State(state): State<AppState>,
    Path((root, path)): Path<(String, String)>,
) -> Result<Html<String>, FsError> {
    browse_request(state, RequestPath::new(root, path)).await
}

async fn browse_request(state: AppState, request: RequestPath) -> Result<Html<String>, FsError> {
    let (resolved, listing) = run_blocking(move || state.resolve_and_list(&request)).await?;
    let links = render::nested_links(&resolved, &listing);
    Ok(Html(render::page(render::link_list(links)).into_string()))
}

/// `GET /download/{root}/`
///
/// Always a directory, so this fails with `IsADirectory` for a known root.
pub async fn download_root(
    State(state): State<AppState>,
    Path(root): Path<String>,
) -> Result<Response, FsError> {
    download_request(state, RequestPath::root(root)).await
}

/// `GET /download/{root}/{*path}`
pub async fn download(
    State(state): State<AppState>,
    Path((root, path)): Path<(String, String)>,
) -> Result<Response, FsError> {
    download_request(state, RequestPath::new(root, path)).await
}

async fn download_request(state: AppState, request: RequestPath) -> Result<Response, FsError> {
    let resolver = state.resolver.clone();
    let resolved = run_blocking(move || resolver.resolve(&request)).await?;
    let download = state.transfer.open(&resolved).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&download.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(download.len));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!(
            "attachment; filename*=UTF-8''{}",
            urlencoding::encode(&download.file_name)
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    let body = Body::from_stream(download.into_stream());
    Ok((StatusCode::OK, headers, body).into_response())
}

/// Run filesystem work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, FsError>
where
    F: FnOnce() -> Result<T, FsError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FsError::TaskFailed(e.to_string()))?
}
