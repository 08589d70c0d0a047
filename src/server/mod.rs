//! HTTP server

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::PageError;
use crate::{PageRenderer, Site};

/// Server state
struct ServerState {
    renderer: PageRenderer,
    static_dir: PathBuf,
}

/// Build the application router for a site
pub fn router(site: &Site) -> Router {
    let state = Arc::new(ServerState {
        renderer: PageRenderer::new(site),
        static_dir: site.static_dir.clone(),
    });

    Router::new()
        .route("/:key", get(page_handler))
        .route("/:key/:asset", get(asset_handler))
        // Only paths below /static are files; a bare /static is still a page key
        .route("/static/*path", get(static_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server and run until Ctrl+C
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let app = router(site);

    // Parse address - handle "localhost" specially
    let bind_ip: IpAddr = if ip == "localhost" {
        IpAddr::from([127, 0, 0, 1])
    } else {
        ip.parse()?
    };
    let addr = SocketAddr::new(bind_ip, port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Serving {:?} at http://{}", site.root, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Render a page
async fn page_handler(
    State(state): State<Arc<ServerState>>,
    Path(key): Path<String>,
) -> Response {
    // Loaders do blocking file I/O
    let result = tokio::task::spawn_blocking(move || state.renderer.render(&key)).await;

    match result {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            tracing::error!("Page render task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Placeholder for per-page assets; never touches the filesystem
async fn asset_handler(Path((key, asset)): Path<(String, String)>) -> String {
    format!("You asked for asset {} for page {}\n", asset, key)
}

/// Serve a file from the static directory
async fn static_handler(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
) -> Response {
    let relative = request
        .uri()
        .path()
        .strip_prefix("/static")
        .unwrap_or("/")
        .to_string();
    match relative.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    }

    let mut service = ServeDir::new(&state.static_dir);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Static file error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        if self.is_not_found() {
            tracing::debug!("{}", self);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        } else {
            tracing::error!("{}", self.diagnostic());
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
