//! LogLens Web Server
//!
//! Serves the log file API, the client log endpoint and the browser viewer,
//! all nested under a configurable mount path.

use axum::{
    http::{header::HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use loglens_core::{AccessGate, HandlerRegistry, LensConfig};
use loglens_logs::{ClientLogIngest, ClientSink, FileAccess};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod auth;
pub mod error;
pub mod handlers;
pub mod ui;

pub use auth::{hash_password, Authenticator};
pub use error::ApiError;
pub use handlers::{LogFileBody, LookupStatus, TimestampBody};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<HandlerRegistry>,
    pub gate: AccessGate,
    pub files: FileAccess,
    pub ingest: ClientLogIngest,
    pub auth: Arc<Authenticator>,
    /// Normalized mount path: empty for the root, otherwise `/segment` without a trailing slash
    pub mount_path: String,
    pub cors_origin: Option<String>,
}

impl AppState {
    pub fn new(registry: Arc<HandlerRegistry>, config: &LensConfig) -> Self {
        Self {
            registry,
            gate: AccessGate::new(config.allow_client_logging),
            files: FileAccess::with_max_read_bytes(config.max_read_bytes),
            ingest: ClientLogIngest::tracing(config.allow_client_logging),
            auth: Arc::new(
                Authenticator::new(config.users.clone(), config.server.api_key.clone())
                    .with_session_ttl(Duration::from_secs(config.server.session_ttl_secs)),
            ),
            mount_path: normalize_mount_path(&config.server.mount_path),
            cors_origin: config.server.cors_origin.clone(),
        }
    }

    /// Replace the destination of accepted client records
    pub fn with_client_sink(mut self, sink: Arc<dyn ClientSink>) -> Self {
        self.ingest = ClientLogIngest::new(self.gate.client_logging_enabled(), sink);
        self
    }

    /// Absolute URL path of a route
    pub fn url(&self, suffix: &str) -> String {
        format!("{}{}", self.mount_path, suffix)
    }

    /// Path attribute for the session cookie
    pub fn cookie_path(&self) -> String {
        if self.mount_path.is_empty() {
            "/".to_string()
        } else {
            self.mount_path.clone()
        }
    }
}

/// Turn `log-lens/`, `/log-lens` and `/log-lens/` into `/log-lens`; `/` and `` into ``
pub fn normalize_mount_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    match origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => cors.allow_origin(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                cors
            }
        },
        None => cors,
    }
}

/// Create the router
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(ui::index))
        .route("/view", get(ui::view))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/request/paths", get(handlers::request_logfile_paths))
        .route("/request/file", get(handlers::request_logfile))
        .route("/request/timestamp", get(handlers::request_logfile_timestamp))
        .route("/clear/file", delete(handlers::clear_logfile))
        .route("/post", post(handlers::post_client_log))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::identify));

    let router = if state.mount_path.is_empty() {
        routes
    } else {
        Router::new().nest(&state.mount_path, routes)
    };

    router
        .layer(cors_layer(state.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Bind `bind_addr` and serve until `shutdown` resolves
pub async fn start_server<F>(bind_addr: &str, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind_addr).await?;
    info!(
        "Starting LogLens on http://{}{}/view",
        listener.local_addr()?,
        state.mount_path
    );
    serve(listener, state, shutdown).await
}
