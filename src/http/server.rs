//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Build the config bridge and process streamer once and share them
//! - Wire up middleware (request ID, tracing, CORS, body limit, timeout)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::bridge::ConfigBridge;
use crate::config::{ActionsConfig, CorsConfig, ServiceConfig};
use crate::document::DocumentStore;
use crate::http::handlers::{get_config, health, post_config, run_install, run_uninstall};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::ShutdownSignal;
use crate::process::{ProcessStreamer, StreamerConfig};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<ConfigBridge>,
    pub streamer: Arc<ProcessStreamer>,
    pub actions: Arc<ActionsConfig>,
}

impl AppState {
    pub fn from_config(config: &ServiceConfig) -> Self {
        let store = DocumentStore::new(&config.document.path);
        Self {
            bridge: Arc::new(ConfigBridge::new(store)),
            streamer: Arc::new(ProcessStreamer::new(StreamerConfig::from(&config.actions))),
            actions: Arc::new(config.actions.clone()),
        }
    }
}

/// HTTP server for the installer service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let state = AppState::from_config(&config);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The timeout only wraps the request/response routes; action streams
    /// stay open for as long as the script runs.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let bounded = Router::new()
            .route("/config", get(get_config).post(post_config))
            .route("/health", get(health))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        let streaming = Router::new()
            .route("/install", post(run_install))
            .route("/uninstall", post(run_uninstall));

        bounded
            .merge(streaming)
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(cors_layer(&config.cors))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving it some other way.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            document = %self.config.document.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
