//! Route handlers.

use axum::{
    body::Bytes,
    extract::State,
    response::Response,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::error::Error;
use crate::http::response::{event_stream_response, ApiError, CONFIG_UPDATED};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::process::Action;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /config`
pub async fn get_config(State(state): State<AppState>) -> Result<Json<JsonValue>, ApiError> {
    let bridge = state.bridge.clone();
    let result = run_blocking(move || bridge.read()).await;

    match result {
        Ok(document) => {
            metrics::record_config_read("ok");
            Ok(Json(document))
        }
        Err(err) => {
            metrics::record_config_read(outcome(&err));
            tracing::error!(error = ?err, "Failed to read config");
            Err(err)
        }
    }
}

/// `POST /config`
pub async fn post_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<JsonValue>, ApiError> {
    let result = match serde_json::from_slice::<JsonValue>(&body) {
        Ok(payload) => {
            let bridge = state.bridge.clone();
            run_blocking(move || bridge.apply(payload)).await
        }
        Err(e) => Err(ApiError::from(Error::Validation(format!(
            "request body is not valid JSON: {}",
            e
        )))),
    };

    match result {
        Ok(()) => {
            metrics::record_config_write("ok");
            Ok(Json(json!({ "message": CONFIG_UPDATED })))
        }
        Err(err) => {
            metrics::record_config_write(outcome(&err));
            tracing::warn!(error = ?err, "Config update rejected");
            Err(err)
        }
    }
}

/// `POST /install`
pub async fn run_install(State(state): State<AppState>) -> Result<Response, ApiError> {
    run_action(&state, Action::Install)
}

/// `POST /uninstall`
pub async fn run_uninstall(State(state): State<AppState>) -> Result<Response, ApiError> {
    run_action(&state, Action::Uninstall)
}

fn run_action(state: &AppState, action: Action) -> Result<Response, ApiError> {
    let argv = action.argv(&state.actions, state.bridge.store().path());

    match state.streamer.run(&argv) {
        Ok(run) => {
            metrics::record_action_run(action.name(), "started");
            tracing::info!(
                action = %action,
                pid = ?run.pid(),
                argv = ?run.argv(),
                "Streaming action output"
            );
            Ok(event_stream_response(run, action))
        }
        Err(err) => {
            metrics::record_action_run(action.name(), "launch_failed");
            tracing::error!(action = %action, argv = ?argv, error = %err, "Failed to start action");
            Err(err.into())
        }
    }
}

/// Run document I/O off the async workers so open streams stay responsive.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => Err(ApiError::Internal(format!("config task failed: {}", e))),
    }
}

fn outcome(err: &ApiError) -> &'static str {
    match err {
        ApiError::Core(e) => e.kind(),
        ApiError::Internal(_) => "internal",
    }
}
