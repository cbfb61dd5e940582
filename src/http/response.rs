//! Response construction.
//!
//! # Responsibilities
//! - Map core errors to JSON error bodies
//! - Render process events as text frames
//! - Build the streamed, never-cached action response
//!
//! # Design Decisions
//! - Every core error is a 500 with `{"error": "..."}`
//! - Frames are written as soon as the event arrives; nothing is buffered
//! - A non-zero exit code is data inside the stream, not an HTTP status

use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::StreamExt;
use serde_json::json;

use crate::error::Error;
use crate::observability::metrics;
use crate::process::{Action, ProcessRun, StreamEvent};

/// Body message returned after a successful update.
pub const CONFIG_UPDATED: &str = "Config updated successfully";

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A document, update or launch failure.
    Core(Error),
    /// The blocking task running the operation did not complete.
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::Core(err) => err.to_string(),
            ApiError::Internal(message) => message,
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

/// Wire frame for one event.
pub fn event_frame(event: &StreamEvent) -> Bytes {
    match event {
        StreamEvent::Line { text, .. } => Bytes::from(format!("data: {}\n\n", text)),
        StreamEvent::Done { exit_code } => Bytes::from(format!(
            "data: \nProcess finished with exit code {}\n",
            exit_code
        )),
    }
}

/// Stream `run` to the client, one frame per event.
///
/// The body ends after the `Done` frame. Dropping the body (client gone)
/// drops `run`.
pub fn event_stream_response(run: ProcessRun, action: Action) -> Response {
    let frames = run.map(move |event| {
        if let StreamEvent::Done { exit_code } = event {
            metrics::record_action_exit(action.name(), exit_code);
        }
        Ok::<_, Infallible>(event_frame(&event))
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::OutputSource;

    #[test]
    fn test_line_frame() {
        let frame = event_frame(&StreamEvent::line(OutputSource::Stdout, "Installing controller"));
        assert_eq!(&frame[..], b"data: Installing controller\n\n");
    }

    #[test]
    fn test_done_frame() {
        let frame = event_frame(&StreamEvent::Done { exit_code: 2 });
        assert_eq!(&frame[..], b"data: \nProcess finished with exit code 2\n");
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError::from(Error::Validation("bad payload".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"error": "validation error: bad payload"}));
    }
}
