//! SonoCare Server
//!
//! HTTP endpoints and the embedded browser chat page.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_chat_request, record_error, record_turn_latency};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server errors
///
/// The message is sent to the client as `{"error": <message>}`.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        record_error(match &self {
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Internal(_) => "internal",
        });
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
