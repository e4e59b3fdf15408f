//! HTTP receiver for CloudEvents in binary content mode
//!
//! `POST /` carries one event: the `ce-type` header names the event type and
//! the body is the Avro payload. The scored record is returned as JSON.

mod telemetry;

use crate::pipeline::Pipeline;
use crate::Error;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use std::sync::Arc;
use tracing::{info, warn};

/// CloudEvents attribute headers read by the receiver
pub const CE_TYPE: &str = "ce-type";
pub const CE_ID: &str = "ce-id";
pub const CE_SOURCE: &str = "ce-source";

/// Shared API state
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
}

/// Build the HTTP router
pub fn build_http_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", post(receive_event))
        .route("/health", get(health_check))
        .with_state(ApiState { pipeline })
        .layer(middleware::from_fn(telemetry::http_observability_middleware))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Score a binary-mode CloudEvent
pub async fn receive_event(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(event_type) = header_str(&headers, CE_TYPE) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "missing ce-type header" })),
        )
            .into_response();
    };
    let event_id = header_str(&headers, CE_ID).unwrap_or("");
    let source = header_str(&headers, CE_SOURCE).unwrap_or("");

    match state.pipeline.process(event_type, &body).await {
        Ok(record) => {
            info!(
                event_type = %event_type,
                event_id = %event_id,
                source = %source,
                fields = record.len(),
                "Event scored"
            );
            Json(record).into_response()
        }
        Err(e) => {
            let status = status_for(&e);
            warn!(
                event_type = %event_type,
                event_id = %event_id,
                error_class = e.class(),
                status = status.as_u16(),
                error = %e,
                "Event scoring failed"
            );
            (
                status,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "class": e.class(),
                })),
            )
                .into_response()
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// HTTP status reported for a failed event
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Fetch {
            source: object_store::Error::NotFound { .. },
            ..
        } => StatusCode::NOT_FOUND,
        Error::Decode(_)
        | Error::UnsupportedType { .. }
        | Error::TypeMismatch { .. }
        | Error::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Fetch { .. }
        | Error::Exchange(_)
        | Error::UnreadableColumn { .. }
        | Error::RowCount { .. } => StatusCode::BAD_GATEWAY,
        Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        Error::Cache(_)
        | Error::Encode(_)
        | Error::Arrow(_)
        | Error::Config(_)
        | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
