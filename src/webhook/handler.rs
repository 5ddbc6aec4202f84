//! Request pipeline of the webhook listener.
//!
//! ```text
//! POST (any path) -> signature gate --400/401--> reject
//!                          |
//!                          v
//!                   POST / -> parse -> strip -> caller hook -> 200 ack
//! GET /  -> liveness
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Credential;
use crate::error::NoxError;
use crate::observability::Logger;
use crate::webhook::event::WebhookEvent;
use crate::webhook::signature;

/// Largest webhook body accepted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub const LIVENESS_MESSAGE: &str = "Webhook endpoint is active";

/// Caller hook invoked with every verified event.
///
/// An error aborts the request with a 500; its text is only logged.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    async fn handle(&self, event: &WebhookEvent) -> anyhow::Result<()>;
}

/// Shared, read-only state of the router.
#[derive(Clone)]
pub struct WebhookState {
    pub secret: Credential,
    pub logger: Arc<dyn Logger>,
    pub handler: Option<Arc<dyn WebhookHandler>>,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for NoxError {
    fn into_response(self) -> Response {
        match self {
            NoxError::MissingCredentials => {
                error_body(StatusCode::BAD_REQUEST, "Missing payload or signature")
            }
            NoxError::InvalidSignature => error_body(StatusCode::UNAUTHORIZED, "Invalid signature"),
            NoxError::InvalidPayload { .. } => error_body(StatusCode::BAD_REQUEST, "Invalid payload"),
            _ => error_body(StatusCode::INTERNAL_SERVER_ERROR, "Error processing webhook"),
        }
    }
}

/// Signature gate for every POST, whatever the path.
///
/// The signature header is checked before the body is buffered, so an
/// unsigned request is reported as missing credentials whatever its size.
async fn verify_signature(
    State(state): State<WebhookState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    if state.secret.expose().trim().is_empty() {
        state.logger.error("Webhook signing secret is empty; refusing to verify");
        return NoxError::config("empty signing secret").into_response();
    }

    let (parts, body) = request.into_parts();
    let Some(presented) = signature::select_signature(&parts.headers) else {
        state.logger.warn("Webhook rejected: missing payload or signature");
        return NoxError::MissingCredentials.into_response();
    };

    let payload = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            state.logger.warn(&format!("Failed to read webhook body: {}", e));
            return NoxError::invalid_payload(e.to_string()).into_response();
        }
    };

    if let Err(e) = signature::require_valid(state.secret.expose(), &payload, presented) {
        match e {
            NoxError::MissingCredentials => {
                state.logger.warn("Webhook rejected: missing payload or signature")
            }
            _ => state.logger.warn("Webhook rejected: invalid signature"),
        }
        return e.into_response();
    }

    state
        .logger
        .debug(&format!("Webhook signature verified ({} bytes)", payload.len()));

    let request = Request::from_parts(parts, Body::from(payload));
    next.run(request).await
}

async fn liveness(State(state): State<WebhookState>) -> Response {
    state.logger.debug("Webhook liveness check");
    (StatusCode::OK, Json(json!({ "message": LIVENESS_MESSAGE }))).into_response()
}

async fn receive(State(state): State<WebhookState>, body: Bytes) -> Response {
    let event = match WebhookEvent::parse(body) {
        Ok(event) => event,
        Err(e) => {
            state.logger.warn(&format!("Webhook rejected: {}", e));
            return e.into_response();
        }
    };

    state
        .logger
        .info(&format!("Webhook event received: {}", event.event()));

    if let Some(handler) = &state.handler {
        if let Err(e) = handler.handle(&event).await {
            state
                .logger
                .error(&format!("Error processing webhook event: {:#}", e));
            return NoxError::server("handler failed").into_response();
        }
    }

    let body = json!({
        "success": true,
        "data": event.acknowledgement(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

async fn not_found() -> Response {
    error_body(StatusCode::NOT_FOUND, "Not found")
}

/// Build the webhook router.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(liveness).post(receive))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), verify_signature))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
