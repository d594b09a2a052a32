//! Inbound webhook routes. One route per installation serves every chat
//! backend; the path segment picks the adapter.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use tabel_bot::adapters::{BitrixAdapter, ChatBackend, TelegramAdapter};
use tabel_bot::dispatch::MessageDispatcher;
use tabel_core::resolver::{replies, AttendanceResolver};

#[derive(Clone)]
pub struct WebhookState {
    resolver: Arc<AttendanceResolver>,
    backends: Arc<HashMap<&'static str, Arc<dyn ChatBackend>>>,
    dispatcher: Arc<dyn MessageDispatcher>,
}

fn default_backends() -> HashMap<&'static str, Arc<dyn ChatBackend>> {
    let mut backends: HashMap<&'static str, Arc<dyn ChatBackend>> = HashMap::new();
    let bitrix = Arc::new(BitrixAdapter);
    let telegram = Arc::new(TelegramAdapter);
    backends.insert(bitrix.id(), bitrix);
    backends.insert(telegram.id(), telegram);
    backends
}

pub fn router(
    resolver: Arc<AttendanceResolver>,
    dispatcher: Arc<dyn MessageDispatcher>,
) -> Router {
    Router::new().route("/webhook/{backend}", post(receive)).with_state(WebhookState {
        resolver,
        backends: Arc::new(default_backends()),
        dispatcher,
    })
}

/// Recognized payloads are always acknowledged with 200, even when the
/// resolver fails internally; the employee then gets the apology reply
/// instead of a webhook retry storm.
async fn receive(
    State(state): State<WebhookState>,
    Path(backend_id): Path<String>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(backend) = state.backends.get(backend_id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "unknown backend" })));
    };

    let inbound = match backend.parse_webhook(&payload) {
        Ok(Some(inbound)) => inbound,
        Ok(None) => return (StatusCode::OK, Json(json!({ "status": "ignored" }))),
        Err(parse_error) => {
            warn!(
                event_name = "ingress.webhook.malformed",
                backend_id = %backend_id,
                error = %parse_error,
                "rejected malformed webhook payload"
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": parse_error.to_string() })),
            );
        }
    };

    let reply = match state.resolver.resolve(&inbound).await {
        Ok(decision) => decision.reply,
        Err(resolve_error) => {
            error!(
                event_name = "ingress.webhook.resolve_failed",
                backend_id = %backend_id,
                user_id = %inbound.user_id,
                dialog_id = %inbound.dialog_id,
                error = %resolve_error,
                "resolution failed, answering with the apology reply"
            );
            replies::apology()
        }
    };

    let outbound = backend.render_reply(&inbound.dialog_id, &reply);
    if let Err(dispatch_error) = state.dispatcher.deliver(backend.id(), &outbound).await {
        error!(
            event_name = "ingress.webhook.dispatch_failed",
            backend_id = %backend_id,
            dialog_id = %inbound.dialog_id,
            error = %dispatch_error,
            "outbound delivery failed"
        );
    }

    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
