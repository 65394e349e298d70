use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::models::{decode_events, WebhookAck, WebhookPayload};
use crate::api::response;
use crate::bot::handle_events;
use crate::error::{AppError, Result};
use crate::line::{verify_signature, SIGNATURE_HEADER};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/callback", post(callback_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook request without signature header");
            AppError::SignatureError
        })?;

    verify_signature(&state.config.channel_secret, &body, signature).inspect_err(|_| {
        warn!("Webhook signature mismatch");
    })?;

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::PayloadError(e.to_string()))?;

    let received = payload.events.len();
    let events = decode_events(payload.events);
    let replied = handle_events(&state.bot, state.replier.as_ref(), events).await;
    info!(received, replied, "Processed webhook batch");

    Ok(response::success(WebhookAck { received, replied }))
}
