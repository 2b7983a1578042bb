use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(payment_webhook))
}

#[derive(Debug, Deserialize)]
struct PaymentWebhookBody {
    payment_reference: String,
    status: String,
}

/// Provider callback. Unmapped statuses are acknowledged as no-ops; storage
/// failures surface as 500 so the provider retries the delivery.
async fn payment_webhook(
    State(state): State<AppState>,
    Json(body): Json<PaymentWebhookBody>,
) -> Result<Json<Value>, AppError> {
    let updated = state
        .booking
        .apply_payment_webhook(&body.payment_reference, &body.status)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}
