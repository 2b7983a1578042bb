use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use venue_domain::gift_card::{GiftCard, GiftCardKind};
use venue_domain::DomainError;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/gift-cards", post(issue_card).get(list_cards))
        .route("/v1/gift-cards/validate", post(validate_card))
        .route("/v1/gift-cards/redeem", post(redeem_card))
        .route("/v1/gift-cards/{id}", get(get_card))
        .route("/v1/gift-cards/{id}/purchase", post(purchase_card))
        .route("/v1/gift-cards/{id}/discard", post(discard_card))
        .route("/v1/gift-cards/{id}/reactivate", post(reactivate_card))
        .route("/v1/gift-cards/{id}/offline-redeem", post(offline_redeem))
        .route("/v1/gift-cards/{id}/force-redeem", post(force_redeem))
}

#[derive(Debug, Deserialize)]
struct IssueBody {
    amount: i64,
    kind: GiftCardKind,
    /// When present the card is purchased in the same call and comes back
    /// with its code and PIN.
    buyer: Option<String>,
}

async fn issue_card(
    State(state): State<AppState>,
    Json(body): Json<IssueBody>,
) -> Result<Json<GiftCard>, AppError> {
    let card = state.ledger.issue(body.amount, body.kind, body.buyer).await?;
    Ok(Json(card))
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    owner: String,
}

async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<GiftCard>>, AppError> {
    Ok(Json(state.ledger.list_for_owner(&query.owner).await?))
}

async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GiftCard>, AppError> {
    Ok(Json(state.ledger.get(id).await?))
}

#[derive(Debug, Deserialize)]
struct PurchaseBody {
    buyer: String,
}

async fn purchase_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PurchaseBody>,
) -> Result<Json<GiftCard>, AppError> {
    if body.buyer.trim().is_empty() {
        return Err(DomainError::validation("buyer is required").into());
    }
    Ok(Json(state.ledger.purchase(id, &body.buyer).await?))
}

#[derive(Debug, Deserialize)]
struct ValidateBody {
    code: String,
    pin: String,
}

async fn validate_card(
    State(state): State<AppState>,
    Json(body): Json<ValidateBody>,
) -> Result<Json<Value>, AppError> {
    let balance = state.ledger.validate(&body.code, &body.pin).await?;
    Ok(Json(json!({ "balance": balance })))
}

#[derive(Debug, Deserialize)]
struct RedeemBody {
    code: String,
    pin: String,
    amount: i64,
    reservation_id: Option<Uuid>,
}

async fn redeem_card(
    State(state): State<AppState>,
    Json(body): Json<RedeemBody>,
) -> Result<Json<Value>, AppError> {
    let balance = state
        .ledger
        .redeem(&body.code, &body.pin, body.amount, body.reservation_id)
        .await?;
    Ok(Json(json!({ "balance": balance })))
}

#[derive(Debug, Deserialize)]
struct AdminRedeemBody {
    amount: i64,
    reason: String,
}

async fn offline_redeem(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AdminRedeemBody>,
) -> Result<Json<Value>, AppError> {
    let balance = state
        .ledger
        .offline_redeem(id, body.amount, body.reason)
        .await?;
    Ok(Json(json!({ "balance": balance })))
}

#[derive(Debug, Deserialize)]
struct ForceRedeemBody {
    reason: String,
}

async fn force_redeem(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ForceRedeemBody>,
) -> Result<Json<Value>, AppError> {
    let balance = state.ledger.force_redeem(id, body.reason).await?;
    Ok(Json(json!({ "balance": balance })))
}

async fn discard_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GiftCard>, AppError> {
    Ok(Json(state.ledger.discard(id).await?))
}

async fn reactivate_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GiftCard>, AppError> {
    Ok(Json(state.ledger.reactivate(id).await?))
}
