use axum::{
    extract::{Path, Query, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use venue_domain::staff::{StaffCredential, StaffIdentity};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/staff", post(create_credential).get(list_credentials))
        .route("/v1/staff/verify", post(verify_pin))
        .route("/v1/staff/{id}/deactivate", post(deactivate))
        .route("/v1/staff/{id}/reactivate", post(reactivate))
}

#[derive(Debug, Deserialize)]
struct CreateStaffBody {
    pin: String,
    display_name: String,
    owner_id: String,
}

async fn create_credential(
    State(state): State<AppState>,
    Json(body): Json<CreateStaffBody>,
) -> Result<Json<StaffCredential>, AppError> {
    let credential = state
        .staff
        .create(body.pin, body.display_name, body.owner_id)
        .await?;
    Ok(Json(credential))
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    owner: String,
}

async fn list_credentials(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<StaffCredential>>, AppError> {
    Ok(Json(state.staff.list_for_owner(&query.owner).await?))
}

#[derive(Debug, Deserialize)]
struct VerifyBody {
    pin: String,
}

async fn verify_pin(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> Result<Json<StaffIdentity>, AppError> {
    Ok(Json(state.staff.verify(&body.pin).await?))
}

async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.staff.deactivate(id).await?;
    Ok(Json(json!({ "id": id, "is_active": false })))
}

async fn reactivate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.staff.reactivate(id).await?;
    Ok(Json(json!({ "id": id, "is_active": true })))
}
