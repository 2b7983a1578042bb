use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use venue_booking::NewReservationRequest;
use venue_domain::availability::Availability;
use venue_domain::reservation::{PaymentStatus, Reservation, ReservationStatus};
use venue_domain::DomainError;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/reservations",
            post(create_reservation).get(list_reservations),
        )
        .route(
            "/v1/reservations/{id}",
            get(get_reservation).delete(delete_reservation),
        )
        .route("/v1/reservations/{id}/status", patch(update_status))
        .route(
            "/v1/reservations/{id}/payment-status",
            patch(update_payment_status),
        )
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
        .route("/v1/availability", get(check_availability))
}

#[derive(Debug, Deserialize)]
struct CreateReservationBody {
    #[serde(flatten)]
    reservation: NewReservationRequest,
    /// Self-service flow: a source token to capture against before the
    /// booking is committed.
    payment_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReservationResponse {
    #[serde(flatten)]
    reservation: Reservation,
    end_time: String,
}

impl ReservationResponse {
    fn from(reservation: Reservation) -> Result<Self, AppError> {
        let end_time = reservation.end_time()?;
        Ok(Self {
            reservation,
            end_time,
        })
    }
}

async fn create_reservation(
    State(state): State<AppState>,
    Json(body): Json<CreateReservationBody>,
) -> Result<Json<ReservationResponse>, AppError> {
    let created = state
        .booking
        .create_with_payment(body.reservation, body.payment_token)
        .await?;
    Ok(Json(ReservationResponse::from(created)?))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    date: Option<String>,
    customer: Option<String>,
}

async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let reservations = match (query.date, query.customer) {
        (Some(date), None) => state.booking.list_for_date(&date).await?,
        (None, Some(customer)) => state.booking.list_for_customer(&customer).await?,
        _ => {
            return Err(
                DomainError::validation("provide exactly one of date or customer").into(),
            )
        }
    };
    reservations
        .into_iter()
        .map(ReservationResponse::from)
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.booking.get(id).await?;
    Ok(Json(ReservationResponse::from(reservation)?))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: ReservationStatus,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<ReservationResponse>, AppError> {
    let updated = state.booking.update_status(id, body.status).await?;
    Ok(Json(ReservationResponse::from(updated)?))
}

#[derive(Debug, Deserialize)]
struct PaymentStatusBody {
    payment_status: PaymentStatus,
}

async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PaymentStatusBody>,
) -> Result<Json<ReservationResponse>, AppError> {
    let updated = state
        .booking
        .update_payment_status(id, body.payment_status)
        .await?;
    Ok(Json(ReservationResponse::from(updated)?))
}

#[derive(Debug, Deserialize)]
struct CancelBody {
    customer_email: String,
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CancelBody>,
) -> Result<Json<ReservationResponse>, AppError> {
    let cancelled = state.booking.cancel(id, &body.customer_email).await?;
    Ok(Json(ReservationResponse::from(cancelled)?))
}

async fn delete_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.booking.delete(id).await?;
    Ok(Json(json!({ "deleted": id })))
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    resource_id: Uuid,
    date: String,
    start_time: String,
    duration_hours: u32,
    /// Comma-separated chair ids for café seating probes.
    chairs: Option<String>,
}

async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let chair_ids: Vec<String> = query
        .chairs
        .map(|raw| {
            raw.split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let outcome = state
        .booking
        .check_availability(
            query.resource_id,
            chair_ids,
            &query.date,
            &query.start_time,
            query.duration_hours,
        )
        .await?;

    let body = match outcome {
        Availability::Available => json!({ "available": true }),
        Availability::NotAvailable { reason } => json!({
            "available": false,
            "code": "not_available",
            "reason": reason,
        }),
        Availability::Conflict { conflicting } => json!({
            "available": false,
            "code": "conflict",
            "conflicting_id": conflicting.id,
        }),
    };
    Ok(Json(body))
}
