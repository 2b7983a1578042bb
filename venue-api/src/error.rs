use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use venue_booking::ServiceError;
use venue_domain::DomainError;

#[derive(Debug)]
pub enum AppError {
    Domain(DomainError),
    Storage(String),
    Anyhow(anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(domain) => AppError::Domain(domain),
            ServiceError::Storage(msg) => AppError::Storage(msg),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Domain(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Domain(domain) => match &domain {
                DomainError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, "validation", domain.to_string())
                }
                DomainError::Conflict { .. } => {
                    (StatusCode::CONFLICT, "conflict", domain.to_string())
                }
                DomainError::NotAvailable(_) => {
                    (StatusCode::CONFLICT, "not_available", domain.to_string())
                }
                DomainError::NotFound => {
                    (StatusCode::NOT_FOUND, "not_found", domain.to_string())
                }
                DomainError::InsufficientBalance { .. } => (
                    StatusCode::CONFLICT,
                    "insufficient_balance",
                    domain.to_string(),
                ),
                DomainError::NotRedeemable { .. } => {
                    (StatusCode::CONFLICT, "not_redeemable", domain.to_string())
                }
                DomainError::InvalidPin => {
                    (StatusCode::UNAUTHORIZED, "invalid_pin", domain.to_string())
                }
                DomainError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "invalid_transition", domain.to_string())
                }
                // A systemic capacity problem, not a user error: log it and
                // surface a generic failure.
                DomainError::CodeSpaceExhausted { .. } => {
                    tracing::error!("{domain}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal",
                        "Internal Server Error".to_string(),
                    )
                }
            },
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_not_available_map_to_distinct_codes() {
        let conflict = AppError::Domain(DomainError::Conflict {
            conflicting_id: uuid::Uuid::new_v4(),
        })
        .into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let closed =
            AppError::Domain(DomainError::NotAvailable("closed on Monday".into())).into_response();
        assert_eq!(closed.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_errors_are_opaque() {
        let resp = AppError::Storage("connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
