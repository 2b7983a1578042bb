use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureStatus {
    Succeeded,
    Failed,
}

/// What the core consumes from a capture attempt: a reference string and a
/// success flag. Fee and processor detail stay on the provider's side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureResult {
    pub reference: String,
    pub status: CaptureStatus,
}

/// Opaque payment capture service.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Capture `amount` cents against a source token.
    async fn capture(&self, amount: i64, source_token: &str) -> Result<CaptureResult, RepoError>;

    /// Refund a previously captured payment by reference.
    async fn refund(&self, reference: &str) -> Result<(), RepoError>;
}

/// Development stand-in: every capture succeeds with a synthetic reference.
pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn capture(&self, amount: i64, _source_token: &str) -> Result<CaptureResult, RepoError> {
        let reference = format!("cap_{}", Uuid::new_v4().simple());
        tracing::info!(amount, %reference, "mock payment captured");
        Ok(CaptureResult {
            reference,
            status: CaptureStatus::Succeeded,
        })
    }

    async fn refund(&self, reference: &str) -> Result<(), RepoError> {
        tracing::info!(%reference, "mock payment refunded");
        Ok(())
    }
}
