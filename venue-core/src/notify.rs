use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::repository::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    ReservationCreated,
    ReservationConfirmed,
    ReservationCancelled,
    GiftCardPurchased,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ReservationCreated => "reservation.created",
            NotificationKind::ReservationConfirmed => "reservation.confirmed",
            NotificationKind::ReservationCancelled => "reservation.cancelled",
            NotificationKind::GiftCardPurchased => "gift_card.purchased",
        }
    }
}

/// Outbound notification delivery. Implementations may fail; callers go
/// through [`dispatch`], which makes every delivery fire-and-forget and
/// time-bounded so booking success never depends on notification success.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, kind: NotificationKind, payload: Value) -> Result<(), RepoError>;
}

/// Default sink that just traces deliveries.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, kind: NotificationKind, payload: Value) -> Result<(), RepoError> {
        tracing::info!(kind = kind.as_str(), %payload, "notification delivered");
        Ok(())
    }
}

/// Fire-and-forget delivery with a timeout. Failures and timeouts are
/// logged and swallowed; nothing surfaces to the caller.
pub fn dispatch(
    notifier: Arc<dyn Notifier>,
    kind: NotificationKind,
    payload: Value,
    timeout_ms: u64,
) {
    tokio::spawn(async move {
        let deadline = Duration::from_millis(timeout_ms);
        match tokio::time::timeout(deadline, notifier.deliver(kind, payload)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(kind = kind.as_str(), error = %err, "notification delivery failed");
            }
            Err(_) => {
                tracing::warn!(kind = kind.as_str(), timeout_ms, "notification delivery timed out");
            }
        }
    });
}
