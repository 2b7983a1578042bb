use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::interval::TimeSlot;
use crate::resource::ResourceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            other => Err(DomainError::validation(format!(
                "unknown reservation status: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(DomainError::validation(format!(
                "unknown payment status: {other:?}"
            ))),
        }
    }
}

/// One bookable unit of work: a room-hour, a booth-hour, or a set of
/// chair-hours, together with its lifecycle and payment state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub resource_id: Uuid,
    /// Addressed chairs for café bookings; empty for rooms and booths.
    pub chair_ids: Vec<String>,
    /// Plain `YYYY-MM-DD`, never a time-zone-bearing timestamp.
    pub date: String,
    /// 12-hour labelled start time, e.g. `"2:00 PM"`.
    pub start_time: String,
    pub duration_hours: u32,
    pub party_size: u32,
    pub customer_name: String,
    pub customer_email: String,
    /// Total price in cents, computed from the resource's rate.
    pub total_price: i64,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub staff_name: Option<String>,
    pub staff_pin: Option<String>,
    pub is_manual_booking: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            resource_id: self.resource_id,
            chairs: self.chair_ids.clone(),
        }
    }

    pub fn slot(&self) -> Result<TimeSlot, DomainError> {
        TimeSlot::from_label(&self.start_time, self.duration_hours)
    }

    pub fn end_time(&self) -> Result<String, DomainError> {
        Ok(self.slot()?.end_label())
    }

    /// Active reservations are the ones that occupy their slot.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        )
    }

    /// A booking starts out confirmed only when nothing is owed (free
    /// booking) or the supplied payment already reports success.
    pub fn initial_status(total_price: i64, payment_status: PaymentStatus) -> ReservationStatus {
        if total_price == 0 || payment_status == PaymentStatus::Completed {
            ReservationStatus::Confirmed
        } else {
            ReservationStatus::Pending
        }
    }
}

/// Transition table coupling lifecycle status to payment status.
///
/// Admin moves to `pending`/`confirmed` force the payment status back into
/// agreement; moves to `cancelled`/`completed` leave whatever payment state
/// was already recorded.
pub fn payment_side_effect(target: ReservationStatus) -> Option<PaymentStatus> {
    match target {
        ReservationStatus::Pending => Some(PaymentStatus::Pending),
        ReservationStatus::Confirmed => Some(PaymentStatus::Completed),
        ReservationStatus::Cancelled | ReservationStatus::Completed => None,
    }
}

/// Map a payment provider's webhook status onto the reservation lifecycle.
/// Unrecognized statuses leave the reservation as it stands.
pub fn map_provider_status(provider_status: &str) -> Option<(ReservationStatus, PaymentStatus)> {
    match provider_status {
        "COMPLETED" => Some((ReservationStatus::Confirmed, PaymentStatus::Completed)),
        "FAILED" | "CANCELED" => Some((ReservationStatus::Cancelled, PaymentStatus::Failed)),
        _ => None,
    }
}
