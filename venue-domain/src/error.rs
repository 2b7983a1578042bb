use uuid::Uuid;

use crate::gift_card::GiftCardStatus;

/// Error taxonomy for the reservation and ledger core.
///
/// `Conflict` and `NotAvailable` are deliberately distinct: a conflict means
/// another reservation holds the slot, while not-available means the resource
/// itself is closed on that weekday or inside a blocked date window.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("requested slot overlaps reservation {conflicting_id}")]
    Conflict { conflicting_id: Uuid },

    #[error("resource not available: {0}")]
    NotAvailable(String),

    #[error("not found")]
    NotFound,

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("gift card is not redeemable while {status}")]
    NotRedeemable { status: GiftCardStatus },

    #[error("staff pin rejected")]
    InvalidPin,

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("code space exhausted after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}
