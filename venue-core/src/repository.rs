use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use venue_domain::gift_card::{GiftCard, GiftCardStatus, UsageEntry};
use venue_domain::reservation::{PaymentStatus, Reservation, ReservationStatus};
use venue_domain::resource::Resource;
use venue_domain::staff::StaffCredential;

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Result of an atomic create-if-free attempt.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(Reservation),
    /// The slot was taken; carries one conflicting reservation.
    Conflict(Reservation),
}

/// Repository trait for reservation persistence.
///
/// `create_if_free` must treat the overlap scan and the insert as atomic
/// with respect to concurrent creations on the same resource and date;
/// a naive read-then-write here reopens the double-booking race.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn create_if_free(&self, reservation: &Reservation) -> Result<CreateOutcome, RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, RepoError>;

    /// Pending/confirmed reservations for one resource on one date.
    async fn list_active_for_resource(
        &self,
        resource_id: Uuid,
        date: &str,
    ) -> Result<Vec<Reservation>, RepoError>;

    async fn list_for_date(&self, date: &str) -> Result<Vec<Reservation>, RepoError>;

    async fn list_for_customer(&self, email: &str) -> Result<Vec<Reservation>, RepoError>;

    /// Update lifecycle status, optionally forcing the payment status in the
    /// same write. Returns the updated reservation, or None if unknown.
    async fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<Reservation>, RepoError>;

    async fn update_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Option<Reservation>, RepoError>;

    /// Apply a webhook outcome to every reservation sharing the payment
    /// reference, as one batch. Only rows whose state actually changed are
    /// returned, which is what makes replays idempotent for callers.
    async fn apply_payment_reference(
        &self,
        payment_reference: &str,
        status: ReservationStatus,
        payment_status: PaymentStatus,
    ) -> Result<Vec<Reservation>, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// Repository trait for gift card persistence.
#[async_trait]
pub trait GiftCardRepository: Send + Sync {
    async fn insert(&self, card: &GiftCard) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<GiftCard>, RepoError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<GiftCard>, RepoError>;

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<GiftCard>, RepoError>;

    /// Draw the next value from the dedicated code counter. Monotonic and
    /// atomic; two concurrent purchases never observe the same value.
    async fn next_code_number(&self) -> Result<u64, RepoError>;

    async fn pin_exists(&self, pin: &str) -> Result<bool, RepoError>;

    /// Assign code/PIN/buyer at purchase. Returns false when the card is
    /// already purchased or the code/PIN collides with an existing card,
    /// letting the caller probe-retry.
    async fn assign_code(
        &self,
        id: Uuid,
        code: &str,
        pin: &str,
        buyer: &str,
        purchased_at: DateTime<Utc>,
    ) -> Result<bool, RepoError>;

    /// Compare-and-swap balance update: applies only while the previously
    /// read balance AND status still hold, so concurrent redemptions cannot
    /// both succeed against a balance that covers only one of them, and a
    /// discard landing between read and swap is never overwritten.
    async fn update_balance(
        &self,
        id: Uuid,
        expected_balance: i64,
        expected_status: GiftCardStatus,
        new_balance: i64,
        new_status: GiftCardStatus,
        entry: &UsageEntry,
    ) -> Result<bool, RepoError>;

    /// Status flip guarded by the observed current status.
    async fn update_status(
        &self,
        id: Uuid,
        from: GiftCardStatus,
        to: GiftCardStatus,
    ) -> Result<bool, RepoError>;
}

/// Repository trait for staff credentials.
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Returns false when another active credential already holds the PIN.
    async fn insert(&self, credential: &StaffCredential) -> Result<bool, RepoError>;

    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<StaffCredential>, RepoError>;

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, RepoError>;

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<StaffCredential>, RepoError>;
}

/// Read-only access to the resource catalog.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Resource>, RepoError>;

    async fn list(&self) -> Result<Vec<Resource>, RepoError>;
}
